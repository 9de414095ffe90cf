mod canvas;
mod transport;

pub use canvas::{clear_canvas, fit_canvas_to_picture, CanvasPresenter};
pub use transport::{EventSink, WebSocketConnection, WebSocketConnector};

use fractalstream_core::{
    CalculationRequest, ClientConfig, PictureRaster, SessionState, TilePresenter, Viewer,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

type SharedViewer = Rc<RefCell<Viewer<WebSocketConnector>>>;

/// Route panics and `log` output to the browser console.
#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);
}

/// Callbacks registered from JavaScript.
#[derive(Default)]
struct JsHooks {
    on_complete: Option<js_sys::Function>,
    on_error: Option<js_sys::Function>,
}

/// Remote fractal rendered into a canvas, tile by tile.
#[wasm_bindgen]
pub struct FractalViewer {
    viewer: SharedViewer,
    config: ClientConfig,
    hooks: Rc<RefCell<JsHooks>>,
}

#[wasm_bindgen]
impl FractalViewer {
    /// `config_json` overrides any subset of the client defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
    ) -> Result<FractalViewer, JsValue> {
        init_logging();

        let config = match config_json {
            Some(json) => ClientConfig::from_json(&json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => ClientConfig::default(),
        };

        let viewer = Rc::new_cyclic(|weak: &Weak<RefCell<Viewer<WebSocketConnector>>>| {
            let weak = weak.clone();
            let sink: EventSink = Rc::new(move |session, event| {
                let Some(viewer) = weak.upgrade() else {
                    return;
                };
                match viewer.try_borrow_mut() {
                    Ok(mut viewer) => viewer.handle_event(session, event),
                    Err(_) => log::error!("Socket {} event arrived during an update", session),
                };
            });
            RefCell::new(Viewer::new(&config, WebSocketConnector::new(sink)))
        });

        let presenter: Rc<dyn TilePresenter> = Rc::new(CanvasPresenter::new(&canvas)?);
        let raster: Rc<RefCell<Option<PictureRaster>>> = Rc::new(RefCell::new(None));
        let hooks = Rc::new(RefCell::new(JsHooks::default()));

        {
            let mut viewer = viewer.borrow_mut();

            let slot = Rc::clone(&raster);
            let cleared = canvas.clone();
            viewer.on_picture_cleared(move || {
                *slot.borrow_mut() = None;
                clear_canvas(&cleared);
            });

            let slot = Rc::clone(&raster);
            viewer.on_picture_ready(move |picture| {
                if let Err(err) = fit_canvas_to_picture(&canvas, picture) {
                    log::error!("Failed to size canvas: {:?}", err);
                }
                *slot.borrow_mut() = Some(PictureRaster::attach(picture, Some(presenter.clone())));
            });

            let h = Rc::clone(&hooks);
            viewer.on_complete(move || {
                if let Some(callback) = h.borrow().on_complete.clone() {
                    call_later(callback, JsValue::UNDEFINED);
                }
            });

            let h = Rc::clone(&hooks);
            viewer.on_error(move |reason| {
                if let Some(callback) = h.borrow().on_error.clone() {
                    call_later(callback, JsValue::from_str(reason));
                }
            });
        }

        log::info!("FractalViewer ready, backend {}", config.backend_url);

        Ok(FractalViewer {
            viewer,
            config,
            hooks,
        })
    }

    /// Start a calculation; returns its session id.
    pub fn calculate(
        &self,
        width: u32,
        center_re: f64,
        center_im: f64,
        extent: f64,
        max_iterations: u32,
    ) -> Result<u32, JsValue> {
        let request = CalculationRequest::new(width, center_re, center_im, extent, max_iterations)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.start(&request)
    }

    /// Calculate the configured initial view.
    pub fn calculate_default(&self) -> Result<u32, JsValue> {
        let request = self
            .config
            .default_request()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.start(&request)
    }

    pub fn set_color_scheme(&self, name: &str) {
        self.viewer.borrow_mut().set_color_scheme(name);
    }

    pub fn color_scheme(&self) -> String {
        self.viewer.borrow().color_scheme()
    }

    /// Names of every registered scheme, in picker order.
    pub fn scheme_names(&self) -> js_sys::Array {
        self.viewer
            .borrow()
            .registry()
            .names()
            .map(JsValue::from_str)
            .collect()
    }

    pub fn set_backend_url(&self, url: &str) {
        self.viewer.borrow_mut().session_mut().set_backend_url(url);
    }

    pub fn activate_logging(&self) {
        self.viewer.borrow_mut().session_mut().activate_logging();
    }

    pub fn deactivate_logging(&self) {
        self.viewer.borrow_mut().session_mut().deactivate_logging();
    }

    /// Abandon the running calculation.
    pub fn close(&self) {
        self.viewer.borrow_mut().session_mut().close();
    }

    /// One of `idle`, `connecting`, `open`, `closed`, `error`.
    pub fn state(&self) -> String {
        match self.viewer.borrow().session().state() {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
            SessionState::ErrorClosed => "error",
        }
        .to_string()
    }

    pub fn set_on_complete(&self, callback: Option<js_sys::Function>) {
        self.hooks.borrow_mut().on_complete = callback;
    }

    /// `callback` receives the failure reason.
    pub fn set_on_error(&self, callback: Option<js_sys::Function>) {
        self.hooks.borrow_mut().on_error = callback;
    }
}

impl FractalViewer {
    fn start(&self, request: &CalculationRequest) -> Result<u32, JsValue> {
        self.viewer
            .borrow_mut()
            .calculate(request)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}

/// Invoke a JS callback on a later turn, outside any viewer borrow.
fn call_later(callback: js_sys::Function, arg: JsValue) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
            log::error!("JS callback failed: {}", transport::js_message(&err));
        }
    });
}
