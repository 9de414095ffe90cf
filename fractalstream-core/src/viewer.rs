//! Wires a session's events into the picture model.

use crate::colorizers::{ColorSchemeRegistry, Colorizer};
use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::picture::PictureModel;
use crate::request::CalculationRequest;
use crate::session::{ConnectionEvent, Connector, SessionClient, SessionId};
use std::cell::RefCell;
use std::rc::Rc;

/// State the session handlers share with the viewer.
struct Shared {
    colorizer: Colorizer,
    max_iterations: u32,
    on_picture_ready: Option<Box<dyn FnMut(&PictureModel)>>,
    on_picture_cleared: Option<Box<dyn FnMut()>>,
    on_complete: Option<Box<dyn FnMut()>>,
    on_error: Option<Box<dyn FnMut(&str)>>,
}

impl Shared {
    fn picture_cleared(&mut self) {
        if let Some(hook) = self.on_picture_cleared.as_mut() {
            hook();
        }
    }
}

/// A remote calculation rendered into a picture model.
pub struct Viewer<C: Connector> {
    session: SessionClient<C>,
    registry: ColorSchemeRegistry,
    picture: Rc<RefCell<PictureModel>>,
    shared: Rc<RefCell<Shared>>,
}

impl<C: Connector> Viewer<C> {
    /// A viewer with the built-in colour schemes.
    pub fn new(config: &ClientConfig, connector: C) -> Self {
        Self::with_registry(config, connector, ColorSchemeRegistry::with_builtin_schemes())
    }

    pub fn with_registry(
        config: &ClientConfig,
        connector: C,
        registry: ColorSchemeRegistry,
    ) -> Self {
        let mut session = SessionClient::new(config.backend_url.clone(), connector);
        if config.logging {
            session.activate_logging();
        }

        let picture = Rc::new(RefCell::new(PictureModel::new()));
        let shared = Rc::new(RefCell::new(Shared {
            colorizer: registry.resolve(&config.color_scheme),
            max_iterations: config.defaults.max_iterations,
            on_picture_ready: None,
            on_picture_cleared: None,
            on_complete: None,
            on_error: None,
        }));

        {
            let picture = Rc::clone(&picture);
            let shared = Rc::clone(&shared);
            session.on_setup(move |setup| {
                let mut shared = shared.borrow_mut();
                let initialized = picture.borrow_mut().init(
                    &setup,
                    shared.colorizer.clone(),
                    shared.max_iterations,
                );
                match initialized {
                    Ok(()) => {
                        if let Some(hook) = shared.on_picture_ready.as_mut() {
                            hook(&picture.borrow());
                        }
                    }
                    Err(err) => {
                        log::error!("Ignoring setup: {}", err);
                        shared.picture_cleared();
                    }
                }
            });
        }

        {
            let picture = Rc::clone(&picture);
            session.on_message(move |result| {
                if let Err(err) =
                    picture
                        .borrow_mut()
                        .on_tile_result(result.row, result.column, result.data)
                {
                    log::debug!("Dropping tile result: {}", err);
                }
            });
        }

        {
            let shared = Rc::clone(&shared);
            session.on_close(move || {
                log::info!("done");
                if let Some(hook) = shared.borrow_mut().on_complete.as_mut() {
                    hook();
                }
            });
        }

        {
            let picture = Rc::clone(&picture);
            let shared = Rc::clone(&shared);
            session.on_error(move |reason| {
                picture.borrow_mut().reset();
                let mut shared = shared.borrow_mut();
                shared.picture_cleared();
                if let Some(hook) = shared.on_error.as_mut() {
                    hook(&reason);
                }
            });
        }

        Self {
            session,
            registry,
            picture,
            shared,
        }
    }

    /// Start calculating `request`, superseding whatever is in flight.
    ///
    /// The previous picture is discarded right away, before the new
    /// session announces its grid.
    pub fn calculate(&mut self, request: &CalculationRequest) -> Result<SessionId, SessionError> {
        self.picture.borrow_mut().reset();
        {
            let mut shared = self.shared.borrow_mut();
            shared.max_iterations = request.max_iterations();
            shared.picture_cleared();
        }
        self.session.calculate(request)
    }

    /// Feed a transport event through the session.
    pub fn handle_event(&mut self, session: SessionId, event: ConnectionEvent) {
        self.session.handle_event(session, event);
    }

    /// Switch to the scheme called `name` (or the default) and recolour.
    pub fn set_color_scheme(&mut self, name: &str) {
        let colorizer = self.registry.resolve(name);
        if colorizer.name() != name {
            log::warn!("Unknown color scheme {:?}, using {:?}", name, colorizer.name());
        }
        self.shared.borrow_mut().colorizer = colorizer.clone();
        self.picture.borrow_mut().set_colorizer(colorizer);
    }

    pub fn color_scheme(&self) -> String {
        self.shared.borrow().colorizer.name().to_string()
    }

    pub fn registry(&self) -> &ColorSchemeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ColorSchemeRegistry {
        &mut self.registry
    }

    pub fn picture(&self) -> &Rc<RefCell<PictureModel>> {
        &self.picture
    }

    pub fn session(&self) -> &SessionClient<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionClient<C> {
        &mut self.session
    }

    /// Called after every setup frame, once the new tile grid exists.
    pub fn on_picture_ready<F: FnMut(&PictureModel) + 'static>(&mut self, hook: F) {
        self.shared.borrow_mut().on_picture_ready = Some(Box::new(hook));
    }

    /// Called whenever the picture is emptied: on every new calculation and
    /// when a calculation fails.
    pub fn on_picture_cleared<F: FnMut() + 'static>(&mut self, hook: F) {
        self.shared.borrow_mut().on_picture_cleared = Some(Box::new(hook));
    }

    /// Called when a calculation finishes normally.
    pub fn on_complete<F: FnMut() + 'static>(&mut self, hook: F) {
        self.shared.borrow_mut().on_complete = Some(Box::new(hook));
    }

    /// Called with the reason when a calculation fails.
    pub fn on_error<F: FnMut(&str) + 'static>(&mut self, hook: F) {
        self.shared.borrow_mut().on_error = Some(Box::new(hook));
    }
}
