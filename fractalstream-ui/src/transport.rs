//! WebSocket transport for the session client.

use fractalstream_core::{
    CloseSignal, Connection, ConnectionEvent, Connector, SessionError, SessionId,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

/// Where socket callbacks deliver their events.
pub type EventSink = Rc<dyn Fn(SessionId, ConnectionEvent)>;

/// Opens one `WebSocket` per session and forwards its events to `sink`.
pub struct WebSocketConnector {
    sink: EventSink,
}

impl WebSocketConnector {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    fn open(&mut self, session: SessionId, url: &str) -> Result<WebSocketConnection, SessionError> {
        let socket = WebSocket::new(url).map_err(|err| SessionError::Connect(js_message(&err)))?;
        let handlers = Handlers::attach(&socket, session, &self.sink);
        Ok(WebSocketConnection {
            socket,
            handlers: Some(handlers),
        })
    }
}

struct Handlers {
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
}

impl Handlers {
    fn attach(socket: &WebSocket, session: SessionId, sink: &EventSink) -> Self {
        let onopen = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |_: Event| {
                sink(session, ConnectionEvent::Opened);
            }) as Box<dyn FnMut(_)>)
        };

        let onmessage = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |e: MessageEvent| match e.data().as_string() {
                Some(text) => sink(session, ConnectionEvent::Frame(text)),
                None => log::warn!("Socket {} sent a non-text frame, ignoring", session),
            }) as Box<dyn FnMut(_)>)
        };

        let onclose = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |e: CloseEvent| {
                let signal = CloseSignal::new(e.code(), e.was_clean(), e.reason());
                sink(session, ConnectionEvent::Closed(signal));
            }) as Box<dyn FnMut(_)>)
        };

        // The browser always follows an error with a close event.
        let onerror = Closure::wrap(Box::new(move |_: Event| {
            log::warn!("Socket {} reported an error", session);
        }) as Box<dyn FnMut(_)>);

        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Self {
            _onopen: onopen,
            _onmessage: onmessage,
            _onclose: onclose,
            _onerror: onerror,
        }
    }
}

/// A session's socket. Dropping it closes the socket.
pub struct WebSocketConnection {
    socket: WebSocket,
    handlers: Option<Handlers>,
}

impl WebSocketConnection {
    /// Detach the callbacks so a superseded socket can no longer report.
    fn detach(&mut self) {
        let Some(handlers) = self.handlers.take() else {
            return;
        };
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        self.socket.set_onerror(None);

        // The connection is often dropped from inside one of these closures,
        // so free them on a later turn.
        wasm_bindgen_futures::spawn_local(async move {
            drop(handlers);
        });
    }
}

impl Connection for WebSocketConnection {
    fn close(&mut self) {
        self.detach();
        if let Err(err) = self.socket.close() {
            log::warn!("Failed to close socket: {}", js_message(&err));
        }
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        let live = matches!(
            self.socket.ready_state(),
            WebSocket::CONNECTING | WebSocket::OPEN
        );
        if live {
            self.close();
        } else {
            self.detach();
        }
    }
}

/// Human-readable text of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
