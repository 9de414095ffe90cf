//! Protocol client for one logical calculation session.
//!
//! The client owns at most one current connection. Starting a calculation
//! closes the previous connection first, so the newest request always wins.
//! Each connection is tagged with a [`SessionId`]; transport events carrying
//! any other id are stale and dropped.
//!
//! States: `Idle → Connecting → Open → Closed`, with `ErrorClosed` as the
//! alternate terminal state of `Connecting` and `Open`.

use crate::error::SessionError;
use crate::frames::{CloseSignal, ServerFrame, SetupInfo, TileResult};
use crate::request::CalculationRequest;
use std::fmt;

/// Tags one connection. Increases with every `calculate`.
pub type SessionId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closed,
    ErrorClosed,
}

/// What a transport reports back about a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Frame(String),
    Closed(CloseSignal),
}

/// An open (or opening) transport connection.
pub trait Connection {
    /// Request closure. Must not report events synchronously.
    fn close(&mut self);
}

/// Opens transport connections.
///
/// Implementations deliver the connection's events to
/// [`SessionClient::handle_event`] with the `session` id given here, each as
/// its own turn (never synchronously from inside `open` or `close`).
pub trait Connector {
    type Connection: Connection;

    fn open(&mut self, session: SessionId, url: &str) -> Result<Self::Connection, SessionError>;
}

/// One optional handler per event kind. Unset slots are no-ops.
#[derive(Default)]
struct SessionCallbacks {
    on_setup: Option<Box<dyn FnMut(SetupInfo)>>,
    on_message: Option<Box<dyn FnMut(TileResult)>>,
    on_close: Option<Box<dyn FnMut()>>,
    on_error: Option<Box<dyn FnMut(String)>>,
}

struct ActiveConnection<T> {
    id: SessionId,
    connection: T,
}

/// Session protocol client.
///
/// Handlers run inside `handle_event`/`calculate` and must not call back
/// into the same client.
pub struct SessionClient<C: Connector> {
    backend_url: String,
    connector: C,
    current: Option<ActiveConnection<C::Connection>>,
    last_session: SessionId,
    state: SessionState,
    callbacks: SessionCallbacks,
    logging: bool,
}

impl<C: Connector> SessionClient<C> {
    pub fn new(backend_url: impl Into<String>, connector: C) -> Self {
        Self {
            backend_url: backend_url.into(),
            connector,
            current: None,
            last_session: 0,
            state: SessionState::Idle,
            callbacks: SessionCallbacks::default(),
            logging: false,
        }
    }

    pub fn set_backend_url(&mut self, url: impl Into<String>) {
        self.backend_url = url.into();
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn activate_logging(&mut self) {
        self.logging = true;
    }

    pub fn deactivate_logging(&mut self) {
        self.logging = false;
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    pub fn on_setup<F: FnMut(SetupInfo) + 'static>(&mut self, handler: F) {
        self.callbacks.on_setup = Some(Box::new(handler));
    }

    pub fn on_message<F: FnMut(TileResult) + 'static>(&mut self, handler: F) {
        self.callbacks.on_message = Some(Box::new(handler));
    }

    pub fn on_close<F: FnMut() + 'static>(&mut self, handler: F) {
        self.callbacks.on_close = Some(Box::new(handler));
    }

    pub fn on_error<F: FnMut(String) + 'static>(&mut self, handler: F) {
        self.callbacks.on_error = Some(Box::new(handler));
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Id of the current connection, if there is one.
    pub fn current_session(&self) -> Option<SessionId> {
        self.current.as_ref().map(|active| active.id)
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Start a new session for `request`, superseding any current one.
    pub fn calculate(
        &mut self,
        request: &CalculationRequest,
    ) -> Result<SessionId, SessionError> {
        if let Some(mut previous) = self.current.take() {
            self.trace(format_args!("closing previous socket {}.", previous.id));
            previous.connection.close();
        }

        self.last_session = self.last_session.wrapping_add(1);
        let id = self.last_session;
        let url = request.url(&self.backend_url);

        self.trace(format_args!("opening socket {} to {}...", id, url));
        match self.connector.open(id, &url) {
            Ok(connection) => {
                self.current = Some(ActiveConnection { id, connection });
                self.state = SessionState::Connecting;
                Ok(id)
            }
            Err(err) => {
                log::error!("Could not open socket to {}: {}", url, err);
                self.state = SessionState::ErrorClosed;
                if let Some(handler) = self.callbacks.on_error.as_mut() {
                    handler(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Close the current connection without reporting a completion.
    pub fn close(&mut self) {
        if let Some(mut active) = self.current.take() {
            self.trace(format_args!("closing socket {}.", active.id));
            active.connection.close();
            self.state = SessionState::Closed;
        }
    }

    /// Feed one transport event for connection `session`.
    pub fn handle_event(&mut self, session: SessionId, event: ConnectionEvent) {
        if self.current_session() != Some(session) {
            log::debug!(
                "Ignoring event from stale socket {} (current {:?})",
                session,
                self.current_session()
            );
            return;
        }

        match event {
            ConnectionEvent::Opened => {
                self.trace(format_args!("socket {} open.", session));
                self.state = SessionState::Open;
            }
            ConnectionEvent::Frame(text) => self.handle_frame(&text),
            ConnectionEvent::Closed(signal) => self.handle_close(signal),
        }
    }

    fn handle_frame(&mut self, text: &str) {
        match ServerFrame::decode(text) {
            Ok(ServerFrame::Setup(setup)) => {
                if let Some(handler) = self.callbacks.on_setup.as_mut() {
                    handler(setup);
                }
            }
            Ok(ServerFrame::Result(result)) => {
                if let Some(handler) = self.callbacks.on_message.as_mut() {
                    handler(result);
                }
            }
            Err(err) => {
                log::error!("Unintelligible message received ({}): {}", err, text);
            }
        }
    }

    fn handle_close(&mut self, signal: CloseSignal) {
        self.current = None;

        if signal.is_normal() {
            self.trace(format_args!("socket was closed cleanly."));
            self.state = SessionState::Closed;
            if let Some(handler) = self.callbacks.on_close.as_mut() {
                handler();
            }
        } else {
            log::error!(
                "Socket was closed unexpectedly: {} ({})",
                signal.reason,
                signal.code
            );
            self.state = SessionState::ErrorClosed;
            if let Some(handler) = self.callbacks.on_error.as_mut() {
                handler(signal.reason);
            }
        }
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.logging {
            log::info!("{}", args);
        }
    }
}
