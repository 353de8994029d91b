use crate::auth::Session;
use crate::connection::transport::{
    ConnectionEvent, Generation, Scheduler, SocketEvent, StateRequest, TimerHandle, Transport,
};
use crate::protocol::{decode_state, session_frame, StateMessage};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// State channel status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}

/// Owns the state channel of one session and keeps it alive
///
/// Every close or error schedules a single reconnect after `retry_delay`,
/// forever, until [`ConnectionManager::teardown`]. At most one retry timer
/// is pending at any time (`pending_retry`), and only events of the active
/// generation are acted upon.
pub struct ConnectionManager<T, S> {
    transport: T,
    scheduler: S,
    url: Url,
    retry_delay: Duration,

    session: Option<Session>,
    status: ConnectionStatus,

    last_generation: Generation,
    active: Option<Generation>,
    pending_retry: Option<TimerHandle>,

    torn_down: bool,
}

impl<T: Transport, S: Scheduler> ConnectionManager<T, S> {
    pub fn new(transport: T, scheduler: S, url: Url, retry_delay: Duration) -> Self {
        Self {
            transport,
            scheduler,
            url,
            retry_delay,
            session: None,
            status: ConnectionStatus::Disconnected,
            last_generation: Generation::default(),
            active: None,
            pending_retry: None,
            torn_down: false,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn active_generation(&self) -> Option<Generation> {
        self.active
    }

    pub fn has_pending_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Replace the session and (re)connect with it
    pub fn start(&mut self, session: Session) {
        self.release();
        self.session = Some(session);
        self.torn_down = false;
        self.connect();
    }

    /// Open a new connection, superseding the active one and any pending retry
    pub fn connect(&mut self) {
        if self.torn_down {
            debug!("Connection manager torn down, not connecting");
            return;
        }

        let authorization = match &self.session {
            Some(session) => session.authorization(),
            None => {
                warn!("No session, not connecting");
                return;
            }
        };

        self.release();

        let generation = self.last_generation.next();
        self.last_generation = generation;
        self.active = Some(generation);
        self.status = ConnectionStatus::Connecting;

        info!(generation = %generation, url = %self.url, "Connecting state channel");

        let request = StateRequest {
            url: self.url.clone(),
            authorization,
        };
        if let Err(e) = self.transport.open(generation, &request) {
            warn!(generation = %generation, error = %e, "Failed to open state channel");
            self.disconnected(generation);
        }
    }

    /// Feed one event into the state machine
    ///
    /// Returns the decoded state frame for messages of the active connection.
    pub fn handle(&mut self, event: ConnectionEvent) -> Option<StateMessage> {
        match event {
            ConnectionEvent::RetryDue(handle) => {
                self.retry_due(handle);
                None
            }
            ConnectionEvent::Socket { generation, event } => {
                if self.active != Some(generation) {
                    debug!(generation = %generation, "Ignoring event from superseded connection");
                    return None;
                }

                match event {
                    SocketEvent::Opened => {
                        self.opened(generation);
                        None
                    }
                    SocketEvent::Message(text) => match decode_state(&text) {
                        Ok(message) => Some(message),
                        Err(e) => {
                            warn!(generation = %generation, error = %e, "Dropping undecodable state frame");
                            None
                        }
                    },
                    SocketEvent::Closed => {
                        info!(generation = %generation, "State channel closed");
                        self.disconnected(generation);
                        None
                    }
                    SocketEvent::Error(e) => {
                        warn!(generation = %generation, error = %e, "State channel error");
                        self.transport.close(generation);
                        self.disconnected(generation);
                        None
                    }
                }
            }
        }
    }

    /// Close the connection and cancel the pending retry; nothing reconnects afterwards
    pub fn teardown(&mut self) {
        if !self.torn_down {
            info!("Tearing down state channel");
        }
        self.torn_down = true;
        self.release();
        self.status = ConnectionStatus::Disconnected;
    }

    fn opened(&mut self, generation: Generation) {
        info!(generation = %generation, "State channel open");
        self.status = ConnectionStatus::Connected;

        let Some(session) = &self.session else {
            return;
        };
        if let Err(e) = self.transport.send(generation, session_frame(session)) {
            warn!(generation = %generation, error = %e, "Failed to send session");
            self.transport.close(generation);
            self.disconnected(generation);
        }
    }

    fn disconnected(&mut self, generation: Generation) {
        if self.active == Some(generation) {
            self.active = None;
        }
        self.status = ConnectionStatus::Disconnected;
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        if self.torn_down || self.session.is_none() {
            return;
        }
        if self.pending_retry.is_some() {
            debug!("Retry already pending");
            return;
        }

        debug!(delay_ms = self.retry_delay.as_millis() as u64, "Scheduling reconnect");
        self.pending_retry = Some(self.scheduler.schedule(self.retry_delay));
    }

    fn retry_due(&mut self, handle: TimerHandle) {
        if self.pending_retry != Some(handle) {
            debug!("Ignoring stale retry timer");
            return;
        }
        self.pending_retry = None;
        self.connect();
    }

    // Both halves are no-ops when the resource is absent
    fn release(&mut self) {
        if let Some(generation) = self.active.take() {
            self.transport.close(generation);
        }
        if let Some(handle) = self.pending_retry.take() {
            self.scheduler.cancel(handle);
        }
    }
}
