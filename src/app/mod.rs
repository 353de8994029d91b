// Coordinator: session, connection status, turtle table and active command

use crate::auth::{AuthError, Authenticator, Session};
use crate::connection::{ConnectionEvent, ConnectionManager, ConnectionStatus, Scheduler, Transport};
use crate::protocol::StateMessage;
use crate::state::{reconcile, TurtleTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};


/// Operator-facing message, e.g. a rejected login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Read-only copy of everything an observer may render
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub logged_in: bool,
    pub status: ConnectionStatus,
    pub turtles: TurtleTable,
    pub command: Option<String>,
    pub notification: Option<Notification>,
}

/// Single owner of the client state.
///
/// All mutation goes through `login_result`, `handle` and `teardown`;
/// observers only get [`DashboardView`] copies.
pub struct App<T, S> {
    manager: ConnectionManager<T, S>,
    turtles: TurtleTable,
    command: Option<String>,
    notification: Option<Notification>,
}

impl<T: Transport, S: Scheduler> App<T, S> {
    pub fn new(manager: ConnectionManager<T, S>) -> Self {
        Self {
            manager,
            turtles: TurtleTable::new(),
            command: None,
            notification: None,
        }
    }

    /// Authenticate and, on success, open the state channel with the new session
    pub async fn submit_credential(&mut self, authenticator: &Authenticator, credential: &str) -> bool {
        let result = authenticator.authenticate(credential).await;
        self.login_result(result)
    }

    /// Apply the outcome of an authentication call
    pub fn login_result(&mut self, result: Result<Session, AuthError>) -> bool {
        match result {
            Ok(session) => {
                info!("Logged in");
                self.notification = None;
                self.manager.start(session);
                true
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.notification = Some(Notification::now(e.notification()));
                false
            }
        }
    }

    /// Process one connection or timer event
    pub fn handle(&mut self, event: ConnectionEvent) {
        if let Some(message) = self.manager.handle(event) {
            self.apply(message);
        }
    }

    pub fn teardown(&mut self) {
        self.manager.teardown();
    }

    pub fn is_logged_in(&self) -> bool {
        self.manager.session().is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.manager.session()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.manager.status()
    }

    pub fn turtles(&self) -> &TurtleTable {
        &self.turtles
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn manager(&self) -> &ConnectionManager<T, S> {
        &self.manager
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            logged_in: self.is_logged_in(),
            status: self.status(),
            turtles: self.turtles.clone(),
            command: self.command.clone(),
            notification: self.notification.clone(),
        }
    }

    fn apply(&mut self, message: StateMessage) {
        if let Some(snapshot) = message.turtles {
            debug!(turtles = snapshot.len(), "Reconciling snapshot");
            self.turtles = reconcile(&self.turtles, &snapshot);
        }
        if let Some(command) = message.command {
            if self.command.as_deref() != Some(command.as_str()) {
                info!(command = %command, "Active command changed");
            }
            self.command = Some(command);
        }
    }
}
