use crate::api::{Destination, Endpoints};
use crate::auth::Session;
use crate::protocol::{enable_patch, Command};
use crate::state::Snapshot;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Sends commands and turtle updates to the SRRS web API.
///
/// Stateless: every call is one independent POST authenticated with the
/// session. Nothing is queued or retried.
#[derive(Clone)]
pub struct Dispatcher {
    http: Client,
    endpoints: Endpoints,
}

impl Dispatcher {
    pub fn new(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Fire and forget: encode now, send on a spawned task, log the outcome
    ///
    /// Must be called from within a tokio runtime. Only encoding errors are returned.
    pub fn dispatch<P: Serialize>(
        &self,
        session: &Session,
        destination: Destination,
        payload: &P,
    ) -> Result<(), DispatchError> {
        let body = serde_json::to_string(payload).map_err(DispatchError::Encode)?;
        let dispatcher = self.clone();
        let session = session.clone();

        tokio::spawn(async move {
            match dispatcher.send_body(&session, destination, body).await {
                Ok(()) => debug!(destination = %destination, "Dispatched"),
                Err(e) => warn!(destination = %destination, error = %e, "Dispatch failed"),
            }
        });
        Ok(())
    }

    /// Send and wait for the outcome
    pub async fn send<P: Serialize>(
        &self,
        session: &Session,
        destination: Destination,
        payload: &P,
    ) -> Result<(), DispatchError> {
        let body = serde_json::to_string(payload).map_err(DispatchError::Encode)?;
        self.send_body(session, destination, body).await
    }

    pub fn send_command(&self, session: &Session, command: Command) -> Result<(), DispatchError> {
        debug!(command = %command, "Sending command");
        self.dispatch(session, Destination::Command, &command)
    }

    pub fn update_turtles(&self, session: &Session, update: &Snapshot) -> Result<(), DispatchError> {
        self.dispatch(session, Destination::Turtles, update)
    }

    pub fn set_enabled(&self, session: &Session, id: &str, enabled: bool) -> Result<(), DispatchError> {
        debug!(turtle = %id, enabled, "Toggling turtle");
        self.update_turtles(session, &enable_patch(id, enabled))
    }

    async fn send_body(
        &self,
        session: &Session,
        destination: Destination,
        body: String,
    ) -> Result<(), DispatchError> {
        let response = self
            .http
            .post(self.endpoints.destination(destination))
            .header(AUTHORIZATION, session.authorization())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(DispatchError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            message: message.trim().to_string(),
        })
    }
}

/// Dispatch errors
#[derive(Debug)]
pub enum DispatchError {
    /// Payload could not be encoded as JSON
    Encode(serde_json::Error),
    /// Request could not be sent
    Transport(reqwest::Error),
    /// Endpoint answered with a non-success status
    Rejected { status: u16, message: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Encode(e) => write!(f, "Failed to encode payload: {}", e),
            DispatchError::Transport(e) => write!(f, "Failed to send request: {}", e),
            DispatchError::Rejected { status, message } => {
                write!(f, "Request rejected ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Encode(e) => Some(e),
            DispatchError::Transport(e) => Some(e),
            DispatchError::Rejected { .. } => None,
        }
    }
}
