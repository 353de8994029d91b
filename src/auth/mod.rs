use crate::api::Endpoints;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::AUTHORIZATION, Client, Url};
use std::fmt;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Fixed user name of the SRRS Basic authorization scheme
pub const BASIC_USER: &str = "user";

/// Build the Authorization header value for a credential or session token
///
/// Format: "Basic base64(user:<secret>)"
pub fn basic_authorization(secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", BASIC_USER, secret));
    format!("Basic {}", encoded)
}

/// Opaque session token issued by the authentication endpoint.
///
/// Replaced wholesale on every successful login, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Authorization header value carrying this session
    pub fn authorization(&self) -> String {
        basic_authorization(&self.0)
    }
}

// Tokens end up in logs through Debug otherwise
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session(<{} chars>)", self.0.len())
    }
}

/// Exchanges an operator credential for a session token.
///
/// One GET per call; no retries and no timeout beyond the HTTP client's own.
pub struct Authenticator {
    http: Client,
    url: Url,
}

impl Authenticator {
    pub fn new(http: Client, endpoints: &Endpoints) -> Self {
        Self {
            http,
            url: endpoints.auth(),
        }
    }

    pub async fn authenticate(&self, credential: &str) -> Result<Session, AuthError> {
        debug!(url = %self.url, "Requesting session");

        let response = self
            .http
            .get(self.url.clone())
            .header(AUTHORIZATION, basic_authorization(credential))
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Transport)?;
        let body = body.trim();

        if !status.is_success() {
            warn!(status = status.as_u16(), "Authentication rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: body.to_string(),
            });
        }

        if body.is_empty() {
            return Err(AuthError::EmptySession);
        }

        info!("Authenticated");
        Ok(Session::new(body))
    }
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    /// Request could not be sent or its body could not be read
    Transport(reqwest::Error),
    /// Endpoint answered with a non-success status; `message` is the response body
    Rejected { status: u16, message: String },
    /// Endpoint answered OK without a session token
    EmptySession,
}

impl AuthError {
    /// Operator-facing notification text
    pub fn notification(&self) -> String {
        match self {
            AuthError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Transport(e) => write!(f, "Failed to reach authentication endpoint: {}", e),
            AuthError::Rejected { status, message } => {
                write!(f, "Authentication rejected ({}): {}", status, message)
            }
            AuthError::EmptySession => write!(f, "Authentication endpoint returned no session"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
