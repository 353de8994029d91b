// SRRS web API endpoints and command dispatch

pub mod dispatch;

pub use dispatch::{DispatchError, Dispatcher};

use anyhow::{bail, Context, Result};
use reqwest::Url;
use std::fmt;

/// Authentication endpoint, relative to the origin
pub const AUTH_PATH: &str = "api/v1/auth";

/// State channel endpoint, relative to the origin
pub const STATE_PATH: &str = "api/v1/state";

/// Destination category of a dispatched payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// `api/v1/command`: a single TRC command
    Command,
    /// `api/v1/turtles`: partial turtle updates keyed by turtle id
    Turtles,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Command => "api/v1/command",
            Destination::Turtles => "api/v1/turtles",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Command => write!(f, "command"),
            Destination::Turtles => write!(f, "turtles"),
        }
    }
}

/// Resolves the SRRS endpoints against a configured origin.
#[derive(Debug, Clone)]
pub struct Endpoints {
    origin: Url,
}

impl Endpoints {
    /// Parse an `http`/`https` origin. A path prefix on the origin is kept.
    pub fn new(origin: &str) -> Result<Self> {
        let mut origin =
            Url::parse(origin).with_context(|| format!("Invalid origin '{}'", origin))?;

        match origin.scheme() {
            "http" | "https" => {}
            other => bail!("Unsupported origin scheme '{}' (expected http or https)", other),
        }

        origin.set_query(None);
        origin.set_fragment(None);
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }

        Ok(Self { origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn auth(&self) -> Url {
        self.endpoint(AUTH_PATH)
    }

    /// State channel URL; the scheme mirrors the origin (http → ws, https → wss).
    pub fn state(&self) -> Url {
        let mut url = self.endpoint(STATE_PATH);
        let scheme = if self.origin.scheme() == "https" { "wss" } else { "ws" };
        // http(s) → ws(s) is always permitted: all four are special schemes
        let _ = url.set_scheme(scheme);
        url
    }

    pub fn destination(&self, destination: Destination) -> Url {
        self.endpoint(destination.path())
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.origin.clone();
        let full = format!("{}{}", self.origin.path(), path);
        url.set_path(&full);
        url
    }
}
