use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Complete remote client configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// SRRS web API location
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Origin of the web API, e.g. "https://srrs.local:4242".
    /// The state channel mirrors its scheme (http → ws, https → wss).
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_origin() -> String {
    std::env::var("TRC_ORIGIN").unwrap_or_else(|_| "http://localhost:4242".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

/// State channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Fixed delay before reconnecting after the state channel drops (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ConnectionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<RemoteConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: RemoteConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
