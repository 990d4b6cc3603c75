//! Server configuration from environment variables.

use std::net::{IpAddr, SocketAddr};

use actors::DEFAULT_EVENT_CAPACITY;

pub const DEFAULT_PORT: u16 = 7000;

/// Configuration errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration for the queue server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub event_capacity: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("QUEUE_BIND_ADDR") {
            config.bind_addr = value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "QUEUE_BIND_ADDR",
                value,
            })?;
        }

        if let Some(value) = get("QUEUE_PORT") {
            match value.trim().parse::<u16>() {
                Ok(port) if port > 0 => config.port = port,
                _ => tracing::warn!(
                    "Ignoring invalid QUEUE_PORT {:?}, using {}",
                    value,
                    DEFAULT_PORT
                ),
            }
        }

        if let Some(value) = get("QUEUE_EVENT_CAPACITY") {
            config.event_capacity = match value.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "QUEUE_EVENT_CAPACITY",
                        value,
                    });
                }
            };
        }

        if let Some(value) = get("CORS_ALLOW_ORIGIN") {
            config.cors_origins = value
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
