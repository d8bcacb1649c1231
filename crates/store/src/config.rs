//! Connection parameters for a Redis-compatible store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Standard Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Where to find the store and which logical database to use.
///
/// # Examples
///
/// ```
/// use redmap_store::StoreConfig;
///
/// // Use default values
/// let config = StoreConfig::default();
/// assert_eq!(config.to_string(), "localhost:6379/0");
///
/// // Or customize
/// let config = StoreConfig::default().with_host("cache.internal").with_db(2);
/// assert_eq!(config.addr(), "cache.internal:6379");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Server host name or IP address.
    /// Default: "localhost"
    pub host: String,

    /// Server TCP port.
    /// Default: 6379
    pub port: u16,

    /// Logical database index selected after connecting.
    /// Default: 0
    pub db: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db: 0,
        }
    }
}

impl StoreConfig {
    /// Create a configuration from explicit parameters.
    pub fn new(host: impl Into<String>, port: u16, db: u32) -> Self {
        Self {
            host: host.into(),
            port,
            db,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    /// `host:port`, as accepted by `TcpStream::connect`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `host` is empty or contains whitespace
    /// - `port` is 0
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host cannot be empty".to_string());
        }

        if self.host.chars().any(char::is_whitespace) {
            return Err(format!("host '{}' contains whitespace", self.host));
        }

        if self.port == 0 {
            return Err("port must be > 0".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.db)
    }
}
