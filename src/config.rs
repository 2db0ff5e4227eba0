//! Configuration for memwire
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Default memcached address
pub const DEFAULT_SERVER: &str = "127.0.0.1:11211";

/// Default cap on a single retrieved value (memcached's `item_size_max` is 1 MiB)
pub const DEFAULT_MAX_VALUE_LEN: usize = 4 * 1024 * 1024;

/// Main configuration for a memcached client
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Memcached address (host:port). Fixed for the life of the client.
    pub server: String,

    /// Timeout for establishing the TCP connection (None blocks indefinitely)
    pub connect_timeout: Option<Duration>,

    /// Read/write timeout applied once connected (None blocks indefinitely)
    pub timeout: Option<Duration>,

    /// Disable Nagle's algorithm on the socket
    pub no_delay: bool,

    // -------------------------------------------------------------------------
    // Behavior Configuration
    // -------------------------------------------------------------------------
    /// Turn errors on the read paths (get/gets/stats) into cache misses
    pub ignore_exc: bool,

    /// Namespace prepended to every key before validation
    pub key_prefix: Vec<u8>,

    /// Largest data block accepted in a `VALUE` response
    pub max_value_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            connect_timeout: None,
            timeout: None,
            no_delay: false,
            ignore_exc: false,
            key_prefix: Vec::new(),
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the memcached address (host:port)
    pub fn server(mut self, addr: impl Into<String>) -> Self {
        self.config.server = addr.into();
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the operation (read/write) timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.config.no_delay = enabled;
        self
    }

    /// Swallow read-path errors and report them as misses
    pub fn ignore_exc(mut self, enabled: bool) -> Self {
        self.config.ignore_exc = enabled;
        self
    }

    /// Set the key prefix
    pub fn key_prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the largest value a `get` will read
    pub fn max_value_len(mut self, len: usize) -> Self {
        self.config.max_value_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
