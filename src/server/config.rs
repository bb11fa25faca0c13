//! # Server Configuration Module
//!
//! Configuration for the hashsmith server, loaded from command-line arguments
//! with environment-variable fallbacks. The listen address and port are
//! separate flags so `--address localhost --port 8080` works the way the
//! service has always been started.

use crate::error::{HashsmithError, Result};
use clap::Parser;
use tracing::Level;

/// Complete server configuration
///
/// Defaults bind to `localhost:8080` with the standard five-second hash
/// delay. The delay and the shutdown grace period are configurable mainly so
/// tests can run with short values.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hashsmith",
    about = "Deferred password-hashing HTTP service",
    version,
    long_about = None
)]
pub struct ServerConfig {
    /// Address to listen on
    ///
    /// Accepts a hostname or an IP address.
    #[arg(
        short = 'a',
        long = "address",
        value_name = "ADDRESS",
        default_value = crate::DEFAULT_ADDRESS,
        env = "HASHSMITH_ADDRESS",
        help = "Address to listen on"
    )]
    pub address: String,

    /// Port to listen on
    ///
    /// Port 0 asks the OS for an ephemeral port; the bound port is logged at
    /// startup.
    #[arg(
        short = 'p',
        long = "port",
        value_name = "PORT",
        default_value_t = crate::DEFAULT_PORT,
        env = "HASHSMITH_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    /// Logging level for the server
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        env = "LOG_LEVEL",
        help = "Logging level (error, warn, info, debug, trace)"
    )]
    pub log_level: Level,

    /// Delay before each scheduled digest computation runs, in milliseconds
    ///
    /// Simulates expensive hashing. Submission responses never wait on it.
    #[arg(
        long = "hash-delay-ms",
        value_name = "MILLISECONDS",
        default_value_t = crate::DEFAULT_HASH_DELAY_MS,
        env = "HASHSMITH_HASH_DELAY_MS",
        help = "Delay before digest computation in milliseconds"
    )]
    pub hash_delay_ms: u64,

    /// Upper bound on waiting for in-flight connections at shutdown, in
    /// milliseconds
    #[arg(
        long = "shutdown-grace-ms",
        value_name = "MILLISECONDS",
        default_value_t = crate::DEFAULT_SHUTDOWN_GRACE_MS,
        env = "HASHSMITH_SHUTDOWN_GRACE_MS",
        help = "Shutdown grace period in milliseconds"
    )]
    pub shutdown_grace_ms: u64,
}

impl ServerConfig {
    /// Load configuration from command-line arguments and environment
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Validate the configuration for consistency
    ///
    /// ## Errors
    /// Returns `HashsmithError::Config` when a value cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(HashsmithError::config("listen address cannot be empty", None));
        }

        if self.hash_delay_ms == 0 {
            return Err(HashsmithError::config("hash delay cannot be zero", None));
        }

        if self.shutdown_grace_ms == 0 {
            return Err(HashsmithError::config(
                "shutdown grace period cannot be zero",
                None,
            ));
        }

        Ok(())
    }

    /// The configured hash delay as a [`std::time::Duration`]
    #[must_use]
    pub fn hash_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.hash_delay_ms)
    }

    /// The configured shutdown grace period as a [`std::time::Duration`]
    #[must_use]
    pub fn shutdown_grace(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: crate::DEFAULT_ADDRESS.to_string(),
            port: crate::DEFAULT_PORT,
            log_level: Level::INFO,
            hash_delay_ms: crate::DEFAULT_HASH_DELAY_MS,
            shutdown_grace_ms: crate::DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}
