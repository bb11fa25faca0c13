//! # Hashsmith
//!
//! A small asynchronous HTTP service that accepts secret values, assigns each
//! one a sequential identifier, and computes a SHA-512 digest of the value
//! after a fixed artificial delay. Clients poll for the digest by identifier.
//!
//! ## Architecture
//!
//! The crate follows a modular design with clear separation of concerns:
//!
//! - [`error`] - Error types mapped to HTTP status codes at the handler boundary
//! - [`digest`] - Pure SHA-512 digest computation with base64 text encoding
//! - [`store`] - Mutex-guarded append-only record and timing-sample store
//! - [`scheduler`] - Deferred digest computation decoupled from request handling
//! - [`server`] - Hyper-based HTTP server, routing, and graceful shutdown
//!
//! ## Request Lifecycle
//!
//! 1. `POST /hash` allocates an identifier under the store lock, responds
//!    immediately, and hands the value to the scheduler.
//! 2. The scheduler sleeps for the configured delay, then writes the digest
//!    back into the store. The requesting connection is long gone by then.
//! 3. `GET /hash/<id>` serves the digest once it is present; until then the
//!    identifier is indistinguishable from an unknown one.
//!
//! ## Thread Safety
//!
//! The record store and the timing-sample collection are the only shared
//! mutable state. Both live behind a single coarse lock that is held only for
//! the duration of an in-memory mutation, never across network I/O or the
//! scheduler delay.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use hashsmith::{HashsmithServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let server = HashsmithServer::bind(config).await?;
//!     server.serve().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod digest;
pub mod error;
pub mod scheduler;
pub mod server;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{HashsmithError, Result};
pub use server::{HashsmithServer, ServerConfig};

/// Version information for the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "localhost";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Delay before a scheduled digest computation runs, in milliseconds
///
/// Simulates an expensive hashing operation. The submission response is
/// never blocked on this delay.
pub const DEFAULT_HASH_DELAY_MS: u64 = 5_000;

/// Upper bound on how long shutdown waits for in-flight connections
///
/// Outstanding deferred computations are not covered by this bound; the
/// process may exit before they complete.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 10_000;
