//! # HTTP Server Module
//!
//! Hyper-based HTTP/1 server for the hashsmith service. One Tokio task is
//! spawned per inbound connection; routing and error translation happen here,
//! endpoint logic lives in [`handlers`].
//!
//! ## Shutdown Sequence
//!
//! The accept loop races the listener against the shutdown coordinator. Once
//! triggered (by the `/shutdown` endpoint or an OS signal), the loop exits
//! and the listener closes, then the server waits up to the configured grace
//! period for in-flight connections to finish. Outstanding deferred digest
//! computations are not waited on.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod shutdown;

// Re-export commonly used types
pub use config::ServerConfig;
pub use handlers::HashHandlers;
pub use shutdown::ShutdownCoordinator;

use crate::error::{HashsmithError, Result};
use crate::scheduler::Scheduler;
use crate::server::middleware::RequestTimer;
use crate::store::JobStore;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The hashsmith HTTP server
///
/// Binds eagerly so tests and callers can read the local address before
/// serving. All shared state is constructed here and passed by handle; there
/// are no process-wide singletons.
#[derive(Debug)]
pub struct HashsmithServer {
    config: ServerConfig,
    listener: TcpListener,
    handlers: Arc<HashHandlers>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl HashsmithServer {
    /// Bind the listener and assemble the server's shared state
    ///
    /// ## Errors
    /// Returns `HashsmithError::Server` when the listen address cannot be
    /// bound or resolved.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port))
            .await
            .map_err(|e| {
                HashsmithError::server(
                    format!("failed to bind {}:{}: {e}", config.address, config.port),
                    Some(Box::new(e)),
                )
            })?;

        let store = Arc::new(JobStore::new());
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let scheduler = Scheduler::new(Arc::clone(&store), config.hash_delay());
        let handlers = Arc::new(HashHandlers::new(store, scheduler, Arc::clone(&shutdown)));

        Ok(Self {
            config,
            listener,
            handlers,
            shutdown,
        })
    }

    /// The address the listener is actually bound to
    ///
    /// ## Errors
    /// Returns `HashsmithError::Server` if the socket has gone away.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| HashsmithError::server("listener has no local address", Some(Box::new(e))))
    }

    /// Handle to the shutdown coordinator, for signal handlers and tests
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.shutdown)
    }

    /// Accept and serve connections until shutdown completes
    ///
    /// Returns after the graceful termination sequence: listener closed,
    /// in-flight connections drained or the grace period elapsed.
    pub async fn serve(self) -> Result<()> {
        let Self {
            config,
            listener,
            handlers,
            shutdown,
        } = self;

        // Every connection task holds a clone of this sender; recv() yields
        // None only once the loop's original and all clones are dropped,
        // which is exactly the drained condition.
        let (conn_tx, mut conn_rx) = mpsc::channel::<()>(1);

        loop {
            tokio::select! {
                () = shutdown.wait() => break,
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("failed to accept connection: {e}");
                            continue;
                        }
                    };

                    let handlers = Arc::clone(&handlers);
                    let guard = conn_tx.clone();
                    tokio::task::spawn(async move {
                        let service = service_fn(move |request| {
                            let handlers = Arc::clone(&handlers);
                            async move { handle_request(&handlers, request, remote_addr).await }
                        });
                        if let Err(e) = hyper::server::conn::http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            warn!("connection error from {remote_addr}: {e}");
                        }
                        drop(guard);
                    });
                }
            }
        }

        // Stop accepting before draining
        drop(listener);
        drop(conn_tx);
        info!("listener closed, draining in-flight connections");

        match tokio::time::timeout(config.shutdown_grace(), conn_rx.recv()).await {
            Ok(_) => info!("all connections drained"),
            Err(_) => warn!(
                "shutdown grace period of {}ms elapsed with connections still open",
                config.shutdown_grace_ms
            ),
        }

        Ok(())
    }
}

/// Route one request and translate errors into HTTP responses
///
/// Every handler returns `Result<Response, HashsmithError>`; this boundary is
/// where an error becomes a status code and a short body, so no request-level
/// failure can take the process down.
async fn handle_request(
    handlers: &HashHandlers,
    request: Request<Incoming>,
    remote_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let timer = RequestTimer::start();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = route(handlers, request, &method, &path).await;

    let final_response = match response {
        Ok(response) => response,
        Err(e) => {
            if e.is_critical() {
                error!("error handling {method} {path} from {remote_addr}: {e}");
            } else {
                warn!(
                    "rejected {method} {path} from {remote_addr}: {}",
                    e.internal_message()
                );
            }
            error_response(&e, &path)
        }
    };

    timer.log_completion(method.as_str(), &path, final_response.status().as_u16());
    Ok(final_response)
}

async fn route(
    handlers: &HashHandlers,
    request: Request<Incoming>,
    method: &Method,
    path: &str,
) -> Result<Response<Full<Bytes>>> {
    match (method, path) {
        (&Method::POST, "/hash") => handlers.submit(request).await,
        (_, "/hash") => Err(HashsmithError::method_not_allowed(method.as_str(), path)),

        (&Method::GET, "/stats") => handlers.stats(),
        (_, "/stats") => Err(HashsmithError::method_not_allowed(method.as_str(), path)),

        (&Method::GET | &Method::POST, "/shutdown") => handlers.shutdown(),
        (_, "/shutdown") => Err(HashsmithError::method_not_allowed(method.as_str(), path)),

        (&Method::GET, "/health") => handlers.health(),
        (_, "/health") => Err(HashsmithError::method_not_allowed(method.as_str(), path)),

        (&Method::GET, p) if p.starts_with("/hash/") => handlers.retrieve(p),
        (_, p) if p.starts_with("/hash/") => {
            Err(HashsmithError::method_not_allowed(method.as_str(), path))
        }

        _ => Err(HashsmithError::not_found(format!("no route for {path}"))),
    }
}

/// Translate an error into its HTTP response
///
/// The endpoints that close their connections on success close them on
/// failure too.
fn error_response(error: &HashsmithError, path: &str) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let close = matches!(path, "/hash" | "/shutdown");

    handlers::text_response(status, error.client_message().to_string(), close)
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from("Internal server error")))
                .expect("static error response must build")
        })
}
