//! # Hashsmith Server Binary
//!
//! Deferred password-hashing HTTP service. Accepts secrets on `POST /hash`,
//! serves their SHA-512 digests by identifier once a fixed delay has elapsed,
//! reports submission statistics, and shuts down gracefully on request or
//! signal.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: localhost:8080, 5s hash delay
//! hashsmith
//!
//! # Custom listen address
//! hashsmith --address 0.0.0.0 --port 9090
//!
//! # With environment variables
//! export HASHSMITH_ADDRESS=127.0.0.1
//! export HASHSMITH_PORT=8080
//! export LOG_LEVEL=debug
//! hashsmith
//! ```

use hashsmith::{HashsmithServer, ServerConfig};
use std::process;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point
///
/// Exit codes:
/// - 0: clean shutdown
/// - 1: configuration error
/// - 2: server startup error
/// - 3: runtime error
#[tokio::main]
async fn main() {
    let config = ServerConfig::from_args();

    if let Err(e) = setup_logging(&config) {
        eprintln!("failed to initialize logging: {e}");
        process::exit(1);
    }

    info!("starting hashsmith v{}", hashsmith::VERSION);

    if let Err(e) = config.validate() {
        error!("configuration invalid: {}", e.internal_message());
        process::exit(1);
    }

    let server = match HashsmithServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("startup failed: {}", e.internal_message());
            process::exit(2);
        }
    };

    match server.local_addr() {
        Ok(addr) => info!("listening on {addr}"),
        Err(e) => {
            error!("startup failed: {}", e.internal_message());
            process::exit(2);
        }
    }

    // The /shutdown endpoint and OS signals share one coordinator; whichever
    // fires first starts the same termination sequence.
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    match server.serve().await {
        Ok(()) => info!("server shut down cleanly"),
        Err(e) => {
            error!("server error: {}", e.internal_message());
            process::exit(3);
        }
    }
}

/// Configure tracing output from the server configuration
///
/// `LOG_LEVEL`/`RUST_LOG` directives still apply on top of the configured
/// default. Production environments get JSON lines, everything else a
/// human-readable format.
fn setup_logging(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let is_production = std::env::var("ENVIRONMENT")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env()?
        .add_directive("hyper=info".parse()?)
        .add_directive("tokio=info".parse()?)
        .add_directive("mio=warn".parse()?);

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

/// Resolve when a shutdown signal arrives
///
/// Listens for SIGINT (Ctrl+C) everywhere and SIGTERM on Unix.
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
