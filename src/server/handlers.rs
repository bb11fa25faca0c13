//! # Request Handlers Module
//!
//! Endpoint logic for the hashsmith server: submit, retrieve, stats,
//! shutdown, and health. Handlers orchestrate the store, the scheduler, and
//! the shutdown coordinator; routing and error translation live in the
//! server module.

use crate::error::{HashsmithError, Result};
use crate::scheduler::Scheduler;
use crate::server::middleware::RequestTimer;
use crate::server::shutdown::ShutdownCoordinator;
use crate::store::JobStore;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// JSON body served by the stats endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    /// Number of submissions accepted
    pub total: u64,
    /// Integer mean of recorded handling times, in microseconds
    pub average: u64,
}

/// Endpoint handlers sharing the store, scheduler, and shutdown coordinator
///
/// Constructed once per server; every connection task holds a handle.
#[derive(Debug)]
pub struct HashHandlers {
    store: Arc<JobStore>,
    scheduler: Scheduler,
    shutdown: Arc<ShutdownCoordinator>,
}

impl HashHandlers {
    /// Create the handler set
    #[must_use]
    pub fn new(
        store: Arc<JobStore>,
        scheduler: Scheduler,
        shutdown: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            store,
            scheduler,
            shutdown,
        }
    }

    /// Handle `POST /hash`: accept a secret, allocate an identifier, defer
    /// the digest computation
    ///
    /// The response carries the 1-based identifier and closes the
    /// connection, so the client is never left waiting on the deferred work.
    /// Empty or missing `password` fields are rejected before an identifier
    /// is allocated or a timing sample is recorded.
    pub async fn submit(&self, request: Request<Incoming>) -> Result<Response<Full<Bytes>>> {
        let timer = RequestTimer::start();

        let body_bytes = request
            .into_body()
            .collect()
            .await
            .map_err(|e| HashsmithError::invalid_input(format!("failed to read body: {e}")))?
            .to_bytes();

        let password = parse_password(&body_bytes)
            .ok_or_else(|| HashsmithError::invalid_input("missing or empty password field"))?;

        let id = self.store.allocate();
        debug!(id, "allocated hash record");

        self.store.record_timing(timer.elapsed_micros());
        self.scheduler.schedule(id, password);

        text_response(StatusCode::OK, format!("{id}\n"), true)
    }

    /// Handle `GET /hash/<id>`: serve a completed digest
    ///
    /// Unknown identifiers and identifiers whose digest is still pending are
    /// both reported as not found; the client retries later.
    pub fn retrieve(&self, path: &str) -> Result<Response<Full<Bytes>>> {
        let id = parse_record_id(path)
            .ok_or_else(|| HashsmithError::not_found(format!("no record for path {path}")))?;

        match self.store.get(id) {
            Some(record) => match record.digest {
                Some(digest) => text_response(StatusCode::OK, format!("{digest}\n"), false),
                None => Err(HashsmithError::not_found(format!(
                    "digest for record {id} not ready"
                ))),
            },
            None => Err(HashsmithError::not_found(format!("no record with id {id}"))),
        }
    }

    /// Handle `GET /stats`: submission count and average handling time
    pub fn stats(&self) -> Result<Response<Full<Bytes>>> {
        let snapshot = self.store.snapshot();
        let body = serde_json::to_string(&StatsResponse {
            total: snapshot.total,
            average: snapshot.average_micros,
        })?;
        json_response(StatusCode::OK, body)
    }

    /// Handle `GET /health`: liveness summary
    pub fn health(&self) -> Result<Response<Full<Bytes>>> {
        let snapshot = self.store.snapshot();
        let body = serde_json::to_string(&serde_json::json!({
            "status": "ok",
            "version": crate::VERSION,
            "records": snapshot.total,
        }))?;
        json_response(StatusCode::OK, body)
    }

    /// Handle `GET|POST /shutdown`: acknowledge, then begin termination
    ///
    /// Triggering stops the accept loop immediately; this connection is
    /// already in flight and gets drained, so the goodbye still reaches the
    /// caller before the listener closes.
    pub fn shutdown(&self) -> Result<Response<Full<Bytes>>> {
        info!("shutdown requested via endpoint");
        self.shutdown.trigger();
        text_response(StatusCode::OK, "Goodbye!".to_string(), true)
    }
}

/// Extract a non-empty `password` field from a form-encoded body
///
/// Returns `None` when the field is missing or empty.
fn parse_password(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "password")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Extract the record identifier from a `/hash/<id>` path
///
/// Returns `None` for anything that is not a plain decimal number.
fn parse_record_id(path: &str) -> Option<u64> {
    path.strip_prefix("/hash/")?.parse().ok()
}

/// Build a plain-text response, optionally marking the connection for close
pub(crate) fn text_response(
    status: StatusCode,
    body: String,
    close: bool,
) -> Result<Response<Full<Bytes>>> {
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .header("content-length", body.len());
    if close {
        builder = builder.header("connection", "close");
    }
    Ok(builder.body(Full::new(Bytes::from(body)))?)
}

/// Build a JSON response
pub(crate) fn json_response(status: StatusCode, body: String) -> Result<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Full::new(Bytes::from(body)))?)
}
