//! # Integration Tests for the Hashsmith Server
//!
//! End-to-end tests that bind a real server on an ephemeral port and drive it
//! over raw TCP with HTTP/1.1 requests. Every request carries
//! `connection: close` so responses can be read to EOF without an HTTP
//! client dependency.
//!
//! The hash delay is shortened so the submit/poll/retrieve cycle completes
//! quickly; the timing margins are generous enough to stay stable on loaded
//! CI machines.

use hashsmith::server::ShutdownCoordinator;
use hashsmith::{HashsmithServer, ServerConfig};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Base64 SHA-512 digest of "angryMonkey"
const ANGRY_MONKEY_DIGEST: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

/// Hash delay used by these tests, in milliseconds
const TEST_DELAY_MS: u64 = 200;

/// Comfortable margin past the hash delay
const DELAY_MARGIN: Duration = Duration::from_millis(600);

type ServeHandle = JoinHandle<hashsmith::Result<()>>;

/// Bind a server on an ephemeral port and serve it in the background
async fn spawn_server() -> (SocketAddr, Arc<ShutdownCoordinator>, ServeHandle) {
    let config = ServerConfig {
        address: "127.0.0.1".to_string(),
        port: 0,
        hash_delay_ms: TEST_DELAY_MS,
        shutdown_grace_ms: 2_000,
        ..ServerConfig::default()
    };

    let server = HashsmithServer::bind(config).await.expect("bind failed");
    let addr = server.local_addr().expect("no local address");
    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(server.serve());

    (addr, shutdown, handle)
}

/// Send one raw HTTP/1.1 request and return (status, body)
async fn send_request(addr: SocketAddr, raw: String) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    stream.write_all(raw.as_bytes()).await.expect("write failed");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read failed");
    let text = String::from_utf8_lossy(&response).into_owned();

    let status = text
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("malformed response: {text:?}"));
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();

    (status, body)
}

fn request(method: &str, path: &str, body: &str) -> String {
    let mut raw = format!(
        "{method} {path} HTTP/1.1\r\n\
         host: localhost\r\n\
         connection: close\r\n"
    );
    if !body.is_empty() || method == "POST" {
        raw.push_str("content-type: application/x-www-form-urlencoded\r\n");
        raw.push_str(&format!("content-length: {}\r\n", body.len()));
    }
    raw.push_str("\r\n");
    raw.push_str(body);
    raw
}

async fn submit(addr: SocketAddr, password: &str) -> (u16, String) {
    send_request(addr, request("POST", "/hash", &format!("password={password}"))).await
}

async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    send_request(addr, request("GET", path, "")).await
}

#[tokio::test]
async fn test_submit_then_retrieve_after_delay() {
    let (addr, shutdown, _handle) = spawn_server().await;

    // Submission responds immediately with the first identifier
    let (status, body) = submit(addr, "angryMonkey").await;
    assert_eq!(status, 200);
    assert_eq!(body, "1\n");

    // Before the delay elapses the digest is not servable
    let (status, _) = get(addr, "/hash/1").await;
    assert_eq!(status, 404);

    tokio::time::sleep(Duration::from_millis(TEST_DELAY_MS) + DELAY_MARGIN).await;

    let (status, body) = get(addr, "/hash/1").await;
    assert_eq!(status, 200);
    assert_eq!(body, format!("{ANGRY_MONKEY_DIGEST}\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_empty_password_is_rejected_without_allocation() {
    let (addr, shutdown, _handle) = spawn_server().await;

    let (status, body) = submit(addr, "").await;
    assert_eq!(status, 400);
    assert_eq!(body, "Invalid password entry.");

    let (status, body) = send_request(addr, request("POST", "/hash", "user=alice")).await;
    assert_eq!(status, 400);
    assert_eq!(body, "Invalid password entry.");

    // Rejected submissions never appear in the stats
    let (status, body) = get(addr, "/stats").await;
    assert_eq!(status, 200);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["average"], 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_identifiers_are_not_found() {
    let (addr, shutdown, _handle) = spawn_server().await;

    let (status, _) = submit(addr, "onlyRecord").await;
    assert_eq!(status, 200);

    let (status, _) = get(addr, "/hash/999").await;
    assert_eq!(status, 404);

    let (status, _) = get(addr, "/hash/abc").await;
    assert_eq!(status, 404);

    let (status, _) = get(addr, "/hash/0").await;
    assert_eq!(status, 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_wrong_methods_are_rejected() {
    let (addr, shutdown, _handle) = spawn_server().await;

    let (status, _) = get(addr, "/hash").await;
    assert_eq!(status, 405);

    let (status, _) = send_request(addr, request("POST", "/stats", "")).await;
    assert_eq!(status, 405);

    let (status, _) = send_request(addr, request("DELETE", "/hash/1", "")).await;
    assert_eq!(status, 405);

    let (status, _) = get(addr, "/nowhere").await;
    assert_eq!(status, 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_submissions_get_distinct_sequential_ids() {
    const SUBMISSIONS: usize = 8;

    let (addr, shutdown, _handle) = spawn_server().await;

    let values: Vec<String> = (0..SUBMISSIONS).map(|i| format!("secret-{i}")).collect();
    let responses = futures::future::join_all(
        values
            .iter()
            .map(|value| submit(addr, value))
            .collect::<Vec<_>>(),
    )
    .await;

    let mut ids = HashSet::new();
    let mut id_by_value = Vec::new();
    for ((status, body), value) in responses.into_iter().zip(values.iter()) {
        assert_eq!(status, 200);
        let id: u64 = body.trim().parse().expect("body should be an identifier");
        assert!(ids.insert(id), "identifier {id} issued twice");
        id_by_value.push((id, value.clone()));
    }

    // Exactly {1..N}, no duplicates or gaps
    let expected: HashSet<u64> = (1..=SUBMISSIONS as u64).collect();
    assert_eq!(ids, expected);

    tokio::time::sleep(Duration::from_millis(TEST_DELAY_MS) + DELAY_MARGIN).await;

    // Each identifier resolves to the digest of its own value
    for (id, value) in id_by_value {
        let (status, body) = get(addr, &format!("/hash/{id}")).await;
        assert_eq!(status, 200);
        assert_eq!(body, format!("{}\n", hashsmith::digest::digest(&value)));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_stats_reports_count_and_average() {
    let (addr, shutdown, _handle) = spawn_server().await;

    let (status, body) = get(addr, "/stats").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"total":0,"average":0}"#);

    for value in ["one", "two", "three"] {
        let (status, _) = submit(addr, value).await;
        assert_eq!(status, 200);
    }

    let (status, body) = get(addr, "/stats").await;
    assert_eq!(status, 200);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 3);
    assert!(stats["average"].is_u64());

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, shutdown, _handle) = spawn_server().await;

    let (status, body) = get(addr, "/health").await;
    assert_eq!(status, 200);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["records"], 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_endpoint_stops_the_server() {
    let (addr, _shutdown, handle) = spawn_server().await;

    let (status, body) = get(addr, "/shutdown").await;
    assert_eq!(status, 200);
    assert_eq!(body, "Goodbye!");

    // The serve loop finishes its termination sequence on its own
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after /shutdown")
        .expect("serve task panicked");
    assert!(result.is_ok());

    // New connections are refused once the listener is closed
    assert!(TcpStream::connect(addr).await.is_err());
}
