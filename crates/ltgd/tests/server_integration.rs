//! Integration tests for the TCP ticket server.
//!
//! Each test runs a real server on an ephemeral loopback port and speaks
//! the wire protocol over actual sockets: one JSON request in, one
//! plain-text reply out, connection closed by the server.

use std::net::SocketAddr;
use std::time::Duration;

use ltgd::server::TicketServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Constants
// ============================================================================

/// Grace period for in-flight work to settle.
const SETTLE_PERIOD: Duration = Duration::from_millis(100);

/// Maximum time to wait for the server task to finish.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Test Helpers
// ============================================================================

/// Test server bound to an ephemeral loopback port.
struct TestServer {
    addr: SocketAddr,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Binds and serves a fresh server in the background.
    async fn spawn() -> Self {
        let cancel_token = CancellationToken::new();
        let server = TicketServer::bind("127.0.0.1:0".parse().unwrap(), cancel_token.clone())
            .expect("bind test server");
        let addr = server.local_addr();
        let handle = tokio::spawn(server.serve());

        TestServer {
            addr,
            cancel_token,
            handle,
        }
    }

    async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr)
            .await
            .expect("connect to server")
    }

    /// Sends one raw request and reads the whole reply.
    async fn round_trip(&self, raw: &[u8]) -> String {
        round_trip(self.addr, raw).await
    }

    /// Cancels the server and waits for it to wind down.
    async fn shutdown(self) {
        self.cancel_token.cancel();
        timeout(SHUTDOWN_TIMEOUT, self.handle)
            .await
            .expect("server should shut down promptly")
            .expect("server task should not panic");
    }
}

/// One full request/response exchange against `addr`.
async fn round_trip(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect to server");
    stream.write_all(raw).await.expect("send request");
    stream.flush().await.expect("flush request");

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.expect("read reply");
    String::from_utf8(reply).expect("reply is UTF-8")
}

/// Splits a success reply into its header and ticket blocks.
fn split_reply(reply: &str) -> (&str, Vec<&str>) {
    let mut sections = reply.split("\n\n");
    let header = sections.next().expect("reply has a header");
    (header, sections.collect())
}

/// Checks one "Label: n1 n2 ..." line for count, range, and ordering.
fn assert_pool_line(line: &str, label: &str, picks: usize, low: u32, high: u32) {
    let prefix = format!("{label}: ");
    let numbers = line
        .strip_prefix(&prefix)
        .unwrap_or_else(|| panic!("line should start with '{prefix}': {line}"));
    let numbers: Vec<u32> = numbers
        .split(' ')
        .map(|n| n.parse().unwrap_or_else(|_| panic!("bad number in: {line}")))
        .collect();

    assert_eq!(numbers.len(), picks, "pick count in: {line}");
    for pair in numbers.windows(2) {
        assert!(
            pair[0] < pair[1],
            "numbers must be sorted and unique: {line}"
        );
    }
    for n in &numbers {
        assert!((low..=high).contains(n), "number out of range: {line}");
    }
}

// ============================================================================
// Ticket Generation Tests
// ============================================================================

#[tokio::test]
async fn test_server_accepts_connection() {
    let server = TestServer::spawn().await;

    let _stream = server.connect().await;

    server.shutdown().await;
}

#[tokio::test]
async fn test_max_request_round_trip() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"max","requestId":"IT-1","count":2}"#)
        .await;

    let (header, tickets) = split_reply(&reply);
    assert_eq!(header, "Generation Request ID: IT-1\nTicket Type: Max");
    assert_eq!(tickets.len(), 2);
    for ticket in tickets {
        assert_pool_line(ticket, "Lotto Max Numbers", 7, 1, 50);
    }
    assert!(!reply.ends_with('\n'), "reply has no trailing newline");

    server.shutdown().await;
}

#[tokio::test]
async fn test_grand_request_round_trip() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"grand","requestId":"IT-2","count":1}"#)
        .await;

    let (header, tickets) = split_reply(&reply);
    assert_eq!(header, "Generation Request ID: IT-2\nTicket Type: Grand");
    assert_eq!(tickets.len(), 1);

    let lines: Vec<&str> = tickets[0].lines().collect();
    assert_eq!(lines.len(), 2, "a Grand ticket has two pools");
    assert_pool_line(lines[0], "Main Numbers", 5, 1, 49);
    assert_pool_line(lines[1], "Grand Number", 1, 1, 7);

    server.shutdown().await;
}

#[tokio::test]
async fn test_lottario_request_round_trip() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"lottario","requestId":"IT-3"}"#)
        .await;

    let (header, tickets) = split_reply(&reply);
    assert_eq!(header, "Generation Request ID: IT-3\nTicket Type: Lottario");
    // Count omitted: exactly one ticket.
    assert_eq!(tickets.len(), 1);
    assert_pool_line(tickets[0], "Lottario Numbers", 6, 1, 45);

    server.shutdown().await;
}

#[tokio::test]
async fn test_count_accepted_as_numeric_string() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"max","requestId":"IT-4","count":"3"}"#)
        .await;

    let (_, tickets) = split_reply(&reply);
    assert_eq!(tickets.len(), 3);

    server.shutdown().await;
}

// ============================================================================
// Error Reply Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_type_reply() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"bogus","requestId":"B"}"#)
        .await;
    assert_eq!(reply, "[Error] Unknown lottery type: 'bogus'");

    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_field_replies() {
    let server = TestServer::spawn().await;

    let reply = server.round_trip(br#"{"requestId":"B"}"#).await;
    assert_eq!(reply, "[Error] Missing field: 'type'");

    let reply = server.round_trip(br#"{"type":"max"}"#).await;
    assert_eq!(reply, "[Error] Missing field: 'requestId'");

    server.shutdown().await;
}

#[tokio::test]
async fn test_malformed_json_reply() {
    let server = TestServer::spawn().await;

    let reply = server.round_trip(b"{{{ nope").await;
    assert!(
        reply.starts_with("[Error] Malformed request: "),
        "unexpected reply: {reply}"
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_count_out_of_range_replies() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"max","requestId":"Z","count":0}"#)
        .await;
    assert_eq!(reply, "[Error] 'count' must be at least 1");

    let reply = server
        .round_trip(br#"{"type":"max","requestId":"Z","count":101}"#)
        .await;
    assert_eq!(reply, "[Error] 'count' must be at most 100");

    server.shutdown().await;
}

// ============================================================================
// Connection Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_silent_client_gets_no_reply() {
    let server = TestServer::spawn().await;

    let mut stream = server.connect().await;
    // Close the write half without sending anything.
    stream.shutdown().await.expect("close write half");

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.expect("read reply");
    assert!(reply.is_empty(), "no request means no reply");

    server.shutdown().await;
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = TestServer::spawn().await;

    let reply = server
        .round_trip(br#"{"type":"max","requestId":"pre-stop"}"#)
        .await;
    assert!(reply.starts_with("Generation Request ID: pre-stop"));

    // Must not hang with no connections in flight.
    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_connection() {
    let server = TestServer::spawn().await;

    let mut stream = server.connect().await;
    // Give the accept loop time to hand the connection to a worker.
    sleep(SETTLE_PERIOD).await;

    server.cancel_token.cancel();
    sleep(SETTLE_PERIOD).await;
    assert!(
        !server.handle.is_finished(),
        "server must wait for the in-flight connection"
    );

    // The parked worker still serves its request after cancellation.
    stream
        .write_all(br#"{"type":"max","requestId":"late"}"#)
        .await
        .expect("send request");
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.expect("read reply");
    let reply = String::from_utf8(reply).expect("reply is UTF-8");
    assert!(
        reply.starts_with("Generation Request ID: late"),
        "unexpected reply: {reply}"
    );

    drop(stream);
    timeout(SHUTDOWN_TIMEOUT, server.handle)
        .await
        .expect("server should finish once drained")
        .expect("server task should not panic");
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_clients_get_their_own_replies() {
    let server = TestServer::spawn().await;

    let mut handles = Vec::new();
    for i in 0..5 {
        let addr = server.addr;
        handles.push(tokio::spawn(async move {
            let request = format!(r#"{{"type":"lottario","requestId":"client-{i}"}}"#);
            let reply = round_trip(addr, request.as_bytes()).await;
            assert!(
                reply.starts_with(&format!("Generation Request ID: client-{i}\n")),
                "reply mixed up between clients: {reply}"
            );
        }));
    }

    for handle in handles {
        handle.await.expect("concurrent client should succeed");
    }

    server.shutdown().await;
}
