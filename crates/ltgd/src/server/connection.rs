//! Per-connection request handling.
//!
//! The wire exchange is a single round trip: the client sends one JSON
//! request, the daemon answers with one plain-text payload and closes
//! the connection. Requests that fail to parse or name an unknown game
//! still get a reply, prefixed with the error marker, so the client
//! never has to infer failure from a dropped connection.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use ltg_core::{LotteryType, TicketService};
use ltg_protocol::{error_payload, parse_request, TicketResponse};

/// Largest request the daemon reads, in bytes. More than enough for the
/// three-field JSON object; anything past this is ignored.
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Handles one accepted client connection.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    connection_number: u64,
    service: TicketService,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        connection_number: u64,
        service: TicketService,
    ) -> Self {
        Self {
            stream,
            peer,
            connection_number,
            service,
        }
    }

    /// Serves the connection's single request, then closes.
    ///
    /// The request is taken from one read. There is no read timeout: a
    /// client that connects and stays silent parks this worker until it
    /// disconnects.
    pub async fn run(mut self) -> std::io::Result<()> {
        debug!(
            connection = self.connection_number,
            peer = %self.peer,
            "Client connected"
        );

        let mut buf = vec![0u8; MAX_REQUEST_SIZE];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            debug!(
                connection = self.connection_number,
                "Client disconnected without sending a request"
            );
            return Ok(());
        }
        buf.truncate(n);

        let reply = respond(&self.service, &buf);
        self.stream.write_all(reply.as_bytes()).await?;
        self.stream.flush().await?;
        self.stream.shutdown().await?;

        debug!(
            connection = self.connection_number,
            bytes = reply.len(),
            "Response sent"
        );
        Ok(())
    }
}

/// Computes the reply for one raw request.
///
/// Never fails: every problem with the request collapses into an error
/// payload for the client. Only transport problems are the caller's to
/// handle.
pub fn respond(service: &TicketService, raw: &[u8]) -> String {
    let request = match parse_request(raw) {
        Ok(request) => request,
        Err(e) => return error_payload(&e.to_string()),
    };

    let lottery: LotteryType = match request.lottery_type.parse() {
        Ok(lottery) => lottery,
        Err(e) => return error_payload(&e.to_string()),
    };

    let tickets = service.generate(lottery, request.count);
    TicketResponse::new(request.request_id, lottery, tickets).to_string()
}
