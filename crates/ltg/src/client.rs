//! TCP client for a running ticket daemon.
//!
//! Speaks the daemon's single-round-trip protocol: open a connection,
//! write one JSON request, read the whole reply, done. Batch mode fans
//! the same request out over several parallel connections, which is also
//! how the daemon's per-connection isolation gets exercised from the
//! command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::ClientError;
use ltg_core::LotteryType;
use ltg_protocol::ERROR_PREFIX;

/// Client bound to one daemon address.
#[derive(Debug, Clone, Copy)]
pub struct TicketClient {
    addr: SocketAddr,
}

/// A daemon reply, split into ticket text or a daemon-side rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonReply {
    /// Formatted ticket text, exactly as the daemon sent it.
    Tickets(String),
    /// The daemon rejected the request; the reason without the marker.
    Rejected(String),
}

impl DaemonReply {
    fn classify(text: String) -> Self {
        match text.strip_prefix(ERROR_PREFIX) {
            Some(reason) => DaemonReply::Rejected(reason.trim_start().to_string()),
            None => DaemonReply::Tickets(text),
        }
    }
}

/// Outcome of one request in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// The request id actually sent, suffix included.
    pub request_id: String,
    pub result: Result<DaemonReply, ClientError>,
}

impl TicketClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// The daemon address this client talks to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends one generation request and returns the daemon's reply.
    pub async fn request_tickets(
        &self,
        lottery: LotteryType,
        request_id: &str,
        count: u32,
    ) -> Result<DaemonReply, ClientError> {
        let payload = serde_json::json!({
            "type": lottery.wire_name(),
            "requestId": request_id,
            "count": count,
        });
        let raw = serde_json::to_vec(&payload)?;

        let mut stream =
            TcpStream::connect(self.addr)
                .await
                .map_err(|e| ClientError::Connect {
                    addr: self.addr,
                    source: e,
                })?;
        debug!(addr = %self.addr, request_id, "Connected to daemon");

        stream.write_all(&raw).await?;
        stream.flush().await?;
        // Half-close the write side; the reply ends at EOF.
        stream.shutdown().await?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await?;
        if reply.is_empty() {
            return Err(ClientError::EmptyReply);
        }
        let text = String::from_utf8(reply).map_err(|_| ClientError::InvalidReply)?;

        debug!(request_id, bytes = text.len(), "Reply received");
        Ok(DaemonReply::classify(text))
    }

    /// Runs `amount` requests in parallel, one connection each.
    ///
    /// With more than one request the ids get a `-<index>` suffix so
    /// every connection is distinguishable on the daemon side. Items
    /// come back in index order regardless of completion order.
    pub async fn request_batch(
        &self,
        lottery: LotteryType,
        request_id: &str,
        count: u32,
        amount: u32,
    ) -> Vec<BatchItem> {
        if amount <= 1 {
            let result = self.request_tickets(lottery, request_id, count).await;
            return vec![BatchItem {
                request_id: request_id.to_string(),
                result,
            }];
        }

        let mut handles = Vec::with_capacity(amount as usize);
        for index in 0..amount {
            let client = *self;
            let suffixed = format!("{request_id}-{index}");
            let task_id = suffixed.clone();
            handles.push((
                suffixed,
                tokio::spawn(async move {
                    client.request_tickets(lottery, &task_id, count).await
                }),
            ));
        }

        let mut items = Vec::with_capacity(handles.len());
        for (request_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ClientError::Task(e.to_string())),
            };
            items.push(BatchItem { request_id, result });
        }
        items
    }
}

/// File name a saved reply is written to.
pub fn ticket_file_name(request_id: &str) -> String {
    format!("ticket_{request_id}.txt")
}

/// Writes ticket text to `ticket_<requestId>.txt` under `dir`.
///
/// The reply is saved exactly as received.
pub fn save_tickets(dir: &Path, request_id: &str, text: &str) -> Result<PathBuf, ClientError> {
    let path = dir.join(ticket_file_name(request_id));
    std::fs::write(&path, text).map_err(|e| ClientError::Save {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
