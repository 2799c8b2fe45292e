//! TCP server for the ticket daemon.
//!
//! The server accepts connections until its cancellation token fires and
//! spawns a worker task per connection. Workers are tracked in a
//! [`JoinSet`] and reaped as they finish, so a handler that fails or even
//! panics is logged and contained without disturbing the accept loop or
//! any other connection. Shutdown closes the listener first, then waits
//! for every in-flight worker to finish; it never cuts a client off
//! mid-response.

mod connection;

pub use connection::{respond, ConnectionHandler, MAX_REQUEST_SIZE};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ltg_core::TicketService;

/// Listen backlog for the TCP socket.
const LISTEN_BACKLOG: u32 = 128;

/// TCP server owning the listening socket and the worker set.
#[derive(Debug)]
pub struct TicketServer {
    listener: TcpListener,
    local: SocketAddr,
    service: TicketService,
    cancel_token: CancellationToken,
    connection_counter: AtomicU64,
}

impl TicketServer {
    /// Binds the listening socket.
    ///
    /// Separate from [`serve`](Self::serve) so callers can learn the
    /// bound address before serving; tests bind port 0 and read the
    /// ephemeral port back. Must be called from within the Tokio runtime
    /// because the listener registers with the runtime's reactor.
    pub fn bind(addr: SocketAddr, cancel_token: CancellationToken) -> Result<Self, BindError> {
        let bind_err = |source| BindError { addr, source };

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(bind_err)?;

        // Allows quick restarts while old connections sit in TIME_WAIT.
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;

        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        let local = listener.local_addr().map_err(bind_err)?;

        info!(addr = %local, "Ticket server listening");

        Ok(Self {
            listener,
            local,
            service: TicketService::new(),
            cancel_token,
            connection_counter: AtomicU64::new(0),
        })
    }

    /// The address the listener actually bound, with any ephemeral port
    /// resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Accepts and serves connections until the token is cancelled.
    ///
    /// Does not return while workers are in flight: cancellation stops
    /// new accepts immediately, then the remaining workers run to
    /// completion.
    pub async fn serve(self) {
        let mut workers: JoinSet<(u64, std::io::Result<()>)> = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("Server shutdown requested");
                    break;
                }

                Some(finished) = workers.join_next(), if !workers.is_empty() => {
                    reap(finished);
                    // Completions never queue up behind a busy accept loop.
                    while let Some(extra) = workers.try_join_next() {
                        reap(extra);
                    }
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            let connection_number =
                                self.connection_counter.fetch_add(1, Ordering::Relaxed);
                            let handler = ConnectionHandler::new(
                                stream,
                                peer,
                                connection_number,
                                self.service,
                            );
                            workers.spawn(async move {
                                (connection_number, handler.run().await)
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }

        // Close the listener before draining so shutdown cannot race a
        // late accept.
        drop(self.listener);

        let in_flight = workers.len();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight connections");
        }
        while let Some(finished) = workers.join_next().await {
            reap(finished);
        }

        info!(
            connections = self.connection_counter.load(Ordering::Relaxed),
            "Server shut down"
        );
    }
}

/// Logs the outcome of one finished worker.
fn reap(finished: Result<(u64, std::io::Result<()>), tokio::task::JoinError>) {
    match finished {
        Ok((connection, Ok(()))) => {
            debug!(connection, "Connection finished");
        }
        Ok((connection, Err(e))) => {
            warn!(connection, error = %e, "Connection failed");
        }
        Err(e) if e.is_panic() => {
            error!(error = %e, "Connection handler panicked");
        }
        Err(e) => {
            debug!(error = %e, "Connection task cancelled");
        }
    }
}

/// Failure to set up the listening socket.
#[derive(Debug, thiserror::Error)]
#[error("Failed to bind {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_resolves_ephemeral_port() {
        let server =
            TicketServer::bind("127.0.0.1:0".parse().unwrap(), CancellationToken::new()).unwrap();

        let addr = server.local_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let cancel = CancellationToken::new();
        let first =
            TicketServer::bind("127.0.0.1:0".parse().unwrap(), cancel.clone()).unwrap();
        let addr = first.local_addr();

        let err = TicketServer::bind(addr, cancel).unwrap_err();
        assert_eq!(err.addr, addr);
        assert!(err.to_string().contains(&addr.to_string()));
    }

    #[tokio::test]
    async fn test_serve_returns_after_cancellation() {
        let cancel = CancellationToken::new();
        let server = TicketServer::bind("127.0.0.1:0".parse().unwrap(), cancel.clone()).unwrap();

        cancel.cancel();
        // No workers in flight, so this returns promptly.
        server.serve().await;
    }
}
