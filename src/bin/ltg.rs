//! LTG CLI - lottery ticket generation client
//!
//! This binary generates tickets locally or requests them from a running
//! ltgd daemon over TCP.
//!
//! # Usage
//!
//! ```text
//! ltg generate -t max --id A123            # Local generation, no daemon
//! ltg request -t grand --id B42 -n 3      # One daemon request, 3 tickets
//! ltg request -t max --id C7 --amount 4   # Four parallel daemon requests
//! ltg request -t max --id D1 --save       # Write each reply to a file
//! ```

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::Path;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ltg_cli::client::save_tickets;
use ltg_cli::{generate_local, ClientError, DaemonReply, TicketClient};
use ltg_core::LotteryType;
use ltg_protocol::MAX_TICKETS_PER_REQUEST;

// ============================================================================
// CLI Arguments
// ============================================================================

/// LTG CLI - lottery ticket generation client
#[derive(Parser, Debug)]
#[command(name = "ltg")]
#[command(about = "Generate lottery tickets locally or through the daemon")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate tickets locally without contacting the daemon
    Generate {
        #[command(flatten)]
        ticket: TicketArgs,
    },
    /// Request tickets from a running daemon over TCP
    Request {
        #[command(flatten)]
        ticket: TicketArgs,

        /// Daemon address
        #[arg(long, default_value_t = IpAddr::V6(Ipv6Addr::LOCALHOST))]
        ip: IpAddr,

        /// Daemon port
        #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u16).range(1024..))]
        port: u16,

        /// Number of parallel requests to send
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_TICKETS_PER_REQUEST as i64))]
        amount: u32,

        /// Save each reply to ticket_<id>.txt in the current directory
        #[arg(long)]
        save: bool,
    },
}

/// Options shared by local generation and daemon requests.
#[derive(clap::Args, Debug)]
struct TicketArgs {
    /// Lottery type: max, grand or lottario
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    lottery: LotteryType,

    /// Request identifier echoed back in the reply
    #[arg(long)]
    id: String,

    /// Tickets per request
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_TICKETS_PER_REQUEST as i64))]
    count: u32,
}

// ============================================================================
// Request Mode
// ============================================================================

async fn run_request(ticket: TicketArgs, addr: SocketAddr, amount: u32, save: bool) -> Result<()> {
    let client = TicketClient::new(addr);
    debug!(%addr, lottery = ticket.lottery.label(), amount, "Sending ticket requests");

    let items = client
        .request_batch(ticket.lottery, &ticket.id, ticket.count, amount)
        .await;

    let mut printed = false;
    let mut failures = 0usize;
    let mut connect_failed = false;

    for item in &items {
        match &item.result {
            Ok(DaemonReply::Tickets(text)) => {
                if save {
                    let path = save_tickets(Path::new("."), &item.request_id, text)?;
                    println!("Saved {}", path.display());
                } else {
                    if printed {
                        println!();
                    }
                    println!("{text}");
                    printed = true;
                }
            }
            Ok(DaemonReply::Rejected(reason)) => {
                eprintln!("Request '{}' rejected: {reason}", item.request_id);
                failures += 1;
            }
            Err(e) => {
                eprintln!("Request '{}' failed: {e}", item.request_id);
                if matches!(e, ClientError::Connect { .. }) {
                    connect_failed = true;
                }
                failures += 1;
            }
        }
    }

    if connect_failed {
        eprintln!("Is the daemon running? Start it with 'ltgd start'.");
    }

    if failures > 0 {
        bail!("{failures} of {} requests failed", items.len());
    }

    Ok(())
}

// ============================================================================
// Logging Setup
// ============================================================================

fn init_logging() {
    // Ticket text goes to stdout; keep tracing quiet unless RUST_LOG asks.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    match args.command {
        Command::Generate { ticket } => {
            let output = generate_local(ticket.lottery, &ticket.id, ticket.count);
            println!("{output}");
            Ok(())
        }
        Command::Request {
            ticket,
            ip,
            port,
            amount,
            save,
        } => run_request(ticket, SocketAddr::new(ip, port), amount, save).await,
    }
}
