//! LTG CLI - client library for the lottery ticket generator.
//!
//! Two ways to get tickets:
//! - [`console`]: generate in-process, no daemon required
//! - [`client`]: request over TCP from a running `ltgd`
//!
//! Both produce the same formatted ticket text. The `ltg` binary in the
//! workspace root wires these into subcommands.

pub mod client;
pub mod console;
pub mod error;

pub use client::{BatchItem, DaemonReply, TicketClient};
pub use console::generate_local;
pub use error::ClientError;
