//! LTG Daemon - Lottery ticket generation server
//!
//! This crate provides the daemon-side infrastructure:
//! - `config` - daemon configuration (defaults, TOML file, overrides)
//! - `pidfile` - exclusively-locked PID file guaranteeing a single instance
//! - `privileges` - resolution and dropping of the serving user/group
//! - `server` - TCP accept loop and per-connection request workers
//! - `control` - liveness probing and stop signaling for the CLI
//! - `monitor` - periodic resource usage sampling
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ltgd daemon                         │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  PidFile (exclusive lock, RAII release)                  │
//! │  TargetIdentity::drop_privileges (before serving)        │
//! │                                                          │
//! │  ┌──────────────┐  accept   ┌───────────────────────┐    │
//! │  │ TicketServer │──────────▶│   ConnectionHandler   │    │
//! │  │ (TCP listen) │  JoinSet  │ (one task per client) │    │
//! │  └──────┬───────┘           └──────────┬────────────┘    │
//! │         │ join_next / try_join_next    │ respond()       │
//! │         ▼                              ▼                 │
//! │   worker reaping              ltg-protocol + ltg-core    │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Per-connection faults are logged and never reach the accept loop

pub mod config;
pub mod control;
pub mod monitor;
pub mod pidfile;
pub mod privileges;
pub mod server;

pub use config::DaemonConfig;
pub use pidfile::PidFile;
pub use privileges::TargetIdentity;
pub use server::TicketServer;
