//! LTG Core - Shared domain types for lottery ticket generation
//!
//! This crate provides the lottery domain shared between the daemon (ltgd)
//! and the client/console CLI (ltg): game definitions, number pools, drawn
//! tickets, and the generation service.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`
//! outside of tests.

pub mod error;
pub mod game;
pub mod pool;
pub mod service;
pub mod ticket;

// Re-exports for convenience
pub use error::{DomainError, DomainResult};
pub use game::LotteryType;
pub use pool::{Draw, Pool};
pub use service::TicketService;
pub use ticket::Ticket;
