//! Formatting outbound responses.
//!
//! Success payload:
//!
//! ```text
//! Generation Request ID: A1
//! Ticket Type: Max
//!
//! Lotto Max Numbers: 3 9 17 22 31 40 48
//!
//! Lotto Max Numbers: 1 5 12 19 28 33 45
//! ```
//!
//! Error payload: the literal `[Error] ` marker followed by the reason.

use ltg_core::{LotteryType, Ticket};
use std::fmt;

/// Literal marker every error payload starts with.
pub const ERROR_PREFIX: &str = "[Error]";

/// A successful generation result ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketResponse {
    request_id: String,
    lottery: LotteryType,
    tickets: Vec<Ticket>,
}

impl TicketResponse {
    pub fn new(request_id: impl Into<String>, lottery: LotteryType, tickets: Vec<Ticket>) -> Self {
        Self {
            request_id: request_id.into(),
            lottery,
            tickets,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn lottery(&self) -> LotteryType {
        self.lottery
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }
}

impl fmt::Display for TicketResponse {
    /// Two-line header, then one blank-line-separated block per ticket.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generation Request ID: {}\nTicket Type: {}",
            self.request_id,
            self.lottery.label()
        )?;
        for ticket in &self.tickets {
            write!(f, "\n\n{ticket}")?;
        }
        Ok(())
    }
}

/// Builds the single-line error payload for a failure reason.
pub fn error_payload(reason: &str) -> String {
    format!("{ERROR_PREFIX} {reason}")
}
