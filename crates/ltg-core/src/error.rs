//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors that can occur in domain operations.
///
/// Display text for [`DomainError::UnknownLotteryType`] is sent to clients
/// verbatim, so its wording is part of the wire contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Requested lottery type does not match any known game
    #[error("Unknown lottery type: '{value}'")]
    UnknownLotteryType { value: String },

    /// Pool definition violates its own range/pick rules
    #[error("Invalid pool '{name}': {reason}")]
    InvalidPool { name: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
