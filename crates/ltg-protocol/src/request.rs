//! Parsing and validating inbound ticket requests.
//!
//! The wire shape is a single JSON object:
//! `{"type": "max", "requestId": "A1", "count": 2}`.
//! Validation failures carry the exact reason text sent back to the client,
//! so the `Display` wording here is part of the wire contract.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Upper bound on tickets per request.
///
/// The response is written as one unframed buffer, so an unbounded count
/// would let a single request balloon the response allocation.
pub const MAX_TICKETS_PER_REQUEST: u32 = 100;

/// Raw request JSON structure as received off the wire.
///
/// All fields are optional so that missing-field validation can name the
/// exact offending field instead of surfacing a serde error. Unknown keys
/// are ignored. `count` stays a [`Value`] because clients send it as a
/// number or a numeric string interchangeably.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicketRequest {
    #[serde(rename = "type", default)]
    pub lottery_type: Option<String>,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub count: Value,
}

/// A validated ticket request.
///
/// `lottery_type` is carried as the raw wire string; resolving it against
/// the known games happens at the generation boundary so unknown types
/// surface as the generator's error, not a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRequest {
    pub lottery_type: String,
    pub request_id: String,
    pub count: u32,
}

/// Validation errors for inbound requests.
///
/// Display text is sent to clients verbatim behind the `[Error] ` marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Payload is not a JSON object we can read
    #[error("Malformed request: {reason}")]
    Malformed { reason: String },

    /// A required field is absent
    #[error("Missing field: '{field}'")]
    MissingField { field: &'static str },

    /// `requestId` is blank after trimming
    #[error("'requestId' must not be empty")]
    EmptyRequestId,

    /// `count` is neither an integer nor a string parsing as one
    #[error("'count' must be an integer")]
    CountNotInteger,

    /// `count` is zero or negative
    #[error("'count' must be at least 1")]
    CountTooSmall,

    /// `count` exceeds [`MAX_TICKETS_PER_REQUEST`]
    #[error("'count' must be at most {max}")]
    CountTooLarge { max: u32 },
}

/// Decodes and validates a raw payload into a [`TicketRequest`].
///
/// Field checks run in a fixed order (type, requestId, count) and the
/// first failure wins. `count` defaults to 1 when absent.
pub fn parse_request(raw: &[u8]) -> Result<TicketRequest, RequestError> {
    let request: RawTicketRequest =
        serde_json::from_slice(raw).map_err(|e| RequestError::Malformed {
            reason: e.to_string(),
        })?;
    request.validate()
}

impl RawTicketRequest {
    /// Applies the field validation rules, producing the validated request.
    pub fn validate(&self) -> Result<TicketRequest, RequestError> {
        let lottery_type = self
            .lottery_type
            .as_ref()
            .ok_or(RequestError::MissingField { field: "type" })?;

        let request_id = self
            .request_id
            .as_ref()
            .ok_or(RequestError::MissingField { field: "requestId" })?
            .trim();
        if request_id.is_empty() {
            return Err(RequestError::EmptyRequestId);
        }

        let count = coerce_count(&self.count)?;
        if count < 1 {
            return Err(RequestError::CountTooSmall);
        }
        if count > i64::from(MAX_TICKETS_PER_REQUEST) {
            return Err(RequestError::CountTooLarge {
                max: MAX_TICKETS_PER_REQUEST,
            });
        }

        Ok(TicketRequest {
            lottery_type: lottery_type.clone(),
            request_id: request_id.to_string(),
            count: count as u32,
        })
    }
}

/// Accepts a JSON integer or a string holding one; `Null` means the field
/// was absent and falls back to 1.
fn coerce_count(value: &Value) -> Result<i64, RequestError> {
    match value {
        Value::Null => Ok(1),
        Value::Number(n) => n.as_i64().ok_or(RequestError::CountNotInteger),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RequestError::CountNotInteger),
        _ => Err(RequestError::CountNotInteger),
    }
}
