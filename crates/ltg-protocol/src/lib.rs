//! LTG Protocol - Wire protocol for daemon communication
//!
//! This crate provides request parsing/validation and response formatting
//! for the text protocol between ticket clients and the daemon. Requests
//! are a single JSON object; responses are plain formatted text with no
//! framing, so both sides write exactly one payload per connection.

pub mod request;
pub mod response;

pub use request::{
    parse_request, RawTicketRequest, RequestError, TicketRequest, MAX_TICKETS_PER_REQUEST,
};
pub use response::{error_payload, TicketResponse, ERROR_PREFIX};
