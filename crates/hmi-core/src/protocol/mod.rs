//! Wire protocol: outgoing JSON event messages and incoming backend messages.

pub mod messages;

use thiserror::Error;

pub use messages::{
    decode_backend_message, encode_event, to_wire, BackendMessage, KeyEventBody, TextInputBody,
    TouchBody, WireMessage, WireSchema,
};

/// Errors produced while turning events into wire text or back.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// JSON encoding failed.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// An incoming frame was not valid JSON or had the wrong shape.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// The event cannot be represented in the link's schema.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
