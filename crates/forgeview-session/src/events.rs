//! Push-channel events.
//!
//! The push channel is a long-lived, server-to-client ordered event source.
//! Whatever carries it (an event source, a socket), the boundary decodes each
//! raw event into a [`ChannelEvent`] exactly once and feeds the result into a
//! `tokio::sync::mpsc` channel that a single session task consumes — there is
//! no callback registry and no second consumer.

use thiserror::Error;

use forgeview_types::{ChannelError, SnippetBatch};

/// One decoded event from the push channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    /// A batch of zero or more snippet updates, applied in batch order.
    Message(SnippetBatch),
    /// A server-reported failure. Non-fatal unless followed by `Close`.
    Error(ChannelError),
    /// The channel is done; no further events follow for this session.
    Close,
}

/// Failure to decode a raw push-channel event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown event kind `{0}`")]
    UnknownKind(String),
    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ChannelEvent {
    /// Decode a raw `(kind, data)` event as delivered by the transport.
    ///
    /// `close` carries no payload; its data is ignored.
    pub fn decode(kind: &str, data: &str) -> Result<Self, DecodeError> {
        match kind {
            "message" => Ok(ChannelEvent::Message(serde_json::from_str(data)?)),
            "error" => Ok(ChannelEvent::Error(serde_json::from_str(data)?)),
            "close" => Ok(ChannelEvent::Close),
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}
