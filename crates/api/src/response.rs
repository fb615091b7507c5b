//! Shared response envelope types for API handlers.
//!
//! All JSON endpoints answer with a `{ "success": bool, "data": ... }`
//! envelope, the shape the admin UI's request layer was written against.
//! Use [`Envelope::ok`] instead of ad-hoc `serde_json::json!` to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "success": bool, "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// A `success: true` envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl Envelope<MessagePayload> {
    /// A `success: false` envelope carrying an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: MessagePayload {
                message: message.into(),
            },
        }
    }
}

/// Payload of the fragment-returning comment endpoints.
#[derive(Debug, Serialize)]
pub struct CommentsPayload {
    /// The re-rendered annotation list fragment for the target item.
    pub comments: String,
}

/// Payload of `success: false` envelopes.
#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: String,
}

/// Payload acknowledging an accepted lifecycle event.
#[derive(Debug, Serialize)]
pub struct EventPayload {
    /// Dot-separated event name, e.g. `content.saved`.
    pub event: &'static str,
}
