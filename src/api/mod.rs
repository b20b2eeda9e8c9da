//! Wire types for the relay contract.
//!
//! One endpoint, `POST /api/chat`. The request carries the full conversation
//! history, a mode, and a model id; the response is a single assistant
//! message. Failures are `{ "error": ... }` bodies with a matching HTTP
//! status. Both halves of the crate speak these shapes: the server
//! deserializes them, the chat client serializes them.

use serde::{Deserialize, Serialize};

use crate::core::catalog::DEFAULT_MODEL;
use crate::core::message::{MessageKind, Role};

pub mod client;

/// What the relay should do with the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    Chat,
    Image,
}

impl RelayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayMode::Chat => "chat",
            RelayMode::Image => "image",
        }
    }

    /// Strict parse; anything but the two wire strings is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chat" => Some(RelayMode::Chat),
            "image" => Some(RelayMode::Image),
            _ => None,
        }
    }
}

/// A role/content pair as it travels to the relay and on to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// The payload the chat client sends. `model` falls back to the relay-side
/// default when omitted; unknown ids are passed through to the provider
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<WireMessage>,
    pub mode: RelayMode,
    #[serde(default = "default_model")]
    pub model: String,
}

/// The single assistant message a successful relay call produces. `type` is
/// present only for generated images, whose `content` is the image locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayResponse {
    pub content: String,
    pub role: Role,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
}

/// Error body shape shared by every failure status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
