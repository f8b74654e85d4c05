//! Shared types between the chat widget and the chat backend
//!
//! These types are used by both:
//! - the Dioxus widget (WASM)
//! - any server speaking the `/ws/{client_id}` chat protocol
//!
//! Serializable with serde for JSON over WebSocket

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Identity
// ============================================================================

/// Durable per-browser identifier used as the WebSocket path segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "../../chat-widget/bindings/generated.ts")]
pub struct ClientId(pub String);

impl ClientId {
    /// Random v4 UUID in its hyphenated form.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap a stored value. Only an empty value is treated as absent.
    pub fn from_stored(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Wire Protocol
// ============================================================================

/// Client → Server: text typed by the visitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../chat-widget/bindings/generated.ts")]
pub struct OutgoingMessage {
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Server → Client: raw frame as it arrives on the socket
///
/// Both fields are optional on the wire; anything else the server sends
/// (e.g. `sender`) is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "../../chat-widget/bindings/generated.ts")]
pub struct IncomingFrame {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// What the widget does with a decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Automated responder text
    Message(String),
    /// Text relayed from a human operator
    AdminMessage(String),
    /// Any other frame type, or a renderable type without content
    Ignored(Option<String>),
}

impl IncomingFrame {
    pub fn into_event(self) -> ServerEvent {
        match (self.kind, self.content) {
            (Some(kind), Some(content)) if kind == FRAME_TYPE_MESSAGE => {
                ServerEvent::Message(content)
            }
            (Some(kind), Some(content)) if kind == FRAME_TYPE_ADMIN_MESSAGE => {
                ServerEvent::AdminMessage(content)
            }
            (kind, _) => ServerEvent::Ignored(kind),
        }
    }
}

impl ServerEvent {
    /// Text to render as an agent entry, if any.
    pub fn agent_text(&self) -> Option<&str> {
        match self {
            ServerEvent::Message(text) | ServerEvent::AdminMessage(text) => Some(text),
            ServerEvent::Ignored(_) => None,
        }
    }
}

// ============================================================================
// UI State
// ============================================================================

/// Chat entry for UI display. Entries are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../chat-widget/bindings/generated.ts")]
pub struct ChatEntry {
    pub seq: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../chat-widget/bindings/generated.ts")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    /// CSS class attached to the rendered entry.
    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Local storage key holding the client identifier
pub const CLIENT_ID_STORAGE_KEY: &str = "chat_client_id";

/// Frame types rendered as agent entries
pub const FRAME_TYPE_MESSAGE: &str = "message";
pub const FRAME_TYPE_ADMIN_MESSAGE: &str = "admin_message";

// ============================================================================
// Tests
// ============================================================================
