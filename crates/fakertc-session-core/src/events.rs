//! Protocol event and session record types.
//!
//! Events are serializable, `type`-discriminated payloads. The engine only
//! ever synthesizes two kinds itself (`session.created` and
//! `session.updated`); anything else flows through verbatim as
//! [`ModelEvent::Other`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object discriminator carried by every session snapshot.
pub const SESSION_OBJECT: &str = "realtime.session";

/// Model name used when the connection options do not request one.
pub const DEFAULT_MODEL: &str = "fake-realtime-001";

/// Voice used when the connection options do not request one.
pub const DEFAULT_VOICE: &str = "alloy";

/// Turn-detection policy negotiated for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnDetection {
    /// Policy discriminator, e.g. `server_vad`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Activation threshold in `[0, 1]`.
    pub threshold: f64,
    /// Audio included before detected speech, in milliseconds.
    pub prefix_padding_ms: u64,
    /// Trailing silence that ends a turn, in milliseconds.
    pub silence_duration_ms: u64,
}

impl TurnDetection {
    /// The server-side voice-activity-detection policy the fake backend
    /// negotiates during its simulated session update.
    pub fn server_vad() -> Self {
        Self {
            kind: "server_vad".to_string(),
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 500,
        }
    }
}

/// Negotiated configuration state for one simulated conversation.
///
/// Created on connect, mutated in place by at most one simulated update
/// while connected, removed from the session table on close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Generated session identifier.
    pub id: String,
    /// Always [`SESSION_OBJECT`].
    pub object: String,
    /// Model name negotiated for this session.
    pub model: String,
    /// Enabled modalities.
    pub modalities: Vec<String>,
    /// System instructions.
    pub instructions: String,
    /// Output voice name.
    pub voice: String,
    /// Input audio encoding.
    pub input_audio_format: String,
    /// Output audio encoding.
    pub output_audio_format: String,
    /// Turn-detection policy; `None` until the simulated update applies one.
    pub turn_detection: Option<TurnDetection>,
    /// Tool configuration, opaque to the engine.
    pub tools: Vec<Value>,
}

impl Session {
    /// Build the default session negotiated at connect time.
    pub fn from_config(id: String, config: &ModelConfig) -> Self {
        Self {
            id,
            object: SESSION_OBJECT.to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            modalities: vec!["audio".to_string(), "text".to_string()],
            instructions: config.instructions.clone().unwrap_or_default(),
            voice: config
                .voice
                .clone()
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            input_audio_format: "pcm16".to_string(),
            output_audio_format: "pcm16".to_string(),
            turn_detection: None,
            tools: Vec::new(),
        }
    }
}

/// Connection options accepted by [`crate::FakeRealtimeModel::connect`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Requested model name.
    pub model: Option<String>,
    /// Initial system instructions.
    pub instructions: Option<String>,
    /// Requested output voice.
    pub voice: Option<String>,
}

/// Events delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelEvent {
    /// A session was created for a fresh connection.
    #[serde(rename = "session.created")]
    SessionCreated {
        /// Generated event identifier.
        event_id: String,
        /// Snapshot of the session at creation time.
        session: Session,
    },

    /// The session configuration was renegotiated.
    #[serde(rename = "session.updated")]
    SessionUpdated {
        /// Generated event identifier.
        event_id: String,
        /// Snapshot of the session after the update.
        session: Session,
    },

    /// An arbitrary pre-built payload relayed verbatim.
    #[serde(untagged)]
    Other(Value),
}

impl ModelEvent {
    /// The event identifier, when one is present.
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::SessionCreated { event_id, .. } | Self::SessionUpdated { event_id, .. } => {
                Some(event_id)
            }
            Self::Other(value) => value.get("event_id").and_then(Value::as_str),
        }
    }

    /// The embedded session snapshot, for the synthesized event kinds.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SessionCreated { session, .. } | Self::SessionUpdated { session, .. } => {
                Some(session)
            }
            Self::Other(_) => None,
        }
    }
}

/// Outbound commands accepted by [`crate::FakeRealtimeModel::send_event`].
///
/// Only [`ClientEvent::InputAudio`] has fake behavior; the remaining kinds
/// are accepted syntactically and fail with a not-implemented error,
/// reserving room for future protocol commands.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Submit audio; `commit` finalizes everything pending.
    InputAudio {
        /// Raw audio bytes to append to the pending buffer.
        audio: Bytes,
        /// Move all pending audio into the committed buffer.
        commit: bool,
    },
    /// Interrupt in-progress output.
    Interrupt,
    /// Submit user text input.
    UserInput {
        /// The text of the user turn.
        text: String,
    },
    /// Request a session reconfiguration.
    SessionUpdate {
        /// Partial session payload, opaque to the fake.
        session: Value,
    },
}

impl ClientEvent {
    /// Stable name for the command kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputAudio { .. } => "input_audio",
            Self::Interrupt => "interrupt",
            Self::UserInput { .. } => "user_input",
            Self::SessionUpdate { .. } => "session.update",
        }
    }
}
