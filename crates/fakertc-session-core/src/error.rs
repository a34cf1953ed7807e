//! Error handling for the fake realtime model engine.

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors surfaced by [`crate::FakeRealtimeModel`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The engine is already connected
    #[error("Already connected")]
    AlreadyConnected,

    /// The operation requires a connected engine
    #[error("Not connected")]
    NotConnected,

    /// The command is accepted syntactically but has no fake behavior
    #[error("Not implemented: {capability}")]
    NotImplemented { capability: String },
}

impl ModelError {
    /// Create a new not-implemented error
    pub fn not_implemented(capability: impl Into<String>) -> Self {
        Self::NotImplemented {
            capability: capability.into(),
        }
    }
}
