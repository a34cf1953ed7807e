//! Error handling for the fake audio backend.
//!
//! Every failure here is deterministic and synchronous; the simulator's job
//! is fast, predictable failure, not resilience.

use thiserror::Error;

/// Result type alias for audio operations
pub type AudioResult<T> = std::result::Result<T, AudioError>;

/// Errors surfaced by the fake device catalog and streams
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Device index out of range
    #[error("Error querying device {index}")]
    DeviceNotFound { index: i64 },

    /// Host API index out of range
    #[error("Error querying host API {index}")]
    HostApiNotFound { index: usize },

    /// Invalid device or stream configuration
    #[error("Invalid audio configuration: {details}")]
    InvalidConfig { details: String },

    /// Invalid argument value
    #[error("Invalid argument: {details}")]
    InvalidArgument { details: String },

    /// Sample encoding not supported by the fake streams
    #[error("Unsupported dtype: '{dtype}'")]
    UnsupportedFormat { dtype: String },

    /// Capability accepted syntactically but without fake behavior
    #[error("Not implemented: {capability}")]
    NotImplemented { capability: String },

    /// Simulated driver failure, in the style of a PortAudio error code
    #[error("{operation} [PaErrorCode {code}]")]
    Driver { operation: String, code: i32 },
}

impl AudioError {
    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument {
            details: details.into(),
        }
    }

    /// Create a new unsupported sample encoding error
    pub fn unsupported_format(dtype: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            dtype: dtype.into(),
        }
    }

    /// Create a new not-implemented error
    pub fn not_implemented(capability: impl Into<String>) -> Self {
        Self::NotImplemented {
            capability: capability.into(),
        }
    }

    /// Create a new simulated driver error
    pub fn driver(operation: impl Into<String>, code: i32) -> Self {
        Self::Driver {
            operation: operation.into(),
            code,
        }
    }
}
