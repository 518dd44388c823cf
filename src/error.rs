//! Error types and handling for MultiResize

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MultiResize operations
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Main error type for MultiResize operations
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Construction-time and configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A resize spec failed validation
    #[error("Invalid resize spec: {message}")]
    InvalidSpec { message: String },

    /// A resize spec reuses a suffix already registered
    #[error("The suffix '{suffix}' is used by more than one resize spec")]
    DuplicateSuffix { suffix: String },

    /// Source file unreadable or corrupt
    #[error("Failed to decode {file:?}: {message}")]
    DecodeFailure { file: PathBuf, message: String },

    /// Resample, encode or write failure for one variant
    #[error("Failed to produce variant '{suffix}' of {file:?}: {message}")]
    EncodeFailure {
        file: PathBuf,
        suffix: String,
        message: String,
    },

    /// Engine lifecycle misuse
    #[error("Cannot {operation} while the engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ResizeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid spec error
    pub fn invalid_spec<S: Into<String>>(message: S) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    /// Create a new duplicate suffix error
    pub fn duplicate_suffix<S: Into<String>>(suffix: S) -> Self {
        Self::DuplicateSuffix {
            suffix: suffix.into(),
        }
    }

    /// Create a new decode failure
    pub fn decode<S: Into<String>>(file: PathBuf, message: S) -> Self {
        Self::DecodeFailure {
            file,
            message: message.into(),
        }
    }

    /// Create a new encode failure
    pub fn encode<S: Into<String>, M: Into<String>>(file: PathBuf, suffix: S, message: M) -> Self {
        Self::EncodeFailure {
            file,
            suffix: suffix.into(),
            message: message.into(),
        }
    }

    /// Create a new lifecycle error
    pub fn invalid_state<S: ToString>(operation: &'static str, state: S) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateSuffix { suffix } => {
                format!("Suffix '{}' is already registered. Every variant needs its own suffix.", suffix)
            }
            Self::DecodeFailure { file, message } => {
                format!("Skipped {}: {}", file.display(), message)
            }
            Self::EncodeFailure { file, suffix, message } => {
                format!("Variant {} of {} not written: {}", suffix, file.display(), message)
            }
            other => other.to_string(),
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for ResizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ResizeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
