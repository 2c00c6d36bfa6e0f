use std::time::Duration;
use thiserror::Error;

/// Message surfaced when input injection is not allowed for this process.
pub const PERMISSION_DENIED_MESSAGE: &str = "Accessibility permission is required to send keyboard input. \
Grant access in System Settings > Privacy & Security > Accessibility, then run again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Application name is empty")]
    EmptyApplicationName,

    #[error("Invalid delay value: '{0}'")]
    InvalidDelay(String),

    #[error("Text to type is empty")]
    EmptyText,

    #[error("Text input step has no description to type")]
    EmptyDescription,

    #[error("No key found in instruction: '{0}'")]
    MissingKey(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("Application '{0}' is not running")]
    ApplicationNotFound(String),

    #[error("Failed to activate '{name}': {reason}")]
    ActivationFailed { name: String, reason: String },

    #[error("Timed out after {}ms waiting for '{name}' to become frontmost", .timeout.as_millis())]
    ActivationTimeout { name: String, timeout: Duration },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{}", PERMISSION_DENIED_MESSAGE)]
    PermissionDenied,

    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error("Input event error: {0}")]
    Input(String),

    #[error("Scripting error: {0}")]
    Scripting(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
