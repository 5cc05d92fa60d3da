//! Error types for the scripting crate

use scriptapi_core::{EngineErrorCode, ScriptApiError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Script-visible error kind, as stored in an instance's last error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScriptErrorType {
    /// No error set
    #[default]
    None,

    /// Command attempted while suspension is not allowed, or no instance is active
    PreconditionFailed,

    /// Referenced entity does not exist or is not visible to the current company
    InvalidEntity,

    /// The engine rejected the command
    CommandFailed(EngineErrorCode),

    /// Costs accumulator saturated
    Overflow,
}

impl ScriptErrorType {
    pub fn is_error(&self) -> bool {
        *self != Self::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "ERR_NONE",
            Self::PreconditionFailed => "ERR_PRECONDITION_FAILED",
            Self::InvalidEntity => "ERR_INVALID_ENTITY",
            Self::CommandFailed(_) => "ERR_COMMAND_FAILED",
            Self::Overflow => "ERR_OVERFLOW",
        }
    }
}

impl fmt::Display for ScriptErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFailed(code) => write!(f, "{} ({})", self.as_str(), code),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Script-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// API called outside of any scoped activation
    #[error("No script instance is active")]
    NoActiveInstance,

    /// The active (or addressed) instance has been destroyed
    #[error("Script instance has been destroyed")]
    InstanceDestroyed,

    /// Callback scratch slot outside the configured range
    #[error("Callback variable index {index} out of range (limit {limit})")]
    CallbackIndexOutOfRange { index: usize, limit: usize },
}

impl ScriptError {
    /// The script-visible error kind this failure reports as
    pub fn error_type(&self) -> ScriptErrorType {
        match self {
            ScriptError::NoActiveInstance
            | ScriptError::InstanceDestroyed
            | ScriptError::CallbackIndexOutOfRange { .. } => ScriptErrorType::PreconditionFailed,
        }
    }
}

impl From<ScriptError> for ScriptApiError {
    fn from(err: ScriptError) -> Self {
        ScriptApiError::Script(err.to_string())
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_mapping() {
        assert_eq!(
            ScriptError::NoActiveInstance.error_type(),
            ScriptErrorType::PreconditionFailed
        );
        assert_eq!(
            ScriptError::CallbackIndexOutOfRange { index: 9, limit: 8 }.error_type(),
            ScriptErrorType::PreconditionFailed
        );
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ScriptErrorType::default().to_string(), "ERR_NONE");
        assert_eq!(
            ScriptErrorType::CommandFailed(EngineErrorCode::new(0x0F)).to_string(),
            "ERR_COMMAND_FAILED (0x000F)"
        );
        assert!(!ScriptErrorType::None.is_error());
        assert!(ScriptErrorType::Overflow.is_error());
    }
}
