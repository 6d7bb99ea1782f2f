//! Error taxonomy for registration and dispatch.
//!
//! Registration problems ([`ConfigError`]) are programming mistakes and end
//! the process at startup. Everything that can go wrong while dispatching
//! user input ([`InvocationError`]) is recoverable: it is rendered as a
//! diagnostic and turned into a failing exit code.

use serde_json::{Value, json};
use thiserror::Error;

use crate::convert::ConversionError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Boxed error returned by command bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    Internal,
    External,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Internal => "internal",
            ErrorCategory::External => "external",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registration-time contract violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate definition of command '{name}' with argument count: {arity}")]
    DuplicateCommand { name: String, arity: usize },

    #[error("Duplicate registration of type '{name}', already registered as '{existing}'")]
    DuplicateType { name: String, existing: String },

    #[error("Command '{command}' uses unregistered parameter type {type_name}")]
    UnregisteredType { command: String, type_name: String },

    #[error("Command '{command}' has no action")]
    MissingAction { command: String },
}

/// Failures of one dispatch cycle.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("No command given.")]
    NoCommand,

    #[error("Unknown command '{name}'.")]
    CommandNotFound { name: String },

    #[error("The command '{name}' does not support {supplied} parameters.")]
    ArityMismatch { name: String, supplied: usize },

    #[error("Conversion failed: {source}")]
    ConversionFailed {
        command: String,
        position: usize,
        #[source]
        source: ConversionError,
    },

    #[error("'{name}' failed: {message}")]
    OperationFailed { name: String, message: String },

    #[error("'{name}' failed unexpectedly.")]
    OperationPanicked { name: String },
}

impl InvocationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            InvocationError::CommandNotFound { .. } => ErrorCategory::NotFound,
            InvocationError::NoCommand
            | InvocationError::ArityMismatch { .. }
            | InvocationError::ConversionFailed { .. } => ErrorCategory::InvalidInput,
            InvocationError::OperationFailed { .. } => ErrorCategory::External,
            InvocationError::OperationPanicked { .. } => ErrorCategory::Internal,
        }
    }

    /// Structured detail for logs.
    pub fn context(&self) -> Value {
        match self {
            InvocationError::NoCommand => json!({}),
            InvocationError::CommandNotFound { name } => json!({ "command": name }),
            InvocationError::ArityMismatch { name, supplied } => {
                json!({ "command": name, "supplied": supplied })
            }
            InvocationError::ConversionFailed {
                command,
                position,
                source,
            } => json!({
                "command": command,
                "position": position,
                "raw": source.raw(),
                "type": source.type_name()
            }),
            InvocationError::OperationFailed { name, message } => {
                json!({ "command": name, "message": message })
            }
            InvocationError::OperationPanicked { name } => json!({ "command": name }),
        }
    }

    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

/// Typed access to a bound argument failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("argument {position} is missing, {len} bound")]
    Missing { position: usize, len: usize },

    #[error("argument {position} is {actual}, not {expected}")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        actual: String,
    },
}
