// Output sink error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Output error code constants
///
/// Error code range: 3001-3004
pub struct OutputErrorCodes;

impl OutputErrorCodes {
    /// Writing the rendering failed
    pub const IO: i32 = 3001;

    /// Results could not be serialized
    pub const SERIALIZE: i32 = 3002;

    /// Sink-specific rendering failure
    pub const RENDER: i32 = 3003;

    /// Sink panicked while rendering
    pub const PANICKED: i32 = 3004;
}

/// Errors raised by an output sink while rendering a result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// Underlying writer failed
    Io { details: String },

    /// Serialization of the result list failed
    Serialize { details: String },

    /// Any other sink-defined rendering problem
    Render { reason: String },

    /// Sink panicked; the payload is rendered as text
    Panicked { details: String },
}

impl ErrorCode for OutputError {
    fn code(&self) -> i32 {
        match self {
            OutputError::Io { .. } => OutputErrorCodes::IO,
            OutputError::Serialize { .. } => OutputErrorCodes::SERIALIZE,
            OutputError::Render { .. } => OutputErrorCodes::RENDER,
            OutputError::Panicked { .. } => OutputErrorCodes::PANICKED,
        }
    }

    fn message(&self) -> String {
        match self {
            OutputError::Io { details } => format!("Failed to write output: {}", details),
            OutputError::Serialize { details } => {
                format!("Failed to serialize results: {}", details)
            }
            OutputError::Render { reason } => format!("Failed to render results: {}", reason),
            OutputError::Panicked { details } => format!("Output panicked: {}", details),
        }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for OutputError {}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        OutputError::Serialize {
            details: err.to_string(),
        }
    }
}
