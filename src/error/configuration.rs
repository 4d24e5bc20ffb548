// Configuration error types and constants

use crate::error::ErrorCode;
use std::fmt;
use tracing::error;

/// Configuration error code constants
///
/// Error code range: 2001-2008
pub struct ConfigurationErrorCodes;

impl ConfigurationErrorCodes {
    /// Worker count must be at least one
    pub const INVALID_WORKER_COUNT: i32 = 2001;

    /// A collection or output was registered twice under the same name
    pub const DUPLICATE_NAME: i32 = 2002;

    /// A description placeholder references an attribute the collection lacks
    pub const MISSING_ATTRIBUTE: i32 = 2003;

    /// A description template has an unbalanced brace or empty placeholder
    pub const MALFORMED_TEMPLATE: i32 = 2004;

    /// A collection exposes two probes with the same method name
    pub const DUPLICATE_PROBE: i32 = 2005;

    /// Registration or run attempted after the runner left the open state
    pub const RUNNER_CLOSED: i32 = 2006;

    /// An output pattern of a command check is not a valid regex
    pub const INVALID_PATTERN: i32 = 2007;

    /// Runner configuration file could not be read or parsed
    pub const CONFIG_FILE: i32 = 2008;
}

/// Log a configuration error with structured context
///
/// Fields: error code, the component that detected the problem and the
/// human-readable message.
pub fn log_configuration_error(err: &ConfigurationError, context: &str) {
    error!(
        "Configuration error in {}: code={}, component=Runner, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Setup mistakes detected at registration or discovery time
///
/// Every variant is fatal to the run it belongs to: no probe executes once
/// one of these has been raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Worker pool sized with zero workers
    InvalidWorkerCount { workers: usize },

    /// Name already taken by another registration of the same role
    DuplicateName { role: &'static str, name: String },

    /// Description placeholder without a matching collection attribute
    MissingAttribute { probe: String, attribute: String },

    /// Description template could not be parsed
    MalformedTemplate { probe: String, details: String },

    /// Two probes of one collection share a method name
    DuplicateProbe { collection: String, probe: String },

    /// Runner is no longer accepting registrations or runs
    RunnerClosed { runner: String, state: String },

    /// Invalid regular expression in a command check
    InvalidPattern {
        check: String,
        pattern: String,
        reason: String,
    },

    /// Runner configuration file unreadable or invalid
    ConfigFile { path: String, reason: String },
}

impl ErrorCode for ConfigurationError {
    fn code(&self) -> i32 {
        match self {
            ConfigurationError::InvalidWorkerCount { .. } => {
                ConfigurationErrorCodes::INVALID_WORKER_COUNT
            }
            ConfigurationError::DuplicateName { .. } => ConfigurationErrorCodes::DUPLICATE_NAME,
            ConfigurationError::MissingAttribute { .. } => {
                ConfigurationErrorCodes::MISSING_ATTRIBUTE
            }
            ConfigurationError::MalformedTemplate { .. } => {
                ConfigurationErrorCodes::MALFORMED_TEMPLATE
            }
            ConfigurationError::DuplicateProbe { .. } => ConfigurationErrorCodes::DUPLICATE_PROBE,
            ConfigurationError::RunnerClosed { .. } => ConfigurationErrorCodes::RUNNER_CLOSED,
            ConfigurationError::InvalidPattern { .. } => ConfigurationErrorCodes::INVALID_PATTERN,
            ConfigurationError::ConfigFile { .. } => ConfigurationErrorCodes::CONFIG_FILE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigurationError::InvalidWorkerCount { workers } => {
                format!("Worker count must be at least 1 (got {})", workers)
            }
            ConfigurationError::DuplicateName { role, name } => {
                format!("'{}' is already registered as {}", name, role)
            }
            ConfigurationError::MissingAttribute { probe, attribute } => {
                format!(
                    "Failed to render description of `{}`: no attribute named '{}'",
                    probe, attribute
                )
            }
            ConfigurationError::MalformedTemplate { probe, details } => {
                format!("Failed to render description of `{}`: {}", probe, details)
            }
            ConfigurationError::DuplicateProbe { collection, probe } => {
                format!(
                    "Collection '{}' exposes probe `{}` more than once",
                    collection, probe
                )
            }
            ConfigurationError::RunnerClosed { runner, state } => {
                format!("Runner '{}' is {} and no longer accepts changes", runner, state)
            }
            ConfigurationError::InvalidPattern {
                check,
                pattern,
                reason,
            } => {
                format!("Check '{}' has an invalid pattern '{}': {}", check, pattern, reason)
            }
            ConfigurationError::ConfigFile { path, reason } => {
                format!("Failed to load runner configuration {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigurationError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigurationError {}
