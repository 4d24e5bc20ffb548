// Error types for the diagnostics toolkit
//
// Configuration errors are fatal setup mistakes surfaced before any probe runs.
// Output errors are reported per sink at dispatch time and never abort a run.
// Probe failures are not errors at all: they become failed results (see `probe`).

mod configuration;
mod output;

pub use configuration::{log_configuration_error, ConfigurationError, ConfigurationErrorCodes};
pub use output::{OutputError, OutputErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from the toolkit's error types, so the CLI and log lines can report
/// them consistently.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
