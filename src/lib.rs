// Diagnostics toolkit
// Concurrent runner for named diagnostic probes with pluggable outputs

// Module declarations
pub mod config;
pub mod error;
pub mod observer;
pub mod output;
pub mod probe;
pub mod result;
pub mod runner;
pub mod tools;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::RunnerConfig;
pub use error::{ConfigurationError, ErrorCode, OutputError};
pub use observer::{LogObserver, ResultFeed, ResultObserver};
pub use output::{ConsoleTable, JsonOutput, OutputSink};
pub use probe::{ensure, Attributes, ProbeFailure, ProbeMethod, ProbeOutcome, TestCollection};
pub use result::{DiagnosticResult, FailureKind, RunReport};
pub use runner::{Runner, RunnerState};

use tracing::Level;

/// Install a stderr fmt subscriber at `level`.
///
/// Records emitted through the `log` facade are forwarded too. Only the first
/// call installs anything; later calls are no-ops.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(Level::DEBUG);
        init_logging(Level::INFO);
    }
}
