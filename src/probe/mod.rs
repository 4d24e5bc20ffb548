//! Probe contract, collections and discovery.
//!
//! A probe is a zero-argument check bound to the collection that declares it.
//! It returns `Ok(())` when the check passes and a [`ProbeFailure`] otherwise.
//! Collections expose their probes explicitly through [`TestCollection`];
//! discovery turns them into runnable [`Probe`]s with fully rendered
//! descriptions.

use std::fmt;

use crate::result::FailureKind;

pub mod collection;
pub mod discovery;
pub mod template;

pub use collection::{Attributes, ProbeMethod, TestCollection};
pub use discovery::{discover, Discover, Probe, ProbeInfo, PROBE_PREFIX};
pub use template::render_description;

/// Reason recorded when a failure carries no message.
pub const NO_REASON: &str = "n/a";

/// What a probe returns.
pub type ProbeOutcome = Result<(), ProbeFailure>;

/// Failure signal raised by a probe.
///
/// `Assertion` is the deliberate "this check failed" signal. `Unexpected`
/// covers every other error a probe runs into; any [`std::error::Error`]
/// converts into it, so probes can use `?` freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Assertion { reason: Option<String> },
    Unexpected { message: String },
}

impl ProbeFailure {
    /// Assertion failure with a human-readable reason.
    pub fn assertion(reason: impl Into<String>) -> Self {
        ProbeFailure::Assertion {
            reason: Some(reason.into()),
        }
    }

    /// Assertion failure without a reason.
    pub fn bare() -> Self {
        ProbeFailure::Assertion { reason: None }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ProbeFailure::Assertion { .. } => FailureKind::Assertion,
            ProbeFailure::Unexpected { .. } => FailureKind::Error,
        }
    }

    /// Reason text as it appears in a result.
    pub fn reason(&self) -> String {
        match self {
            ProbeFailure::Assertion { reason: Some(reason) } => reason.clone(),
            ProbeFailure::Assertion { reason: None } => NO_REASON.to_string(),
            ProbeFailure::Unexpected { message } => format!("unexpected error: {}", message),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

impl<E> From<E> for ProbeFailure
where
    E: std::error::Error,
{
    fn from(err: E) -> Self {
        ProbeFailure::Unexpected {
            message: err.to_string(),
        }
    }
}

/// Fail with `reason` unless `condition` holds.
pub fn ensure(condition: bool, reason: impl Into<String>) -> ProbeOutcome {
    if condition {
        Ok(())
    } else {
        Err(ProbeFailure::assertion(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_port(raw: &str) -> ProbeOutcome {
        let port: u16 = raw.parse()?;
        ensure(port != 0, "port must not be zero")
    }

    #[test]
    fn ensure_passes_and_fails() {
        assert_eq!(ensure(true, "unused"), Ok(()));
        assert_eq!(
            ensure(false, "timeout"),
            Err(ProbeFailure::Assertion {
                reason: Some("timeout".to_string())
            })
        );
    }

    #[test]
    fn bare_assertion_reports_sentinel_reason() {
        let failure = ProbeFailure::bare();
        assert_eq!(failure.reason(), NO_REASON);
        assert_eq!(failure.kind(), FailureKind::Assertion);
    }

    #[test]
    fn question_mark_converts_foreign_errors() {
        let failure = parse_port("not-a-port").unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Error);
        assert!(failure.reason().starts_with("unexpected error: "));

        assert_eq!(
            parse_port("0").unwrap_err().reason(),
            "port must not be zero"
        );
        assert!(parse_port("8080").is_ok());
    }
}
