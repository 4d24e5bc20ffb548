//! Result model: one record per executed probe plus the report of a run.

use serde::{Deserialize, Serialize};

use crate::error::OutputError;
use crate::probe::{ProbeFailure, ProbeInfo, NO_REASON};

/// Why a probe failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The probe signalled a failed check.
    Assertion,
    /// The probe returned an unexpected error.
    Error,
    /// The probe panicked.
    Panic,
}

/// Outcome of running one probe. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticResult {
    pub qualified_name: String,
    pub description: String,
    pub collection: String,
    pub passed: bool,
    /// `"n/a"` when the probe passed or failed without a reason.
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub duration_ms: u64,
}

impl DiagnosticResult {
    pub fn passed(info: &ProbeInfo, duration_ms: u64) -> Self {
        Self {
            qualified_name: info.qualified_name.clone(),
            description: info.description.clone(),
            collection: info.collection.clone(),
            passed: true,
            reason: NO_REASON.to_string(),
            failure: None,
            duration_ms,
        }
    }

    pub fn failed(info: &ProbeInfo, failure: &ProbeFailure, duration_ms: u64) -> Self {
        Self::failed_with(info, failure.kind(), failure.reason(), duration_ms)
    }

    pub fn failed_with(
        info: &ProbeInfo,
        kind: FailureKind,
        reason: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            qualified_name: info.qualified_name.clone(),
            description: info.description.clone(),
            collection: info.collection.clone(),
            passed: false,
            reason: reason.into(),
            failure: Some(kind),
            duration_ms,
        }
    }
}

/// A sink that failed while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub output: String,
    pub error: OutputError,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    /// Results in discovery order.
    pub results: Vec<DiagnosticResult>,
    pub sink_failures: Vec<SinkFailure>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}
