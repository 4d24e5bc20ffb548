//! Per-result observers.
//!
//! The collector notifies every observer as each result arrives, before the
//! run finishes. [`LogObserver`] writes the operator-facing OK/FAILED lines;
//! [`ResultFeed`] fans results out to live subscribers over a broadcast
//! channel.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use crate::result::DiagnosticResult;

/// Notified once per completed probe, on the collecting thread.
pub trait ResultObserver: Send + Sync {
    fn on_result(&self, result: &DiagnosticResult);
}

/// Logs `<name> - OK` / `<name> - FAILED: <reason>` at INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ResultObserver for LogObserver {
    fn on_result(&self, result: &DiagnosticResult) {
        if result.passed {
            info!("{} - OK", result.qualified_name);
        } else {
            info!("{} - FAILED: {}", result.qualified_name, result.reason);
        }
    }
}

/// Running counters published by a [`ResultFeed`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FeedSnapshot {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
}

/// Broadcast fan-out of results as they complete.
///
/// Subscribers that fall behind by more than the channel capacity lose the
/// oldest results (`RecvError::Lagged`); the counters are never lossy.
pub struct ResultFeed {
    tx: broadcast::Sender<DiagnosticResult>,
    total: AtomicU64,
    passed: AtomicU64,
}

impl ResultFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            total: AtomicU64::new(0),
            passed: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticResult> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let passed = self.passed.load(Ordering::Relaxed);
        FeedSnapshot {
            total,
            passed,
            failed: total.saturating_sub(passed),
        }
    }
}

impl Default for ResultFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ResultObserver for ResultFeed {
    fn on_result(&self, result: &DiagnosticResult) {
        if result.passed {
            self.passed.fetch_add(1, Ordering::Relaxed);
        }
        self.total.fetch_add(1, Ordering::Relaxed);
        // No subscribers is fine.
        let _ = self.tx.send(result.clone());
    }
}
