// ResultCollector: one slot per discovered probe
//
// Results arrive in completion order and are stored by discovery index, so the
// frozen list handed to the outputs is in discovery order no matter how the
// workers interleaved. Observers are notified as each result lands; an
// observer that panics is logged and skipped for that result only.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use crate::observer::ResultObserver;
use crate::probe::ProbeInfo;
use crate::result::{DiagnosticResult, FailureKind};

use super::pool::panic_message;

/// Reason given to a probe that never reported back.
const UNREPORTED: &str = "probe did not report a result";

pub struct ResultCollector<'o> {
    expected: Vec<ProbeInfo>,
    slots: Vec<Option<DiagnosticResult>>,
    observers: Vec<&'o dyn ResultObserver>,
    received: usize,
}

impl<'o> ResultCollector<'o> {
    pub fn new(expected: Vec<ProbeInfo>, observers: Vec<&'o dyn ResultObserver>) -> Self {
        let slots = vec![None; expected.len()];
        Self {
            expected,
            slots,
            observers,
            received: 0,
        }
    }

    /// Number of results recorded so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Record the result of the probe at discovery position `index`.
    ///
    /// Out-of-range or repeated indices are logged and dropped.
    pub fn record(&mut self, index: usize, result: DiagnosticResult) {
        let Some(slot) = self.slots.get_mut(index) else {
            warn!(
                "Dropping result for unknown probe #{}: {}",
                index, result.qualified_name
            );
            return;
        };
        if slot.is_some() {
            warn!("Dropping duplicate result for {}", result.qualified_name);
            return;
        }

        for observer in &self.observers {
            let notified = panic::catch_unwind(AssertUnwindSafe(|| observer.on_result(&result)));
            if let Err(payload) = notified {
                error!(
                    "Observer panicked on {}: {}",
                    result.qualified_name,
                    panic_message(payload.as_ref())
                );
            }
        }
        *slot = Some(result);
        self.received += 1;
    }

    /// Freeze the collected results, in discovery order.
    pub fn finish(mut self) -> Vec<DiagnosticResult> {
        for index in 0..self.slots.len() {
            if self.slots[index].is_none() {
                let missing = DiagnosticResult::failed_with(
                    &self.expected[index],
                    FailureKind::Panic,
                    UNREPORTED,
                    0,
                );
                self.record(index, missing);
            }
        }
        self.slots.into_iter().flatten().collect()
    }
}
