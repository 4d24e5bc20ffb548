// WorkerPool: bounded concurrent probe execution
//
// Probes run on a scoped rayon pool sized to the worker count. Each result is
// sent back over an mpsc channel to the calling thread, which records it as
// it arrives. A probe that panics is isolated by `catch_unwind` and turned
// into a failed result; it never takes its worker or siblings down. When the
// pool cannot be built the probes run sequentially on the caller.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::probe::Probe;
use crate::result::{DiagnosticResult, FailureKind};

use super::collector::ResultCollector;

/// Fixed-size pool of probe workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: NonZeroUsize,
}

impl WorkerPool {
    /// Create a pool with `workers` threads; zero is rejected.
    pub fn new(workers: usize) -> Result<Self, ConfigurationError> {
        NonZeroUsize::new(workers)
            .map(|workers| Self { workers })
            .ok_or(ConfigurationError::InvalidWorkerCount { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Run every probe exactly once, feeding each result to `collector`.
    ///
    /// Returns once all probes have completed. No more than
    /// `min(workers, probes.len())` probes execute at the same time.
    pub fn execute(&self, probes: &[Probe<'_>], collector: &mut ResultCollector<'_>) {
        let threads = self.workers.get().min(probes.len());
        if threads == 0 {
            return;
        }

        let pooled = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("probe-worker-{index}"))
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                debug!("Started {} probe workers for {} probes.", threads, probes.len());
                let (tx, rx) = mpsc::channel::<(usize, DiagnosticResult)>();
                pool.in_place_scope(|scope| {
                    scope.spawn(move |_| {
                        probes
                            .par_iter()
                            .enumerate()
                            .for_each_with(tx, |tx, (index, probe)| {
                                // The receiver outlives every sender.
                                let _ = tx.send((index, run_probe(probe)));
                            });
                    });
                    for (index, result) in rx {
                        collector.record(index, result);
                    }
                });
            });

        if let Err(err) = pooled {
            warn!("Failed to create probe worker pool ({}), running sequentially.", err);
            for (index, probe) in probes.iter().enumerate() {
                collector.record(index, run_probe(probe));
            }
        }
    }
}

/// Invoke one probe and convert its outcome into a result.
pub(crate) fn run_probe(probe: &Probe<'_>) -> DiagnosticResult {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| probe.invoke()));
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(())) => DiagnosticResult::passed(probe.info(), elapsed_ms),
        Ok(Err(failure)) => DiagnosticResult::failed(probe.info(), &failure, elapsed_ms),
        Err(payload) => DiagnosticResult::failed_with(
            probe.info(),
            FailureKind::Panic,
            format!("probe panicked: {}", panic_message(payload.as_ref())),
            elapsed_ms,
        ),
    }
}

/// Render a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
