// Output dispatch: hand the frozen result list to every sink, in order
//
// Each sink is isolated: an error or a panic is logged and recorded, and the
// next sink still receives the results.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::error::{ErrorCode, OutputError};
use crate::output::OutputSink;
use crate::result::{DiagnosticResult, SinkFailure};

use super::pool::panic_message;

pub(crate) fn dispatch(
    outputs: &mut [(String, &mut dyn OutputSink)],
    results: &[DiagnosticResult],
) -> Vec<SinkFailure> {
    let mut failures = Vec::new();

    for (name, sink) in outputs.iter_mut() {
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| sink.render(results)));
        let error = match rendered {
            Ok(Ok(())) => {
                debug!("Dispatched {} results to output '{}'.", results.len(), name);
                continue;
            }
            Ok(Err(err)) => err,
            Err(payload) => OutputError::Panicked {
                details: panic_message(payload.as_ref()),
            },
        };

        error!(
            "Output '{}' failed: code={}, message={}",
            name,
            error.code(),
            error.message()
        );
        failures.push(SinkFailure {
            output: name.clone(),
            error,
        });
    }

    failures
}
