//! Output sinks.
//!
//! A sink receives the complete, discovery-ordered result list of a run once,
//! after every probe has finished, and renders it however it likes.

use crate::error::OutputError;
use crate::result::DiagnosticResult;

pub mod console_table;
pub mod json;

pub use console_table::{render_table, ConsoleTable, DEFAULT_TITLE};
pub use json::JsonOutput;

/// Consumer of a run's full result list.
pub trait OutputSink {
    fn render(&mut self, results: &[DiagnosticResult]) -> Result<(), OutputError>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn render(&mut self, results: &[DiagnosticResult]) -> Result<(), OutputError> {
        (**self).render(results)
    }
}
