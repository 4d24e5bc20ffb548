// ConsoleTable: ASCII table of results for terminals

use std::io::{self, Stdout, Write};

use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;

use crate::error::OutputError;
use crate::result::DiagnosticResult;

use super::OutputSink;

pub const DEFAULT_TITLE: &str = "Diagnostic results.";

const HEADERS: [&str; 4] = ["Name", "Description", "Result", "Reason"];

/// Renders results as a boxed ASCII table with a rule between rows.
pub struct ConsoleTable<W: Write = Stdout> {
    title: String,
    writer: W,
}

impl ConsoleTable<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ConsoleTable<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleTable<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            writer,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for ConsoleTable<W> {
    fn render(&mut self, results: &[DiagnosticResult]) -> Result<(), OutputError> {
        let table = render_table(&self.title, results);
        self.writer.write_all(table.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Lay out `results` as a titled table.
///
/// Multi-line cells keep their line breaks inside the cell.
pub fn render_table(title: &str, results: &[DiagnosticResult]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(HEADERS.to_vec());
    for r in results {
        table.add_row(vec![
            r.qualified_name.as_str(),
            r.description.as_str(),
            if r.passed { "OK" } else { "FAILED" },
            r.reason.as_str(),
        ]);
    }

    let body = table.to_string();
    let table_width = body.lines().next().map_or(0, |l| l.chars().count());
    let padding = table_width.saturating_sub(title.chars().count()) / 2;

    let mut out = String::with_capacity(body.len() + title.len() + padding + 2);
    out.push_str(&" ".repeat(padding));
    out.push_str(title);
    out.push('\n');
    out.push_str(&body);
    out.push('\n');
    out
}
