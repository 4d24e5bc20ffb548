// JsonOutput: machine-readable export of a run's results

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use crate::error::OutputError;
use crate::result::DiagnosticResult;

use super::OutputSink;

/// Writes the result list as a pretty-printed JSON array.
pub struct JsonOutput<W: Write = Stdout> {
    writer: W,
}

impl JsonOutput<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonOutput<BufWriter<File>> {
    /// Create (or truncate) `path` and write the results there.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for JsonOutput<W> {
    fn render(&mut self, results: &[DiagnosticResult]) -> Result<(), OutputError> {
        serde_json::to_writer_pretty(&mut self.writer, results)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
