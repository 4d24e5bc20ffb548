// Shared helpers for unit tests

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriter;

/// In-memory sink for a fmt subscriber.
#[derive(Clone, Default)]
pub(crate) struct SharedLogBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedLogBuffer {
    pub(crate) fn as_string(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => String::from_utf8_lossy(&guard).to_string(),
            Err(_) => String::new(),
        }
    }
}

pub(crate) struct SharedLogWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut guard) = self.inner.lock() {
            guard.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            Err(io::Error::other("failed to lock shared log buffer"))
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber on this thread and return what it logged.
///
/// Lines read `<LEVEL> <message>`, without timestamps, targets or colors.
pub(crate) fn capture_logs<R>(level: Level, f: impl FnOnce() -> R) -> (R, String) {
    let logs = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(logs.clone())
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.as_string())
}

/// The message parts of captured log lines at `level`.
pub(crate) fn messages_at(logs: &str, level: Level) -> Vec<String> {
    let label = level.to_string();
    logs.lines()
        .filter_map(|line| {
            let line = line.trim_start();
            line.strip_prefix(label.as_str())
                .map(|rest| rest.trim_start().to_string())
        })
        .collect()
}
