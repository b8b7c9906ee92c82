// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! A sink that keeps what it receives in memory instead of writing it
//! anywhere. It is meant for:
//!
//! - unit tests of code that logs
//! - programmatically inspecting output (levels, depths, thread names)
//! - environments where stderr is unavailable
//!
//! ## Architecture
//!
//! Rendered lines and a structured copy of each record are stored behind a
//! `Mutex`, so the sink can be shared with `Arc` and read from any thread while
//! other threads log into it. Flushes are only counted.

use crate::Level;
use crate::log_record::LogRecord;
use crate::sink::Sink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The parts of a record worth asserting on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapturedRecord {
    pub level: Level,
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
    pub thread_name: String,
    pub depth: usize,
    pub message: String,
}

/// An in-memory sink.
///
/// # Example
///
/// ```rust
/// use scopelog::{InMemorySink, Level, SinkOptions};
/// use std::sync::Arc;
///
/// let memory = Arc::new(InMemorySink::new());
/// scopelog::add_sink("test-memory", memory.clone(), SinkOptions::new(Level::INFO));
///
/// scopelog::log_f!(INFO, "Test message {}", 42);
///
/// let logs = memory.drain_logs();
/// assert!(logs.contains("Test message 42"));
/// # scopelog::remove_sink("test-memory");
/// ```
#[derive(Debug, Default)]
pub struct InMemorySink {
    inner: Mutex<Captured>,
    flushes: AtomicUsize,
}

#[derive(Debug, Default)]
struct Captured {
    lines: Vec<String>,
    records: Vec<CapturedRecord>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Default: derived
// - Clone: not implemented, two handles to one buffer is what Arc is for
// - PartialEq/Eq/Hash: not implemented, comparing mutex contents is racy
// - Display: not implemented

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, without their trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    /// Just the messages, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.inner
            .lock()
            .records
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.inner.lock().records.clone()
    }

    /// Joins all lines with newlines and clears the buffer.
    pub fn drain_logs(&self) -> String {
        let mut inner = self.inner.lock();
        let result = inner.lines.join("\n");
        inner.lines.clear();
        inner.records.clear();
        result
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.lines.clear();
        inner.records.clear();
    }

    /// How many times the sink has been flushed.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl Sink for InMemorySink {
    fn write(&self, record: &LogRecord<'_>, rendered: &str) -> std::io::Result<()> {
        let mut inner = self.inner.lock();
        inner
            .lines
            .push(rendered.strip_suffix('\n').unwrap_or(rendered).to_string());
        inner.records.push(CapturedRecord {
            level: record.level(),
            file: record.file().to_string(),
            line: record.line(),
            function: record.function().map(str::to_string),
            thread_name: record.thread_name().to_string(),
            depth: record.depth(),
            message: record.message().to_string(),
        });
        Ok(())
    }

    fn flush(&self) -> std::io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallSite;

    #[test]
    fn captures_and_drains() {
        let sink = InMemorySink::new();
        let record = LogRecord::new(Level::ERROR, CallSite::new("src/x.rs", 7), "oops");
        sink.write(&record, "rendered oops\n").unwrap();
        assert_eq!(sink.lines(), vec!["rendered oops"]);
        let captured = &sink.records()[0];
        assert_eq!(captured.level, Level::ERROR);
        assert_eq!(captured.line, 7);
        assert_eq!(captured.file, "src/x.rs");
        assert_eq!(sink.drain_logs(), "rendered oops");
        assert_eq!(sink.drain_logs(), "");
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn counts_flushes() {
        let sink = InMemorySink::new();
        sink.flush().unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.flush_count(), 2);
    }
}
