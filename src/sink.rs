// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::format::Preamble;
use crate::log_record::LogRecord;
use std::borrow::Borrow;
use std::fmt::{Debug, Display};

/// An output destination.
///
/// The sink table calls `write` while holding its lock, so every sink sees
/// records in one global order and a sink needs no locking of its own beyond
/// what `&self` requires. Writes must be quick or buffered: a slow write
/// stalls logging on every thread.
pub trait Sink: Debug + Send + Sync {
    /**
        Writes one record. `rendered` is the formatted line, newline included,
        built with this sink's preamble and colour settings.

        An error is retried once by the sink table and then reported on stderr;
        it never reaches the code that logged.
    */
    fn write(&self, record: &LogRecord<'_>, rendered: &str) -> std::io::Result<()>;

    /**
    Pushes buffered output to its destination.

    Called after every record for [`FlushPolicy::EveryRecord`] sinks, by
    [`crate::flush`] and the periodic flusher, and always before the process
    aborts on a fatal record.
    */
    fn flush(&self) -> std::io::Result<()>;
}

/// Identity of a registered sink. Unique within the sink table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(String);

impl SinkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SinkId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SinkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SinkId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// When a sink is flushed outside the fatal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlushPolicy {
    /// After every record it receives.
    #[default]
    EveryRecord,
    /// Only on [`crate::flush`], the periodic flusher, shutdown and fatal.
    Manual,
}

/// Per-sink settings fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkOptions {
    /// Records more verbose than this are skipped for this sink only.
    pub threshold: Level,
    pub preamble: Preamble,
    /// Wrap lines in ANSI colour codes. Only set this for terminals.
    pub color: bool,
    pub flush: FlushPolicy,
}

impl SinkOptions {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn preamble(mut self, preamble: Preamble) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn flush(mut self, flush: FlushPolicy) -> Self {
        self.flush = flush;
        self
    }
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            threshold: Level::MAX,
            preamble: Preamble::FULL,
            color: false,
            flush: FlushPolicy::EveryRecord,
        }
    }
}

/*
Boilerplate notes.

# Sink

Clone makes no sense for something that may own a file handle.
PartialEq and Eq would be data-equality or provenance; the table compares
SinkIds instead, so sinks don't need either.
Default is not sensible, who knows what a sink needs to be built.
Send/Sync are required, the table is shared by every thread.
*/
