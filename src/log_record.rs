// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type.
//!
//! A [`LogRecord`] is built on the logging thread for a single call, handed to
//! every matching sink by reference, and dropped before the call returns. It
//! borrows the message rather than owning it, so building one costs a clock
//! read and a reference-count bump for the thread name.
//!
//! ```rust
//! use scopelog::{CallSite, Level, LogRecord};
//!
//! let record = LogRecord::new(Level::INFO, CallSite::new(file!(), line!()), "hello");
//! assert_eq!(record.message(), "hello");
//! assert_eq!(record.level(), Level::INFO);
//! ```

use crate::Level;
use crate::context;
use chrono::{DateTime, Local};
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// The instant uptimes are measured from.
///
/// Set by [`crate::init`], or by the first record if `init` is never called.
pub(crate) fn epoch() -> Instant {
    *EPOCH.get_or_init(Instant::now)
}

/// Where a log call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    function: Option<&'static str>,
}

impl CallSite {
    #[inline]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self {
            file,
            line,
            function: None,
        }
    }

    /// The location of the caller, for code that cannot use `file!()`/`line!()`.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    #[inline]
    pub const fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }

    #[inline]
    pub fn file(&self) -> &'static str {
        self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn function(&self) -> Option<&'static str> {
        self.function
    }
}

/**
A log record.

Holds everything the formatter needs: level, call site, the logging thread's
name and scope depth at the time of the call, the already-formatted message,
and when it happened.
*/
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    level: Level,
    site: CallSite,
    thread_name: Arc<str>,
    depth: usize,
    message: &'a str,
    timestamp: DateTime<Local>,
    uptime: Duration,
    raw: bool,
}

impl<'a> LogRecord<'a> {
    /// Builds a record on the current thread, reading its name and depth.
    pub fn new(level: Level, site: CallSite, message: &'a str) -> Self {
        let (thread_name, depth) = context::snapshot();
        let now = Instant::now();
        Self {
            level,
            site,
            thread_name,
            depth,
            message,
            timestamp: Local::now(),
            uptime: now.saturating_duration_since(epoch()),
            raw: false,
        }
    }

    /// A record rendered without preamble or indentation.
    pub fn raw(level: Level, site: CallSite, message: &'a str) -> Self {
        Self {
            raw: true,
            ..Self::new(level, site, message)
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn site(&self) -> CallSite {
        self.site
    }

    #[inline]
    pub fn file(&self) -> &'static str {
        self.site.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.site.line
    }

    #[inline]
    pub fn function(&self) -> Option<&'static str> {
        self.site.function
    }

    #[inline]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Number of live scopes on the logging thread.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn message(&self) -> &'a str {
        self.message
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    #[inline]
    pub fn uptime(&self) -> Duration {
        self.uptime
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

/*
Boilerplate notes for LogRecord:

- Clone: derived, sinks that queue records can clone the metadata (the message
  is still borrowed, so queuing sinks copy it out with to_string).
- PartialEq/Eq/Hash: not implemented, two records with equal fields logged at
  different instants are still different records.
- Default: no sensible call site.
- Display: renders the message only, the formatter owns everything else.
- Send/Sync: automatic.
*/

impl std::fmt::Display for LogRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reads_thread_context() {
        std::thread::spawn(|| {
            crate::set_thread_name("recorder");
            let record = LogRecord::new(Level::WARNING, CallSite::caller(), "msg");
            assert_eq!(record.thread_name(), "recorder");
            assert_eq!(record.depth(), 0);
            assert_eq!(record.file(), file!());
            assert!(!record.is_raw());
            assert_eq!(record.to_string(), "msg");
        })
        .join()
        .unwrap();
    }

    #[test]
    fn raw_records_are_marked() {
        let record = LogRecord::raw(Level::INFO, CallSite::new("a.rs", 1), "x");
        assert!(record.is_raw());
        assert_eq!(record.function(), None);
    }

    #[test]
    fn call_site_function() {
        let site = CallSite::new("a.rs", 3).with_function("crate::run");
        assert_eq!(site.function(), Some("crate::run"));
        assert_eq!(site.line(), 3);
    }
}
