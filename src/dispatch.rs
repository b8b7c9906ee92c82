// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record dispatch functions.
//!
//! These are what the macros expand to. Each one checks the verbosity
//! registry first and returns immediately when the record is disabled, so
//! a suppressed call costs one atomic load (plus an override lookup when
//! overrides are installed) and never formats anything.
//!
//! # Architecture
//!
//! The logging flow follows this pattern:
//! 1. The macro checks [`is_enabled`] so that disabled calls skip formatting
//! 2. A `log_*` function builds a [`LogRecord`] on the logging thread
//! 3. The record goes to every matching sink, or to the fatal handler if its
//!    level is FATAL
//!
//! The functions are public for code that needs to log with a computed call
//! site, but most code should use the macros.
//!
//! ```rust
//! use scopelog::{CallSite, Level};
//!
//! scopelog::dispatch::log_message(Level::INFO, CallSite::new(file!(), line!()), "direct");
//! ```

use crate::Level;
use crate::fatal;
use crate::log_record::{CallSite, LogRecord};
use crate::sink_table;
use crate::stream::MessageStream;
use crate::verbosity::is_enabled;
use std::fmt;

fn emit(record: &LogRecord<'_>) {
    if record.level().is_fatal() {
        fatal::handle(record)
    }
    sink_table::dispatch(record);
}

/// Logs `message` at `level` from `site`.
///
/// A FATAL record does not return: the process aborts after the sinks are
/// flushed.
pub fn log_message(level: Level, site: CallSite, message: &str) {
    if !is_enabled(level, site.file()) {
        return;
    }
    emit(&LogRecord::new(level, site, message));
}

/// Logs preformatted arguments, avoiding an allocation for plain strings.
pub fn log_args(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    if !is_enabled(level, site.file()) {
        return;
    }
    log_args_unchecked(level, site, args);
}

/// [`log_args`] for callers that already checked the level.
#[doc(hidden)]
pub fn log_args_unchecked(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    match args.as_str() {
        Some(message) => emit(&LogRecord::new(level, site, message)),
        None => emit(&LogRecord::new(level, site, &args.to_string())),
    }
}

/// Logs the message built by `message`, which only runs if the level is enabled.
pub fn log_with<F>(level: Level, site: CallSite, message: F)
where
    F: FnOnce() -> String,
{
    if !is_enabled(level, site.file()) {
        return;
    }
    emit(&LogRecord::new(level, site, &message()));
}

/// Logs a finished [`MessageStream`].
pub fn log_stream(level: Level, site: CallSite, stream: &MessageStream) {
    log_message(level, site, stream.as_str());
}

#[doc(hidden)]
pub fn log_stream_unchecked(level: Level, site: CallSite, stream: &MessageStream) {
    emit(&LogRecord::new(level, site, stream.as_str()));
}

/// Logs only if `condition` holds.
pub fn log_if(condition: bool, level: Level, site: CallSite, message: &str) {
    if condition {
        log_message(level, site, message);
    }
}

/// Logs without preamble or indentation.
///
/// The level still decides which sinks see the record.
pub fn raw_log(level: Level, site: CallSite, message: &str) {
    if !is_enabled(level, site.file()) {
        return;
    }
    emit(&LogRecord::raw(level, site, message));
}

/// [`raw_log`] for preformatted arguments.
pub fn raw_log_args(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    if !is_enabled(level, site.file()) {
        return;
    }
    raw_log_args_unchecked(level, site, args);
}

#[doc(hidden)]
pub fn raw_log_args_unchecked(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    match args.as_str() {
        Some(message) => emit(&LogRecord::raw(level, site, message)),
        None => emit(&LogRecord::raw(level, site, &args.to_string())),
    }
}

/// Logs a FATAL record and aborts.
pub fn log_fatal(site: CallSite, message: &str) -> ! {
    fatal::handle(&LogRecord::new(Level::FATAL, site, message))
}
