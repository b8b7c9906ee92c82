// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering records into text lines.
//!
//! Rendering is pure: the same record, preamble and colour flag always give
//! the same line. A full line looks like
//!
//! ```text
//! 2026-10-15 09:12:44.031 (   0.004s) [main            ]         scopes.rs:42      WARN| . . disk almost full
//! ```
//!
//! i.e. date, time, uptime, thread name, `file:line`, level tag, a `| `
//! separator, one [`INDENT`] per live scope, then the message.

use crate::Level;
use crate::log_record::LogRecord;
use std::fmt::Write;

/// One unit of scope indentation.
pub const INDENT: &str = ". ";
/// Width of the thread column; longer names are cut.
pub const THREAD_NAME_WIDTH: usize = 16;
const FILENAME_WIDTH: usize = 23;
const LINE_WIDTH: usize = 5;
const LEVEL_WIDTH: usize = 4;

const RESET: &str = "\x1b[0m";
const BOLD_RED: &str = "\x1b[31m\x1b[1m";
const RED: &str = "\x1b[31m";
const BOLD_YELLOW: &str = "\x1b[33m\x1b[1m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Which metadata fields precede the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Preamble {
    pub date: bool,
    pub time: bool,
    pub uptime: bool,
    pub thread: bool,
    pub file: bool,
    pub level: bool,
}

impl Preamble {
    pub const FULL: Preamble = Preamble {
        date: true,
        time: true,
        uptime: true,
        thread: true,
        file: true,
        level: true,
    };

    /// Message (and indentation) only.
    pub const NONE: Preamble = Preamble {
        date: false,
        time: false,
        uptime: false,
        thread: false,
        file: false,
        level: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Preamble::NONE
    }

    /// A column header lined up with the preamble, for the top of log files.
    pub fn header(&self) -> String {
        let mut out = String::new();
        if self.date {
            let _ = write!(out, "{:<10} ", "date");
        }
        if self.time {
            let _ = write!(out, "{:<12} ", "time");
        }
        if self.uptime {
            out.push_str("( uptime  ) ");
        }
        if self.thread {
            let _ = write!(out, "[{:^width$}] ", "thread name/id", width = THREAD_NAME_WIDTH);
        }
        if self.file {
            let _ = write!(
                out,
                "{:>fw$}:{:<lw$} ",
                "file",
                "line",
                fw = FILENAME_WIDTH,
                lw = LINE_WIDTH
            );
        }
        if self.level {
            let _ = write!(out, "{:>width$}", "v", width = LEVEL_WIDTH);
        }
        if !self.is_empty() {
            out.push_str("| ");
        }
        out.push('\n');
        out
    }
}

impl Default for Preamble {
    fn default() -> Self {
        Preamble::FULL
    }
}

/// The last path component, for either separator.
pub fn basename(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// The ANSI colour used for a level.
pub fn level_color(level: Level) -> &'static str {
    match level {
        l if l.is_fatal() => BOLD_RED,
        Level::ERROR => RED,
        Level::WARNING => BOLD_YELLOW,
        Level::INFO => BOLD,
        _ => DIM,
    }
}

/// Renders `record` as one newline-terminated line.
///
/// Callers only pass `color = true` for sinks that have been found to support
/// it; with `color = false` the output never contains an escape byte.
pub fn render(record: &LogRecord<'_>, preamble: &Preamble, color: bool) -> String {
    let mut out = String::with_capacity(96 + record.message().len());
    if color {
        out.push_str(level_color(record.level()));
    }
    if !record.is_raw() {
        write_preamble(&mut out, record, preamble);
        for _ in 0..record.depth() {
            out.push_str(INDENT);
        }
    }
    out.push_str(record.message());
    if color {
        out.push_str(RESET);
    }
    out.push('\n');
    out
}

fn write_preamble(out: &mut String, record: &LogRecord<'_>, preamble: &Preamble) {
    if preamble.is_empty() {
        return;
    }
    let timestamp = record.timestamp();
    if preamble.date {
        let _ = write!(out, "{} ", timestamp.format("%Y-%m-%d"));
    }
    if preamble.time {
        let _ = write!(out, "{} ", timestamp.format("%H:%M:%S%.3f"));
    }
    if preamble.uptime {
        let _ = write!(out, "({:8.3}s) ", record.uptime().as_secs_f64());
    }
    if preamble.thread {
        let _ = write!(
            out,
            "[{:<width$}] ",
            fit_left(record.thread_name(), THREAD_NAME_WIDTH),
            width = THREAD_NAME_WIDTH
        );
    }
    if preamble.file {
        let _ = write!(
            out,
            "{:>fw$}:{:<lw$} ",
            fit_right(basename(record.file()), FILENAME_WIDTH),
            record.line(),
            fw = FILENAME_WIDTH,
            lw = LINE_WIDTH
        );
    }
    if preamble.level {
        let _ = write!(out, "{:>width$}", record.level().tag(), width = LEVEL_WIDTH);
    }
    out.push_str("| ");
}

/// Keeps the first `width` characters.
fn fit_left(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Keeps the tail of `s`, marking the cut with `...`.
fn fit_right(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count <= width {
        return s.to_string();
    }
    let keep = width.saturating_sub(3);
    let tail: String = s.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
