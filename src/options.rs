// SPDX-License-Identifier: MIT OR Apache-2.0

//! Start-up configuration.
//!
//! [`init`] configures the process from an [`Options`] value and from the
//! command line. Flags it recognises are removed from the argument vector so
//! the application's own parser never sees them:
//!
//! | flag                                              | effect                     |
//! |---------------------------------------------------|----------------------------|
//! | `-v <lvl>`, `-v<lvl>`, `--verbosity=<lvl>`, `--v=<lvl>`, `verbosity=<lvl>` | global verbosity |
//! | `--file=<path>`, `file=<path>`                    | log to a file (append)     |
//! | `--colorlogtostderr=<bool>`, `colorlogtostderr=<bool>` | force console colour on/off |
//! | `--vmodule=<pattern=lvl,...>`, `vmodule=...`      | per-file verbosity         |
//!
//! `<lvl>` is a number or one of `OFF`, `FATAL`, `ERROR`, `WARNING`, `INFO`.
//! The first argument (the program name) and everything after `--` are left
//! alone. Flags given on the command line win over the same setting in
//! [`Options`].
//!
//! ```rust
//! use scopelog::{Level, Options};
//!
//! let mut args: Vec<String> = ["app", "-v", "2", "input.txt"].map(String::from).to_vec();
//! scopelog::init(&mut args, Options::new().console(false));
//! assert_eq!(args, ["app", "input.txt"]);
//! assert_eq!(scopelog::verbosity::verbosity(), Level::verbose(2));
//! ```

use crate::Level;
use crate::console_sink::{CONSOLE_SINK_ID, ColorMode, ConsoleSink};
use crate::dispatch::log_message;
use crate::error::Error;
use crate::fatal::set_stack_trace_on_fatal;
use crate::file_sink::{FileMode, add_file_sink_with};
use crate::format::Preamble;
use crate::log_record::{CallSite, epoch};
use crate::sink::SinkOptions;
use crate::sink_table::{self, add_sink, remove_sink};
use crate::verbosity::{self, install_overrides, parse_override_list, parse_overrides};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Settings for [`init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub verbosity: Level,
    /// `pattern=level` entries, as accepted by `--vmodule`.
    pub overrides: Vec<String>,
    pub log_file: Option<PathBuf>,
    pub file_mode: FileMode,
    pub file_verbosity: Level,
    pub console: bool,
    pub console_verbosity: Level,
    pub color: ColorMode,
    pub preamble: Preamble,
    pub stack_trace_on_fatal: bool,
    pub flush_interval: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbosity: Level::INFO,
            overrides: Vec::new(),
            log_file: None,
            file_mode: FileMode::Append,
            file_verbosity: Level::MAX,
            console: true,
            console_verbosity: Level::MAX,
            color: ColorMode::Auto,
            preamble: Preamble::FULL,
            stack_trace_on_fatal: true,
            flush_interval: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbosity(mut self, level: Level) -> Self {
        self.verbosity = level;
        self
    }

    /// Adds a `pattern=level` override.
    pub fn override_pattern(mut self, entry: impl Into<String>) -> Self {
        self.overrides.push(entry.into());
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>, mode: FileMode) -> Self {
        self.log_file = Some(path.into());
        self.file_mode = mode;
        self
    }

    pub fn file_verbosity(mut self, level: Level) -> Self {
        self.file_verbosity = level;
        self
    }

    /// Whether the stderr sink stays registered.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn console_verbosity(mut self, level: Level) -> Self {
        self.console_verbosity = level;
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn preamble(mut self, preamble: Preamble) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn stack_trace_on_fatal(mut self, enabled: bool) -> Self {
        self.stack_trace_on_fatal = enabled;
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /**
    Removes recognised flags from `args` and applies them to `self`.

    Returns the problems found. Malformed flags are removed too, and do not
    change the options.
    */
    pub fn apply_args(&mut self, args: &mut Vec<String>) -> Vec<Error> {
        let mut errors = Vec::new();
        let mut kept = Vec::with_capacity(args.len());
        let mut iter = std::mem::take(args).into_iter();
        if let Some(program) = iter.next() {
            kept.push(program);
        }
        while let Some(arg) = iter.next() {
            if arg == "--" {
                kept.push(arg);
                kept.extend(iter.by_ref());
                break;
            }
            if arg == "-v" {
                match iter.next() {
                    Some(value) => self.apply_verbosity(&value, &mut errors),
                    None => errors.push(Error::MissingValue(arg)),
                }
                continue;
            }
            if let Some(value) = short_verbosity(&arg) {
                self.apply_verbosity(value, &mut errors);
                continue;
            }
            let Some((flag, value)) = split_flag(&arg) else {
                kept.push(arg);
                continue;
            };
            match flag {
                Flag::Verbosity => self.apply_verbosity(value, &mut errors),
                Flag::File => {
                    if value.is_empty() {
                        errors.push(Error::MissingValue("file".to_string()));
                    } else {
                        self.log_file = Some(PathBuf::from(value));
                        self.file_mode = FileMode::Append;
                    }
                }
                Flag::Color => match parse_bool(value) {
                    Some(true) => self.color = ColorMode::Always,
                    Some(false) => self.color = ColorMode::Never,
                    None => errors.push(Error::InvalidBool {
                        flag: "colorlogtostderr".to_string(),
                        value: value.to_string(),
                    }),
                },
                Flag::Vmodule => {
                    let (_, problems) = parse_overrides(value);
                    if problems.is_empty() {
                        self.overrides.extend(
                            value
                                .split(',')
                                .map(str::trim)
                                .filter(|e| !e.is_empty())
                                .map(String::from),
                        );
                    } else {
                        errors.extend(problems);
                    }
                }
            }
        }
        *args = kept;
        errors
    }

    fn apply_verbosity(&mut self, value: &str, errors: &mut Vec<Error>) {
        match value.parse::<Level>() {
            Ok(level) => self.verbosity = level,
            Err(e) => errors.push(e),
        }
    }
}

/// `-v3`, `-v-1`, `-vINFO` and `-v=3`. Anything else starting with `-v` is not ours.
fn short_verbosity(arg: &str) -> Option<&str> {
    let rest = arg.strip_prefix("-v")?;
    if rest.is_empty() {
        return None;
    }
    let value = rest.strip_prefix('=').unwrap_or(rest);
    value.parse::<Level>().ok().map(|_| value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Verbosity,
    File,
    Color,
    Vmodule,
}

/// Splits `--name=value` or `name=value` for the flags we own.
///
/// The bare `v=` form is not accepted, it is too likely to be an argument of
/// the application.
fn split_flag(arg: &str) -> Option<(Flag, &str)> {
    let (dashed, body) = match arg.strip_prefix("--") {
        Some(body) => (true, body),
        None => (false, arg),
    };
    let (name, value) = match body.split_once('=') {
        Some(pair) => pair,
        None if dashed && body == "colorlogtostderr" => (body, "true"),
        None => return None,
    };
    let flag = match name {
        "verbosity" => Flag::Verbosity,
        "v" if dashed => Flag::Verbosity,
        "file" => Flag::File,
        "colorlogtostderr" => Flag::Color,
        "vmodule" => Flag::Vmodule,
        _ => return None,
    };
    Some((flag, value))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/**
Configures logging for the process.

Strips recognised flags from `args` (see the module docs), then sets the
global verbosity, installs overrides, sets up the console sink, the log file
and the periodic flusher, and finally logs each configuration problem as a
WARNING plus a short INFO summary.

Problems never stop initialisation: a bad flag is ignored and an unopenable
log file is skipped.
*/
pub fn init(args: &mut Vec<String>, options: Options) {
    let _ = epoch();
    let mut options = options;
    let mut problems = options.apply_args(args);

    verbosity::set_verbosity(options.verbosity);
    let (overrides, errors) = parse_override_list(&options.overrides);
    problems.extend(errors);
    if !overrides.is_empty() {
        if let Err(e) = install_overrides(overrides) {
            problems.push(e);
        }
    }

    if options.console {
        add_sink(
            CONSOLE_SINK_ID,
            Arc::new(ConsoleSink::new()),
            SinkOptions::new(options.console_verbosity)
                .preamble(options.preamble)
                .color(options.color.resolve()),
        );
    } else {
        remove_sink(CONSOLE_SINK_ID);
    }

    if let Some(path) = &options.log_file {
        // Failure is logged as a WARNING by add_file_sink_with.
        let _ = add_file_sink_with(
            path,
            options.file_mode,
            SinkOptions::new(options.file_verbosity).preamble(options.preamble),
        );
    }

    set_stack_trace_on_fatal(options.stack_trace_on_fatal);
    if let Some(interval) = options.flush_interval {
        sink_table::start_periodic_flush(interval);
    }

    let site = CallSite::new(file!(), line!());
    for problem in &problems {
        log_message(Level::WARNING, site, &problem.report());
    }
    log_message(Level::INFO, site, &format!("arguments: {}", args.join(" ")));
    if let Ok(dir) = std::env::current_dir() {
        log_message(Level::INFO, site, &format!("current dir: {}", dir.display()));
    }
    log_message(
        Level::INFO,
        site,
        &format!("verbosity: {}", verbosity::verbosity()),
    );
}

/// Flushes and unregisters every sink, and stops the periodic flusher.
///
/// Records logged afterwards go nowhere until a sink is added again.
pub fn shutdown() {
    log_message(
        Level::INFO,
        CallSite::new(file!(), line!()),
        "scopelog shutting down",
    );
    sink_table::stop_periodic_flush();
    sink_table::remove_all_sinks();
}
