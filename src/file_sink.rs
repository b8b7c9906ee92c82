// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log files.
//!
//! ```no_run
//! use scopelog::{FileMode, Level};
//!
//! scopelog::add_file_sink("logs/everything.log", FileMode::Append, Level::MAX)?;
//! scopelog::add_file_sink("logs/latest_warnings.log", FileMode::Truncate, Level::WARNING)?;
//! # Ok::<(), scopelog::Error>(())
//! ```

use crate::dispatch::log_message;
use crate::error::Error;
use crate::log_record::{CallSite, LogRecord};
use crate::sink::{Sink, SinkId, SinkOptions};
use crate::sink_table::add_sink;
use crate::Level;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to do with an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileMode {
    #[default]
    Truncate,
    Append,
}

impl FileMode {
    fn as_str(self) -> &'static str {
        match self {
            FileMode::Truncate => "truncate",
            FileMode::Append => "append",
        }
    }
}

/// A buffered file sink.
///
/// Output is buffered; the sink table flushes it after each record unless the
/// sink is registered with [`crate::FlushPolicy::Manual`].
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Opens `path`, creating missing parent directories.
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let open_error = |source| Error::OpenFile {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            FileMode::Truncate => options.write(true).truncate(true),
            FileMode::Append => options.append(true),
        };
        let file = options.open(&path).map_err(open_error)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes text that is not a record, such as a column header.
    pub fn write_text(&self, text: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

impl Sink for FileSink {
    fn write(&self, _record: &LogRecord<'_>, rendered: &str) -> std::io::Result<()> {
        self.writer.lock().write_all(rendered.as_bytes())
    }

    fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }
}

/// Opens a log file and registers it, using the path as the sink id.
///
/// Records more verbose than `threshold` are not written to this file.
/// On failure a WARNING is logged to the sinks that already exist and the
/// error is returned; logging carries on without the file.
pub fn add_file_sink(
    path: impl AsRef<Path>,
    mode: FileMode,
    threshold: Level,
) -> Result<SinkId, Error> {
    add_file_sink_with(path, mode, SinkOptions::new(threshold))
}

/// [`add_file_sink`] with full control over the sink options.
///
/// Colour is always off for files. If the preamble is not empty, a column
/// header is written when the file is opened.
pub fn add_file_sink_with(
    path: impl AsRef<Path>,
    mode: FileMode,
    options: SinkOptions,
) -> Result<SinkId, Error> {
    let path = path.as_ref();
    let sink = match FileSink::open(path, mode) {
        Ok(sink) => sink,
        Err(e) => {
            log_message(
                Level::WARNING,
                CallSite::new(file!(), line!()),
                &e.report(),
            );
            return Err(e);
        }
    };
    if !options.preamble.is_empty() {
        if let Err(e) = sink.write_text(&options.preamble.header()) {
            eprintln!("scopelog: could not write header to {}: {}", path.display(), e);
        }
    }
    let id = SinkId::new(path.display().to_string());
    add_sink(id.clone(), Arc::new(sink), options.color(false));
    log_message(
        Level::INFO,
        CallSite::new(file!(), line!()),
        &format!(
            "Logging to '{}', mode: '{}', verbosity: {}",
            path.display(),
            mode.as_str(),
            options.threshold
        ),
    );
    Ok(id)
}
