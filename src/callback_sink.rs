// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::log_record::LogRecord;
use crate::sink::{Sink, SinkId, SinkOptions};
use crate::sink_table::add_sink;
use std::fmt::Debug;
use std::io;
use std::sync::Arc;

type WriteFn = dyn Fn(&LogRecord<'_>, &str) -> io::Result<()> + Send + Sync;
type FlushFn = dyn Fn() -> io::Result<()> + Send + Sync;

/// A sink backed by closures.
///
/// Whatever the embedding application needs (a handle, a channel, a counter)
/// is captured by the closures.
///
/// ```rust
/// use scopelog::{CallbackSink, Level, SinkOptions};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink_seen = seen.clone();
/// let sink = CallbackSink::new(move |record, _line| {
///     sink_seen.lock().unwrap().push(record.message().to_string());
///     Ok(())
/// });
/// scopelog::add_sink("collector", Arc::new(sink), SinkOptions::new(Level::INFO));
///
/// scopelog::log_f!(WARNING, "seen by the callback");
/// assert!(seen.lock().unwrap().contains(&"seen by the callback".to_string()));
/// # scopelog::remove_sink("collector");
/// ```
pub struct CallbackSink {
    write: Box<WriteFn>,
    flush: Option<Box<FlushFn>>,
}

impl CallbackSink {
    pub fn new<W>(write: W) -> Self
    where
        W: Fn(&LogRecord<'_>, &str) -> io::Result<()> + Send + Sync + 'static,
    {
        Self {
            write: Box::new(write),
            flush: None,
        }
    }

    pub fn with_flush<F>(mut self, flush: F) -> Self
    where
        F: Fn() -> io::Result<()> + Send + Sync + 'static,
    {
        self.flush = Some(Box::new(flush));
        self
    }
}

impl Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSink")
            .field("has_flush", &self.flush.is_some())
            .finish()
    }
}

impl Sink for CallbackSink {
    fn write(&self, record: &LogRecord<'_>, rendered: &str) -> io::Result<()> {
        (self.write)(record, rendered)
    }

    fn flush(&self) -> io::Result<()> {
        match &self.flush {
            Some(flush) => flush(),
            None => Ok(()),
        }
    }
}

/// Registers `write` as a sink under `id`, with the default preamble.
pub fn add_callback_sink<W>(id: impl Into<SinkId>, threshold: Level, write: W)
where
    W: Fn(&LogRecord<'_>, &str) -> io::Result<()> + Send + Sync + 'static,
{
    add_sink(id, Arc::new(CallbackSink::new(write)), SinkOptions::new(threshold));
}
