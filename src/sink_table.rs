// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide sink table.
//!
//! Every record that passes the verbosity registry is written to each
//! registered sink whose own threshold admits it. The table is a list of
//! `(id, sink, options)` entries guarded by a single lock, and the lock is held
//! for the whole fan-out of one record. That gives every sink the same global
//! order of records, and it is why sinks must keep their writes short.
//!
//! # Default behavior
//!
//! The table starts with a single console sink, [`CONSOLE_SINK_ID`], writing to
//! stderr. [`crate::init`] can remove it, and [`crate::reset`] starts from an
//! empty table.
//!
//! # Examples
//!
//! ```
//! use scopelog::{InMemorySink, Level, SinkOptions};
//! use std::sync::Arc;
//!
//! let memory = Arc::new(InMemorySink::new());
//! scopelog::add_sink("memory", memory.clone(), SinkOptions::new(Level::WARNING));
//!
//! scopelog::log_f!(INFO, "skipped by the memory sink");
//! scopelog::log_f!(ERROR, "written to the memory sink");
//!
//! let logs = memory.drain_logs();
//! assert!(logs.contains("written to the memory sink"));
//! assert!(!logs.contains("skipped"));
//! # scopelog::remove_sink("memory");
//! ```
//!
//! # Implementation notes
//!
//! The lock is a re-entrant mutex around a `RefCell`. A sink that logs from
//! inside `write` re-enters the table on the same thread and is served with a
//! shared borrow, so that works (as long as it does not recurse forever).
//! Adding or removing sinks from inside `write` would need a mutable borrow
//! while the fan-out holds a shared one; such calls are refused and reported
//! on stderr.
//!
//! Sink failures never propagate. A failed write is retried once, then the
//! record is dropped for that sink and the failure is printed to stderr. A
//! panicking sink is caught so that the remaining sinks still get the record.

use crate::Level;
use crate::console_sink::{CONSOLE_SINK_ID, ConsoleSink};
use crate::format::{Preamble, render};
use crate::log_record::LogRecord;
use crate::sink::{FlushPolicy, Sink, SinkId, SinkOptions};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct SinkEntry {
    id: SinkId,
    sink: Arc<dyn Sink>,
    options: SinkOptions,
}

type Table = ReentrantMutex<RefCell<Vec<SinkEntry>>>;

static SINKS: OnceLock<Table> = OnceLock::new();

fn table() -> &'static Table {
    SINKS.get_or_init(|| {
        let (sink, options) = ConsoleSink::default_registration();
        ReentrantMutex::new(RefCell::new(vec![SinkEntry {
            id: SinkId::from(CONSOLE_SINK_ID),
            sink,
            options,
        }]))
    })
}

fn with_entries_mut<R>(f: impl FnOnce(&mut Vec<SinkEntry>) -> R) -> Option<R> {
    let guard = table().lock();
    let result = match guard.try_borrow_mut() {
        Ok(mut entries) => Some(f(&mut entries)),
        Err(_) => {
            eprintln!("scopelog: the sink table cannot be changed from inside a sink; ignored");
            None
        }
    };
    result
}

/// Registers `sink` under `id`.
///
/// New ids are appended, so sinks receive each record in registration order.
/// An id that is already registered is replaced in place: the old sink is
/// flushed and dropped, and the sink count does not change.
pub fn add_sink(id: impl Into<SinkId>, sink: Arc<dyn Sink>, options: SinkOptions) {
    let id = id.into();
    let replaced = with_entries_mut(|entries| {
        let pos = entries.iter().position(|e| e.id == id);
        let entry = SinkEntry { id, sink, options };
        match pos {
            Some(pos) => Some(std::mem::replace(&mut entries[pos], entry)),
            None => {
                entries.push(entry);
                None
            }
        }
    })
    .flatten();
    if let Some(old) = replaced {
        flush_isolated(&old);
    }
}

/// Unregisters the sink with `id`, flushing it first. Returns whether it existed.
pub fn remove_sink(id: &str) -> bool {
    let removed = with_entries_mut(|entries| {
        let pos = entries.iter().position(|e| e.id.as_str() == id)?;
        Some(entries.remove(pos))
    })
    .flatten();
    match removed {
        Some(entry) => {
            flush_isolated(&entry);
            true
        }
        None => false,
    }
}

/// Flushes and unregisters every sink.
pub fn remove_all_sinks() {
    let removed = with_entries_mut(std::mem::take).unwrap_or_default();
    for entry in &removed {
        flush_isolated(entry);
    }
}

/// Changes the threshold of a registered sink. Returns whether it existed.
pub fn set_sink_threshold(id: &str, threshold: Level) -> bool {
    with_entries_mut(|entries| {
        entries
            .iter_mut()
            .find(|e| e.id.as_str() == id)
            .map(|e| e.options.threshold = threshold)
            .is_some()
    })
    .unwrap_or(false)
}

pub fn sink_options(id: &str) -> Option<SinkOptions> {
    let guard = table().lock();
    let entries = guard.try_borrow().ok()?;
    entries
        .iter()
        .find(|e| e.id.as_str() == id)
        .map(|e| e.options)
}

/// Registered ids in registration order.
pub fn sink_ids() -> Vec<SinkId> {
    let guard = table().lock();
    let ids = match guard.try_borrow() {
        Ok(entries) => entries.iter().map(|e| e.id.clone()).collect(),
        Err(_) => Vec::new(),
    };
    ids
}

pub fn sink_count() -> usize {
    let guard = table().lock();
    let count = guard.try_borrow().map(|e| e.len()).unwrap_or(0);
    count
}

/// Calls `f` for each sink whose threshold admits `level`, in registration
/// order, while holding the table lock.
pub fn for_each_matching<F>(level: Level, mut f: F)
where
    F: FnMut(&SinkId, &dyn Sink, &SinkOptions),
{
    let guard = table().lock();
    let Ok(entries) = guard.try_borrow() else {
        return;
    };
    for entry in entries.iter().filter(|e| level.passes(e.options.threshold)) {
        f(&entry.id, entry.sink.as_ref(), &entry.options);
    }
}

/// Renders and writes `record` to every matching sink.
///
/// The line is rendered once per distinct preamble/colour combination.
pub(crate) fn dispatch(record: &LogRecord<'_>) {
    let guard = table().lock();
    let Ok(entries) = guard.try_borrow() else {
        eprintln!("scopelog: record logged while the sink table was being changed; dropped");
        return;
    };
    let mut rendered: Vec<(Preamble, bool, String)> = Vec::new();
    for entry in entries
        .iter()
        .filter(|e| record.level().passes(e.options.threshold))
    {
        let options = &entry.options;
        let idx = match rendered
            .iter()
            .position(|(p, c, _)| *p == options.preamble && *c == options.color)
        {
            Some(idx) => idx,
            None => {
                let line = render(record, &options.preamble, options.color);
                rendered.push((options.preamble, options.color, line));
                rendered.len() - 1
            }
        };
        deliver(entry, record, &rendered[idx].2);
    }
}

fn deliver(entry: &SinkEntry, record: &LogRecord<'_>, line: &str) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        entry
            .sink
            .write(record, line)
            .or_else(|_| entry.sink.write(record, line))?;
        if entry.options.flush == FlushPolicy::EveryRecord {
            entry.sink.flush()?;
        }
        Ok::<(), std::io::Error>(())
    }));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("scopelog: sink `{}` failed, record dropped: {}", entry.id, e),
        Err(_) => eprintln!("scopelog: sink `{}` panicked, record dropped", entry.id),
    }
}

fn flush_isolated(entry: &SinkEntry) {
    match catch_unwind(AssertUnwindSafe(|| entry.sink.flush())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("scopelog: failed to flush sink `{}`: {}", entry.id, e),
        Err(_) => eprintln!("scopelog: sink `{}` panicked while flushing", entry.id),
    }
}

/// Flushes every registered sink. Failures are reported on stderr and skipped.
pub fn flush_all() {
    let guard = table().lock();
    let Ok(entries) = guard.try_borrow() else {
        return;
    };
    for entry in entries.iter() {
        flush_isolated(entry);
    }
}

static FLUSH_INTERVAL_MS: AtomicU64 = AtomicU64::new(0);
static FLUSHER: OnceLock<Option<thread::Thread>> = OnceLock::new();

/// Flushes all sinks every `interval` from a background thread.
///
/// Useful with [`FlushPolicy::Manual`] sinks. Calling it again changes the
/// interval; there is only ever one flusher thread.
pub fn start_periodic_flush(interval: Duration) {
    let ms = u64::try_from(interval.as_millis())
        .unwrap_or(u64::MAX)
        .max(1);
    FLUSH_INTERVAL_MS.store(ms, Ordering::Relaxed);
    let flusher = FLUSHER.get_or_init(|| {
        match thread::Builder::new()
            .name("scopelog-flush".to_string())
            .spawn(flusher_loop)
        {
            Ok(handle) => Some(handle.thread().clone()),
            Err(e) => {
                eprintln!("scopelog: could not start the flusher thread: {}", e);
                None
            }
        }
    });
    if let Some(thread) = flusher {
        thread.unpark();
    }
}

/// Pauses the periodic flusher until the next [`start_periodic_flush`].
pub fn stop_periodic_flush() {
    FLUSH_INTERVAL_MS.store(0, Ordering::Relaxed);
}

fn flusher_loop() {
    loop {
        let ms = FLUSH_INTERVAL_MS.load(Ordering::Relaxed);
        if ms == 0 {
            thread::park();
            continue;
        }
        thread::sleep(Duration::from_millis(ms));
        flush_all();
    }
}

/// Empties the table, without the console sink.
pub(crate) fn reset() {
    stop_periodic_flush();
    remove_all_sinks();
}
