// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fatal path.
//!
//! A FATAL record (from `log_f!(FATAL, ..)`, a failed `check_*` macro or
//! [`crate::dispatch::log_fatal`]) ends the process. Before it does, every
//! sink gets the record and is flushed, a stack trace is optionally written,
//! and the user's fatal callback, if any, runs. Then the process aborts.
//!
//! The sequence runs at most once per process:
//!
//! ```text
//! Running -> Triggered -> Flushing -> TraceCapture -> CallbackInvocation -> Aborted
//! ```
//!
//! The first thread to leave `Running` owns the sequence. Any other thread
//! that logs FATAL afterwards is parked forever, so exactly one FATAL record
//! reaches the sinks. If the owning thread logs FATAL again (from a sink or
//! from the callback) it aborts on the spot.
//!
//! ```no_run
//! scopelog::set_fatal_handler(|record| {
//!     eprintln!("about to abort: {}", record.message());
//! });
//! scopelog::log_f!(FATAL, "unrecoverable");
//! ```

use crate::Level;
use crate::log_record::LogRecord;
use crate::sink_table;
use parking_lot::RwLock;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Where the process is in the fatal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FatalState {
    Running = 0,
    Triggered = 1,
    Flushing = 2,
    TraceCapture = 3,
    CallbackInvocation = 4,
    Aborted = 5,
}

impl FatalState {
    fn from_u8(value: u8) -> FatalState {
        match value {
            0 => FatalState::Running,
            1 => FatalState::Triggered,
            2 => FatalState::Flushing,
            3 => FatalState::TraceCapture,
            4 => FatalState::CallbackInvocation,
            _ => FatalState::Aborted,
        }
    }
}

type FatalHandler = Arc<dyn Fn(&LogRecord<'_>) + Send + Sync>;

static STATE: AtomicU8 = AtomicU8::new(FatalState::Running as u8);
static STACK_TRACE: AtomicBool = AtomicBool::new(true);
static HANDLER: RwLock<Option<FatalHandler>> = RwLock::new(None);

thread_local! {
    static HANDLING: Cell<bool> = const { Cell::new(false) };
}

pub fn fatal_state() -> FatalState {
    FatalState::from_u8(STATE.load(Ordering::Acquire))
}

fn advance(state: FatalState) {
    STATE.store(state as u8, Ordering::Release);
}

/// Installs the callback run just before the process aborts.
///
/// The callback sees the FATAL record. The sinks have already been flushed
/// when it runs. A panic inside it is caught; the process aborts either way.
pub fn set_fatal_handler<F>(handler: F)
where
    F: Fn(&LogRecord<'_>) + Send + Sync + 'static,
{
    *HANDLER.write() = Some(Arc::new(handler));
}

pub fn clear_fatal_handler() {
    *HANDLER.write() = None;
}

/// Whether a stack trace is written to the sinks on FATAL. On by default.
pub fn set_stack_trace_on_fatal(enabled: bool) {
    STACK_TRACE.store(enabled, Ordering::Relaxed);
}

pub fn stack_trace_on_fatal() -> bool {
    STACK_TRACE.load(Ordering::Relaxed)
}

/// Runs the fatal sequence for `record` and aborts.
pub(crate) fn handle(record: &LogRecord<'_>) -> ! {
    let reentered = HANDLING.try_with(|h| h.replace(true)).unwrap_or(true);
    if reentered {
        std::process::abort();
    }
    if STATE
        .compare_exchange(
            FatalState::Running as u8,
            FatalState::Triggered as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_err()
    {
        park_forever();
    }

    sink_table::dispatch(record);

    advance(FatalState::Flushing);
    sink_table::flush_all();

    if stack_trace_on_fatal() {
        advance(FatalState::TraceCapture);
        let trace = Backtrace::force_capture();
        if trace.status() == BacktraceStatus::Captured {
            let text = format!("Stack trace:\n{}", trace);
            // FATAL so that every sink that saw the record also sees its trace.
            sink_table::dispatch(&LogRecord::new(Level::FATAL, record.site(), &text));
            sink_table::flush_all();
        }
    }

    advance(FatalState::CallbackInvocation);
    let handler = HANDLER.read().clone();
    if let Some(handler) = handler {
        if catch_unwind(AssertUnwindSafe(|| handler(record))).is_err() {
            eprintln!("scopelog: fatal handler panicked");
        }
        sink_table::flush_all();
    }

    advance(FatalState::Aborted);
    std::process::abort()
}

fn park_forever() -> ! {
    loop {
        std::thread::park();
    }
}

/// Drops the handler and restores the stack trace default.
///
/// The state machine itself never goes back to `Running`.
pub(crate) fn reset() {
    clear_fatal_handler();
    set_stack_trace_on_fatal(true);
}
