//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# scopelog

scopelog is a leveled logging library for Rust with scoped indentation,
multiple output sinks and a deterministic fatal path.

# Development status

scopelog is experimental and the API may change.

# Levels

Levels are integers. Smaller is more important:

| Name    | Value | Tag    | Meaning                                          |
|---------|-------|--------|--------------------------------------------------|
| OFF     | -9    |        | as a threshold, suppresses everything but FATAL  |
| FATAL   | -3    | `FATL` | logs, flushes every sink, then aborts            |
| ERROR   | -2    | `ERR!` | something failed                                 |
| WARNING | -1    | `WARN` | something looks wrong                            |
| INFO    | 0     | `INFO` | the default threshold                            |
| 1..=9   | n     | `V{n}` | increasingly chatty detail, off by default       |

A record is kept if its level is at most the threshold. FATAL is always kept.
The global threshold can be changed at any time, and per-file overrides
(`--vmodule=net*=2,db=-1`) give individual source files their own threshold.

# The API

```rust
# let port = 8080;
scopelog::log_f!(INFO, "listening on {}", port);
scopelog::log_s!(WARNING, "port ", port, " is privileged");
scopelog::vlog_f!(1, "shown with -v 1 or more");
```

Disabled calls do not evaluate their arguments.

# Scopes

A scope logs `{ label` when it opens and `} label completed, elapsed=...`
when its handle is dropped. Records logged in between are indented by one
`". "` per open scope. Scopes are per thread.

```rust
fn load(path: &str) {
    scopelog::log_scope_f!(INFO, "load {}", path);
    scopelog::log_f!(INFO, "parsing");
}
# load("a.toml");
```

# Sinks

Every record that passes the threshold is rendered and written to each
registered sink whose own threshold admits it. The process starts with one
sink, `"stderr"`. Files, in-memory buffers and closures can be added:

```rust
use scopelog::{FileMode, InMemorySink, Level, SinkOptions};
use std::sync::Arc;

let memory = Arc::new(InMemorySink::new());
scopelog::add_sink("memory", memory.clone(), SinkOptions::new(Level::WARNING));
# let dir = tempfile::tempdir().unwrap();
scopelog::add_file_sink(dir.path().join("all.log"), FileMode::Truncate, Level::MAX).unwrap();
```

# Fatal

`log_f!(FATAL, ..)` and failed `check_*` macros write the record to every
sink, flush them, write a stack trace, run the fatal handler and abort. See
[`fatal`].

# Multithreading

Every thread has its own name and scope stack. Sinks are shared, and records
from all threads reach every sink in one global order.
*/

mod callback_sink;
pub mod check;
mod console_sink;
pub mod context;
pub mod dispatch;
mod error;
pub mod fatal;
mod file_sink;
pub mod format;
mod inmemory_sink;
mod level;
mod log_record;
mod macros;
mod options;
mod sink;
pub mod sink_table;
mod stream;
pub mod verbosity;

pub use callback_sink::{CallbackSink, add_callback_sink};
pub use console_sink::{CONSOLE_SINK_ID, ColorMode, ConsoleSink};
pub use context::{LogScope, current_depth, set_thread_name, thread_name};
pub use error::Error;
pub use fatal::{FatalState, clear_fatal_handler, set_fatal_handler, set_stack_trace_on_fatal};
pub use file_sink::{FileMode, FileSink, add_file_sink, add_file_sink_with};
pub use format::Preamble;
pub use inmemory_sink::{CapturedRecord, InMemorySink};
pub use level::Level;
pub use log_record::{CallSite, LogRecord};
pub use options::{Options, init, shutdown};
pub use sink::{FlushPolicy, Sink, SinkId, SinkOptions};
pub use sink_table::{add_sink, remove_all_sinks, remove_sink, sink_count};
pub use stream::{Loggable, MessageStream};
pub use verbosity::{is_enabled, set_verbosity};

/// Flushes every sink.
pub fn flush() {
    sink_table::flush_all();
}

/**
Returns the process to a clean slate, for tests.

Verbosity goes back to INFO, overrides are dropped (and may be installed
again), every sink is flushed and removed (the console sink included), the
fatal handler is cleared and stack traces on fatal are re-enabled.
*/
pub fn reset() {
    verbosity::reset();
    sink_table::reset();
    fatal::reset();
}

#[doc(hidden)]
pub mod hidden {
    const HELPER: &str = "::__scopelog_here";

    /// Turns the type name of the helper fn in `function_name!` into the
    /// path of the function around it.
    pub fn function_name(helper: &'static str) -> &'static str {
        let mut name = helper.strip_suffix(HELPER).unwrap_or(helper);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }

    pub fn short_function_name(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Held by unit tests that touch process-wide state.
    pub static TEST_GUARD: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
}
