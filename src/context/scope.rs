// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scope handles.

use super::{pop_frame, push_frame};
use crate::dispatch::log_message;
use crate::log_record::CallSite;
use crate::verbosity::is_enabled;
use crate::Level;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// An open logging scope.
///
/// Entering an enabled scope logs `{ label`, then every record the thread logs
/// until the handle is dropped is indented one more step. Dropping the handle,
/// whether by leaving the block, returning early or unwinding, closes the
/// scope and logs `} label completed, elapsed=0.123s` at the outer
/// indentation.
///
/// If the level is disabled when the scope is entered, the handle is inert:
/// nothing is pushed and nothing is logged, on entry or on exit.
///
/// The handle refers to the current thread's stack and is therefore not `Send`.
///
/// # Example
///
/// ```rust
/// use scopelog::{CallSite, Level, LogScope};
///
/// fn load() -> usize {
///     let _scope = LogScope::enter(Level::INFO, CallSite::new(file!(), line!()), "load");
///     scopelog::current_depth()
/// }
///
/// assert_eq!(load(), 1);
/// assert_eq!(scopelog::current_depth(), 0);
/// ```
///
/// Most code uses the macros instead, which skip formatting the label when the
/// level is disabled:
///
/// ```rust
/// # let i = 3;
/// scopelog::log_scope_f!(INFO, "iteration {}", i);
/// scopelog::log_f!(INFO, "indented one step");
/// ```
#[derive(Debug)]
#[must_use = "the scope closes as soon as the handle is dropped"]
pub struct LogScope {
    active: Option<ActiveScope>,
    _not_send: PhantomData<*const ()>,
}

#[derive(Debug)]
struct ActiveScope {
    frame_id: u64,
    level: Level,
    site: CallSite,
    label: String,
    started: Instant,
}

impl LogScope {
    pub fn enter(level: Level, site: CallSite, label: impl Into<String>) -> LogScope {
        if !is_enabled(level, site.file()) {
            return LogScope::inactive();
        }
        Self::open(level, site, label.into())
    }

    /// Like [`LogScope::enter`], but only builds the label if the level is enabled.
    pub fn enter_with<F>(level: Level, site: CallSite, label: F) -> LogScope
    where
        F: FnOnce() -> String,
    {
        if !is_enabled(level, site.file()) {
            return LogScope::inactive();
        }
        Self::open(level, site, label())
    }

    /// A handle that does nothing.
    pub fn inactive() -> LogScope {
        LogScope {
            active: None,
            _not_send: PhantomData,
        }
    }

    fn open(level: Level, site: CallSite, label: String) -> LogScope {
        let started = Instant::now();
        let frame_id = push_frame(level, started);
        log_message(level, site, &format!("{{ {}", label));
        LogScope {
            active: Some(ActiveScope {
                frame_id,
                level,
                site,
                label,
                started,
            }),
            _not_send: PhantomData,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.label.as_str())
    }

    /// Time since the scope was entered, for active scopes.
    pub fn elapsed(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.started.elapsed())
    }
}

impl Drop for LogScope {
    fn drop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let elapsed = match pop_frame(active.frame_id) {
            Some(frame) => frame.started.elapsed(),
            None => {
                log_message(
                    Level::WARNING,
                    CallSite::new(file!(), line!()),
                    &format!(
                        "scope `{}` was not found on this thread's scope stack",
                        active.label
                    ),
                );
                active.started.elapsed()
            }
        };
        log_message(
            active.level,
            active.site,
            &format!(
                "}} {} completed, elapsed={:.3}s",
                active.label,
                elapsed.as_secs_f64()
            ),
        );
    }
}

/*
Boilerplate notes.

- Clone/Copy: no, a scope closes exactly once.
- PartialEq/Hash: nothing meaningful to compare.
- Default: `inactive()` exists but a Default impl would hide that the handle
  does nothing.
- Send/Sync: deliberately neither; the frame lives on the creating thread.
*/
