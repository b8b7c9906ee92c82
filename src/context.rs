// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-local logging context.
//!
//! Every thread owns one context holding its display name and its stack of
//! active scopes. Records read both when they are built: the name goes into
//! the preamble and the stack depth becomes the indentation. Nothing here is
//! shared between threads, so none of it is locked.
//!
//! # Thread names
//!
//! ```rust
//! std::thread::spawn(|| {
//!     scopelog::set_thread_name("renderer");
//!     assert_eq!(&*scopelog::thread_name(), "renderer");
//! })
//! .join()
//! .unwrap();
//! ```
//!
//! Names are cut to [`MAX_THREAD_NAME_LEN`] characters. A thread that never
//! sets a name uses its `std::thread` name if it has one, and otherwise a
//! small number unique to the process.
//!
//! # Scopes
//!
//! ```rust
//! use scopelog::{CallSite, Level, LogScope};
//!
//! assert_eq!(scopelog::current_depth(), 0);
//! {
//!     let _scope = LogScope::enter(Level::INFO, CallSite::new(file!(), line!()), "loading");
//!     assert_eq!(scopelog::current_depth(), 1);
//! }
//! assert_eq!(scopelog::current_depth(), 0);
//! ```

mod scope;


pub use scope::LogScope;

use crate::Level;
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Longest thread name kept, in characters.
pub const MAX_THREAD_NAME_LEN: usize = 16;

static NEXT_THREAD_NUMBER: AtomicU64 = AtomicU64::new(1);
static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// One live scope on a thread's stack.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) id: u64,
    pub(crate) level: Level,
    pub(crate) started: Instant,
}

#[derive(Debug, Default)]
struct ThreadContext {
    name: Option<Arc<str>>,
    frames: Vec<Frame>,
}

impl ThreadContext {
    fn name(&mut self) -> Arc<str> {
        self.name.get_or_insert_with(default_name).clone()
    }
}

thread_local! {
    static CONTEXT: RefCell<ThreadContext> = RefCell::new(ThreadContext::default());
}

fn default_name() -> Arc<str> {
    match std::thread::current().name() {
        Some(name) => truncate_name(name),
        None => {
            let n = NEXT_THREAD_NUMBER.fetch_add(1, Ordering::Relaxed);
            Arc::from(n.to_string())
        }
    }
}

fn truncate_name(name: &str) -> Arc<str> {
    match name.char_indices().nth(MAX_THREAD_NAME_LEN) {
        Some((idx, _)) => Arc::from(&name[..idx]),
        None => Arc::from(name),
    }
}

/// Names the calling thread in every record it logs from now on.
pub fn set_thread_name(name: &str) {
    let name = truncate_name(name);
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().name = Some(name));
}

/// The calling thread's display name.
pub fn thread_name() -> Arc<str> {
    CONTEXT
        .try_with(|ctx| ctx.borrow_mut().name())
        .unwrap_or_else(|_| default_name())
}

/// Number of scopes currently open on the calling thread.
pub fn current_depth() -> usize {
    CONTEXT
        .try_with(|ctx| ctx.borrow().frames.len())
        .unwrap_or(0)
}

/// Name and depth in one borrow, for building records.
pub(crate) fn snapshot() -> (Arc<str>, usize) {
    CONTEXT
        .try_with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            let depth = ctx.frames.len();
            (ctx.name(), depth)
        })
        .unwrap_or_else(|_| (default_name(), 0))
}

/// Pushes a frame and returns its id.
pub(crate) fn push_frame(level: Level, started: Instant) -> u64 {
    let id = NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed);
    let _ = CONTEXT.try_with(|ctx| {
        ctx.borrow_mut().frames.push(Frame { id, level, started })
    });
    id
}

/// Removes the frame with `id`.
///
/// Usually that is the innermost frame. If scopes were released out of order
/// the frame is found further down and removed on its own, leaving the frames
/// above it in place. Returns `None` if the frame is not on this thread's stack.
pub(crate) fn pop_frame(id: u64) -> Option<Frame> {
    CONTEXT
        .try_with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            let pos = ctx.frames.iter().rposition(|f| f.id == id)?;
            Some(ctx.frames.remove(pos))
        })
        .ok()
        .flatten()
}

/// Levels of the open scopes, outermost first.
pub fn scope_levels() -> Vec<Level> {
    CONTEXT
        .try_with(|ctx| ctx.borrow().frames.iter().map(|f| f.level).collect())
        .unwrap_or_default()
}
