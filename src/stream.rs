// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream-style message building.
//!
//! [`MessageStream`] concatenates values into a message, one after another,
//! each rendered by its [`Loggable`] impl. For every type implemented here the
//! rendering is exactly what `format!("{}", value)` produces (`Duration`
//! aside, which has no `Display` and uses `{:?}`), so
//! `log_s!(INFO, "took ", n, " tries")` and `log_f!(INFO, "took {} tries", n)`
//! log the same message.
//!
//! ```rust
//! use scopelog::MessageStream;
//!
//! let stream = MessageStream::new() << "x=" << 3 << ", ok=" << true;
//! assert_eq!(stream.as_str(), "x=3, ok=true");
//! ```

use std::borrow::Cow;
use std::fmt::{Display, Write};
use std::ops::Shl;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A value that can be appended to a [`MessageStream`].
pub trait Loggable {
    /**
    Appends the value's text to `stream`.

    When implementing this, use of `#[inline]` is recommended.
    */
    fn log_to(&self, stream: &mut MessageStream);
}

/// A message under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MessageStream {
    buf: String,
}

impl MessageStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn append<T: Loggable + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.log_to(self);
        self
    }

    /// Appends text as-is.
    #[inline]
    pub fn write(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    #[inline]
    fn write_display<T: Display + ?Sized>(&mut self, value: &T) {
        let _ = write!(self.buf, "{}", value);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_message(self) -> String {
        self.buf
    }
}

impl Display for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buf)
    }
}

impl<T: Loggable> Shl<T> for MessageStream {
    type Output = MessageStream;

    fn shl(mut self, value: T) -> MessageStream {
        value.log_to(&mut self);
        self
    }
}

macro_rules! loggable_via_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl Loggable for $t {
                #[inline]
                fn log_to(&self, stream: &mut MessageStream) {
                    stream.write_display(self);
                }
            }
        )*
    };
}

loggable_via_display!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
    crate::Level,
);

impl Loggable for str {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write(self);
    }
}

impl Loggable for String {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write(self);
    }
}

impl Loggable for Cow<'_, str> {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write(self);
    }
}

impl Loggable for Arc<str> {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write(self);
    }
}

impl Loggable for std::fmt::Arguments<'_> {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write_display(self);
    }
}

/**
Paths render like `Path::display`.
*/
impl Loggable for Path {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        stream.write_display(&self.display());
    }
}

impl Loggable for PathBuf {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        self.as_path().log_to(stream);
    }
}

/**
Durations have no `Display`; they render like `{:?}`, e.g. `1.5s`.
*/
impl Loggable for Duration {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        let _ = write!(stream.buf, "{:?}", self);
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        (**self).log_to(stream);
    }
}

impl<T: Loggable + ?Sized> Loggable for Box<T> {
    #[inline]
    fn log_to(&self, stream: &mut MessageStream) {
        (**self).log_to(stream);
    }
}
