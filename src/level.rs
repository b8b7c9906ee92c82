// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log levels.
//!
//! A [`Level`] is a signed verbosity value. Larger values are more verbose:
//! named levels sit at or below zero, and `verbose(n)` levels count up from 1.
//! A record passes a threshold when its level is less than or equal to it.
//!
//! Values below FATAL, such as [`Level::OFF`], only make sense as thresholds.
//! A record at one of them passes nothing and is never fatal.

use crate::error::Error;
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    /// Threshold that disables everything except fatal records.
    pub const OFF: Level = Level(-9);
    /// Logged, flushed, then the process aborts.
    pub const FATAL: Level = Level(-3);
    pub const ERROR: Level = Level(-2);
    pub const WARNING: Level = Level(-1);
    /// The baseline level; the default threshold.
    pub const INFO: Level = Level(0);
    /// The most verbose level anyone should use.
    pub const MAX: Level = Level(9);

    /// A verbose level. `verbose(0)` is [`Level::INFO`].
    #[inline]
    pub const fn verbose(n: i32) -> Level {
        Level(n)
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Fatal records always pass every threshold and terminate the process.
    #[inline]
    pub const fn is_fatal(self) -> bool {
        self.0 == Level::FATAL.0
    }

    /// Whether a record at this level passes `threshold`.
    ///
    /// Levels below FATAL never pass.
    #[inline]
    pub const fn passes(self, threshold: Level) -> bool {
        self.is_fatal() || (self.0 > Level::FATAL.0 && self.0 <= threshold.0)
    }

    /// The fixed-width tag shown in the preamble.
    pub fn tag(self) -> Cow<'static, str> {
        match self {
            Level::FATAL => Cow::Borrowed("FATL"),
            Level::ERROR => Cow::Borrowed("ERR!"),
            Level::WARNING => Cow::Borrowed("WARN"),
            Level::INFO => Cow::Borrowed("INFO"),
            Level::OFF => Cow::Borrowed("OFF"),
            Level(n) if n > 0 => Cow::Owned(format!("V{}", n)),
            Level(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Level::FATAL => f.write_str("FATAL"),
            Level::ERROR => f.write_str("ERROR"),
            Level::WARNING => f.write_str("WARNING"),
            Level::INFO => f.write_str("INFO"),
            Level::OFF => f.write_str("OFF"),
            Level(n) => write!(f, "{}", n),
        }
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "OFF" => Ok(Level::OFF),
            "FATAL" => Ok(Level::FATAL),
            "ERROR" => Ok(Level::ERROR),
            "WARNING" | "WARN" => Ok(Level::WARNING),
            "INFO" => Ok(Level::INFO),
            _ => trimmed
                .parse::<i32>()
                .map(Level)
                .map_err(|_| Error::InvalidLevel(s.to_string())),
        }
    }
}
