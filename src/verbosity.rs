// SPDX-License-Identifier: MIT OR Apache-2.0

//! The verbosity registry.
//!
//! Holds the global verbosity threshold and the per-file override table.
//! The threshold is a single atomic, so changing it from any thread is safe
//! and readers never take a lock. Overrides map file-name glob patterns to
//! their own threshold. They are installed once, usually by [`crate::init`],
//! and are read-only afterwards.
//!
//! ```
//! use scopelog::Level;
//! use scopelog::verbosity::{effective_threshold, set_verbosity};
//!
//! set_verbosity(Level::verbose(1));
//! assert_eq!(effective_threshold("src/main.rs"), Level::verbose(1));
//! ```

use crate::error::Error;
use crate::format::basename;
use crate::level::Level;
use globset::{GlobBuilder, GlobMatcher};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static GLOBAL_VERBOSITY: AtomicI32 = AtomicI32::new(0);
static HAS_OVERRIDES: AtomicBool = AtomicBool::new(false);
static OVERRIDES_INSTALLED: AtomicBool = AtomicBool::new(false);
/// Sorted longest pattern first; equal lengths keep registration order.
static OVERRIDES: RwLock<Vec<VerbosityOverride>> = RwLock::new(Vec::new());

/// A `pattern=level` entry.
///
/// The pattern is a glob. It is tried against the full source path, then the
/// basename, then the basename without its extension, so `net*`,
/// `socket.rs` and `src/net/*.rs` all match `src/net/socket.rs`.
#[derive(Debug, Clone)]
pub struct VerbosityOverride {
    pattern: String,
    level: Level,
    matcher: GlobMatcher,
}

impl VerbosityOverride {
    pub fn new(pattern: &str, level: Level) -> Result<Self, Error> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();
        Ok(Self {
            pattern: pattern.to_string(),
            level,
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn matches(&self, file: &str) -> bool {
        if self.matcher.is_match(Path::new(file)) {
            return true;
        }
        let base = basename(file);
        if self.matcher.is_match(base) {
            return true;
        }
        match base.rsplit_once('.') {
            Some((stem, _)) => self.matcher.is_match(stem),
            None => false,
        }
    }
}

/// Parses one `pattern=level` entry.
pub fn parse_override(entry: &str) -> Result<VerbosityOverride, Error> {
    let (pattern, level) = entry
        .split_once('=')
        .ok_or_else(|| Error::MalformedOverride(entry.to_string()))?;
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(Error::MalformedOverride(entry.to_string()));
    }
    let level: Level = level.parse()?;
    VerbosityOverride::new(pattern, level)
}

/// Parses a comma-separated list such as `net*=2,db.rs=-1`.
///
/// Valid entries and errors for malformed ones are returned side by side so
/// the caller can install the former and warn about the latter.
pub fn parse_overrides(list: &str) -> (Vec<VerbosityOverride>, Vec<Error>) {
    parse_override_list(list.split(','))
}

pub fn parse_override_list<I, S>(entries: I) -> (Vec<VerbosityOverride>, Vec<Error>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }
        match parse_override(entry) {
            Ok(o) => parsed.push(o),
            Err(e) => errors.push(e),
        }
    }
    (parsed, errors)
}

/// Installs the per-file override table.
///
/// The table is frozen once installed; a second call fails with
/// [`Error::OverridesFrozen`] and leaves the first table in place.
pub fn install_overrides(mut overrides: Vec<VerbosityOverride>) -> Result<(), Error> {
    if OVERRIDES_INSTALLED.swap(true, Ordering::AcqRel) {
        return Err(Error::OverridesFrozen);
    }
    overrides.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
    let has_any = !overrides.is_empty();
    *OVERRIDES.write() = overrides;
    HAS_OVERRIDES.store(has_any, Ordering::Release);
    Ok(())
}

/// The installed overrides, in evaluation order.
pub fn overrides() -> Vec<(String, Level)> {
    OVERRIDES
        .read()
        .iter()
        .map(|o| (o.pattern.clone(), o.level))
        .collect()
}

/// Sets the global threshold. Last write wins.
#[inline]
pub fn set_verbosity(level: Level) {
    GLOBAL_VERBOSITY.store(level.value(), Ordering::Relaxed);
}

#[inline]
pub fn verbosity() -> Level {
    Level::verbose(GLOBAL_VERBOSITY.load(Ordering::Relaxed))
}

/// The threshold that applies to records from `file`.
pub fn effective_threshold(file: &str) -> Level {
    if HAS_OVERRIDES.load(Ordering::Acquire) {
        let overrides = OVERRIDES.read();
        if let Some(o) = overrides.iter().find(|o| o.matches(file)) {
            return o.level;
        }
    }
    verbosity()
}

/// Whether a record at `level` from `file` should be built at all.
///
/// This is the cheap check call sites make before formatting anything.
#[inline]
pub fn is_enabled(level: Level, file: &str) -> bool {
    level.passes(effective_threshold(file))
}

pub(crate) fn reset() {
    set_verbosity(Level::INFO);
    OVERRIDES.write().clear();
    HAS_OVERRIDES.store(false, Ordering::Release);
    OVERRIDES_INSTALLED.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TEST_GUARD;

    #[test]
    fn global_threshold() {
        let _guard = TEST_GUARD.lock();
        reset();
        set_verbosity(Level::verbose(1));
        assert!(is_enabled(Level::verbose(1), "a.rs"));
        assert!(!is_enabled(Level::verbose(2), "a.rs"));
        set_verbosity(Level::verbose(1));
        assert_eq!(effective_threshold("a.rs"), Level::verbose(1));
        reset();
    }

    #[test]
    fn fatal_is_always_enabled() {
        let _guard = TEST_GUARD.lock();
        reset();
        set_verbosity(Level::OFF);
        assert!(is_enabled(Level::FATAL, "a.rs"));
        assert!(!is_enabled(Level::ERROR, "a.rs"));
        reset();
    }

    #[test]
    fn longest_pattern_wins() {
        let _guard = TEST_GUARD.lock();
        reset();
        let (parsed, errors) = parse_overrides("net*=1,network_socket*=3");
        assert!(errors.is_empty());
        install_overrides(parsed).unwrap();
        assert_eq!(
            effective_threshold("src/network_socket.rs"),
            Level::verbose(3)
        );
        assert_eq!(effective_threshold("src/net.rs"), Level::verbose(1));
        assert_eq!(effective_threshold("src/db.rs"), Level::INFO);
        reset();
    }

    #[test]
    fn ties_go_to_first_registered() {
        let _guard = TEST_GUARD.lock();
        reset();
        let (parsed, _) = parse_overrides("db*=2,*rs=4");
        install_overrides(parsed).unwrap();
        assert_eq!(effective_threshold("db.rs"), Level::verbose(2));
        reset();
    }

    #[test]
    fn overrides_are_frozen() {
        let _guard = TEST_GUARD.lock();
        reset();
        install_overrides(parse_overrides("a=1").0).unwrap();
        let second = install_overrides(parse_overrides("b=2").0);
        assert!(matches!(second, Err(Error::OverridesFrozen)));
        assert_eq!(overrides(), vec![("a".to_string(), Level::verbose(1))]);
        reset();
    }

    #[test]
    fn malformed_entries_are_reported_not_fatal() {
        let (parsed, errors) = parse_overrides("good=1,noequals,=2,bad=loud,[=1");
        assert_eq!(parsed.len(), 1);
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], Error::MalformedOverride(_)));
        assert!(matches!(errors[2], Error::InvalidLevel(_)));
        assert!(matches!(errors[3], Error::InvalidPattern { .. }));
    }

    #[test]
    fn pattern_matches_path_basename_or_stem() {
        let o = VerbosityOverride::new("socket", Level::verbose(2)).unwrap();
        assert!(o.matches("src/net/socket.rs"));
        let o = VerbosityOverride::new("src/net/*.rs", Level::verbose(2)).unwrap();
        assert!(o.matches("src/net/socket.rs"));
        assert!(!o.matches("src/db/socket.rs"));
    }
}
