// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::log_record::LogRecord;
use crate::sink::{Sink, SinkOptions};
use is_terminal::IsTerminal;
use std::io::Write;
use std::sync::Arc;

/// Id of the console sink registered by default.
pub const CONSOLE_SINK_ID: &str = "stderr";

/// Whether the console sink colours its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Colour when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(self) -> bool {
        match self {
            ColorMode::Auto => std::io::stderr().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/**
A sink that writes to stderr.
 */
#[derive(Debug, Clone)]
pub struct ConsoleSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone: derived, zero-sized
// - Copy: implemented, zero-sized
// - PartialEq/Eq/Hash: all instances are equivalent
// - Default: implemented
// - Display: not implemented, nothing meaningful to show

impl Copy for ConsoleSink {}

impl PartialEq for ConsoleSink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ConsoleSink {}

impl std::hash::Hash for ConsoleSink {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    pub const fn new() -> Self {
        Self {}
    }

    /// The sink and options the sink table starts with.
    pub(crate) fn default_registration() -> (Arc<dyn Sink>, SinkOptions) {
        (
            Arc::new(ConsoleSink::new()),
            SinkOptions::new(Level::MAX).color(ColorMode::Auto.resolve()),
        )
    }
}

impl Sink for ConsoleSink {
    fn write(&self, _record: &LogRecord<'_>, rendered: &str) -> std::io::Result<()> {
        let mut lock = std::io::stderr().lock();
        lock.write_all(rendered.as_bytes())
    }

    fn flush(&self) -> std::io::Result<()> {
        std::io::stderr().lock().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_modes() {
        assert!(ColorMode::Always.resolve());
        assert!(!ColorMode::Never.resolve());
    }

    #[test]
    fn writes_without_error() {
        let record = LogRecord::new(Level::INFO, crate::CallSite::new("a.rs", 1), "to stderr");
        let sink = ConsoleSink::new();
        sink.write(&record, "console sink test line\n").unwrap();
        sink.flush().unwrap();
    }
}
