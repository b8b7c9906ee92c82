// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end verbosity and sink behaviour through the public macros.

use parking_lot::Mutex;
use proptest::prelude::*;
use scopelog::verbosity::{self, effective_threshold, install_overrides, parse_overrides};
use scopelog::{
    CallSite, FileMode, InMemorySink, Level, Preamble, SinkOptions, add_file_sink, add_sink,
    sink_count,
};
use std::sync::Arc;

static GUARD: Mutex<()> = Mutex::new(());

fn memory_sink(id: &str, threshold: Level) -> Arc<InMemorySink> {
    let memory = Arc::new(InMemorySink::new());
    add_sink(id, memory.clone(), SinkOptions::new(threshold));
    memory
}

#[test]
fn vlog_respects_global_verbosity() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let everything = memory_sink("everything", Level::MAX);
    let up_to_one = memory_sink("up-to-one", Level::verbose(1));
    let info_only = memory_sink("info-only", Level::INFO);

    scopelog::set_verbosity(Level::verbose(1));
    scopelog::vlog_f!(2, "x");
    assert!(everything.messages().is_empty());
    assert!(up_to_one.messages().is_empty());
    assert!(info_only.messages().is_empty());

    scopelog::vlog_f!(1, "x");
    assert_eq!(everything.messages(), vec!["x"]);
    assert_eq!(up_to_one.messages(), vec!["x"]);
    assert!(info_only.messages().is_empty());
    scopelog::reset();
}

#[test]
fn console_and_file_thresholds() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warnings.log");
    let console = memory_sink("console", Level::INFO);
    add_file_sink(&path, FileMode::Truncate, Level::WARNING).unwrap();
    console.clear();

    scopelog::log_f!(INFO, "routine");
    assert_eq!(console.messages(), vec!["routine"]);
    scopelog::log_f!(ERROR, "broken");
    assert_eq!(console.messages(), vec!["routine", "broken"]);

    scopelog::flush();
    let file = std::fs::read_to_string(&path).unwrap();
    assert!(!file.contains("routine"));
    assert_eq!(file.lines().filter(|l| l.contains("broken")).count(), 1);
    assert!(file.lines().any(|l| l.contains("ERR!") && l.ends_with("| broken")));
    scopelog::reset();
}

#[test]
fn overrides_take_precedence_over_global() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let memory = memory_sink("memory", Level::MAX);
    let (overrides, errors) = parse_overrides("scenarios=2,*.rs=-1,bad-entry");
    assert_eq!(errors.len(), 1);
    install_overrides(overrides).unwrap();

    assert_eq!(effective_threshold(file!()), Level::verbose(2));
    assert_eq!(effective_threshold("src/other.rs"), Level::WARNING);
    assert_eq!(effective_threshold("src/other.c"), Level::INFO);

    scopelog::vlog_f!(2, "from scenarios");
    scopelog::dispatch::log_message(Level::INFO, CallSite::new("src/other.rs", 3), "muted");
    assert_eq!(memory.messages(), vec!["from scenarios"]);

    assert!(matches!(
        install_overrides(Vec::new()),
        Err(scopelog::Error::OverridesFrozen)
    ));
    scopelog::reset();
}

#[test]
fn fatal_level_passes_every_threshold() {
    for threshold in [Level::OFF, Level::FATAL, Level::WARNING, Level::MAX] {
        assert!(Level::FATAL.passes(threshold));
    }
    assert!(!Level::ERROR.passes(Level::OFF));
}

#[test]
fn setting_verbosity_twice_is_idempotent() {
    let _guard = GUARD.lock();
    scopelog::reset();
    scopelog::set_verbosity(Level::verbose(3));
    let first = effective_threshold("a.rs");
    scopelog::set_verbosity(Level::verbose(3));
    assert_eq!(effective_threshold("a.rs"), first);
    assert_eq!(verbosity::verbosity(), Level::verbose(3));
    scopelog::reset();
}

#[test]
fn re_adding_a_sink_replaces_it() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let first = memory_sink("same", Level::MAX);
    let second = memory_sink("same", Level::MAX);
    assert_eq!(sink_count(), 1);
    scopelog::log_f!(INFO, "once");
    assert!(first.messages().is_empty());
    assert_eq!(second.messages(), vec!["once"]);
    scopelog::reset();
}

#[test]
fn sequential_calls_keep_their_order_at_every_sink() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let a = memory_sink("a", Level::MAX);
    let b = memory_sink("b", Level::MAX);
    for i in 0..50 {
        scopelog::log_f!(INFO, "{}", i);
    }
    let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    assert_eq!(a.messages(), expected);
    assert_eq!(b.messages(), expected);
    scopelog::reset();
}

#[test]
fn callback_sink_sees_rendered_lines() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let collected = lines.clone();
    scopelog::add_callback_sink("callback", Level::WARNING, move |record, line| {
        collected.lock().push((record.level(), line.to_string()));
        Ok(())
    });
    scopelog::log_f!(INFO, "skipped");
    scopelog::log_f!(WARNING, "kept");
    let lines = lines.lock();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, Level::WARNING);
    assert!(lines[0].1.ends_with("| kept\n"));
    scopelog::reset();
}

#[test]
fn rendered_preamble_fields() {
    let _guard = GUARD.lock();
    scopelog::reset();
    let memory = Arc::new(InMemorySink::new());
    add_sink("full", memory.clone(), SinkOptions::new(Level::MAX));
    std::thread::Builder::new()
        .name("render-check".to_string())
        .spawn(|| scopelog::vlog_f!(0, "hello"))
        .unwrap()
        .join()
        .unwrap();
    let line = &memory.lines()[0];
    assert!(line.contains("[render-check    ]"), "{}", line);
    assert!(line.contains("scenarios.rs:"), "{}", line);
    assert!(!line.contains("tests/scenarios.rs"), "{}", line);
    assert!(line.contains("INFO| hello"), "{}", line);
    assert!(!line.contains('\x1b'));

    let bare = Arc::new(InMemorySink::new());
    add_sink("bare", bare.clone(), SinkOptions::new(Level::MAX).preamble(Preamble::NONE));
    scopelog::log_f!(INFO, "plain");
    assert_eq!(bare.lines(), vec!["plain"]);
    scopelog::reset();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn emitted_iff_level_within_both_thresholds(
        global in -9i32..=9,
        sink in -9i32..=9,
        level in -2i32..=9,
    ) {
        let _guard = GUARD.lock();
        scopelog::reset();
        scopelog::set_verbosity(Level::verbose(global));
        let memory = memory_sink("prop", Level::verbose(sink));
        scopelog::dispatch::log_message(Level::verbose(level), CallSite::new("p.rs", 1), "m");
        let expected = level <= global && level <= sink;
        prop_assert_eq!(memory.messages().len(), usize::from(expected));
        scopelog::reset();
    }
}
