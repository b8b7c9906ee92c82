// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fatal path, run in child processes.
//!
//! Each `child_*` test does nothing unless `SCOPELOG_FATAL_CHILD` names it.
//! The matching parent test re-runs this test binary with that variable set,
//! filtered to the child, and inspects its exit status and its log file.

use scopelog::{FileMode, FlushPolicy, Level, Preamble, SinkOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

const CHILD_ENV: &str = "SCOPELOG_FATAL_CHILD";
const DIR_ENV: &str = "SCOPELOG_FATAL_DIR";

/// Returns the log directory if this process is running `name` as a child.
fn child_dir(name: &str) -> Option<PathBuf> {
    if std::env::var(CHILD_ENV).ok()? != name {
        return None;
    }
    std::env::var_os(DIR_ENV).map(PathBuf::from)
}

/// Two file sinks that only flush when told to, so anything in them after
/// the abort was put there by the fatal path. `quiet.log` is at `OFF` and
/// only ever sees fatal records.
fn child_setup(dir: &Path) {
    scopelog::reset();
    for (name, threshold) in [("fatal.log", Level::WARNING), ("quiet.log", Level::OFF)] {
        scopelog::add_file_sink_with(
            dir.join(name),
            FileMode::Truncate,
            SinkOptions::new(threshold)
                .preamble(Preamble::NONE)
                .flush(FlushPolicy::Manual),
        )
        .unwrap();
    }
}

struct ChildRun {
    status: ExitStatus,
    log: String,
    quiet: String,
    dir: tempfile::TempDir,
}

fn check_failures(log: &str) -> Vec<&str> {
    log.lines().filter(|l| l.starts_with("CHECK FAILED")).collect()
}

fn run_child(name: &str) -> ChildRun {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(std::env::current_exe().unwrap())
        .args([name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, name)
        .env(DIR_ENV, dir.path())
        .output()
        .unwrap();
    let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap_or_default();
    let log = read("fatal.log");
    let quiet = read("quiet.log");
    ChildRun {
        status: output.status,
        log,
        quiet,
        dir,
    }
}

#[cfg(unix)]
fn assert_aborted(status: ExitStatus) {
    use std::os::unix::process::ExitStatusExt;
    assert_eq!(status.signal(), Some(6), "expected SIGABRT, got {:?}", status);
}

#[cfg(not(unix))]
fn assert_aborted(status: ExitStatus) {
    assert!(!status.success(), "expected an abnormal exit, got {:?}", status);
}

#[test]
fn child_check_eq() {
    let Some(dir) = child_dir("child_check_eq") else {
        return;
    };
    child_setup(&dir);
    scopelog::log_f!(WARNING, "before the check");
    scopelog::check_eq_f!(3, 4);
    scopelog::log_f!(ERROR, "after the check");
}

#[test]
fn failed_check_eq_logs_once_flushes_and_aborts() {
    let run = run_child("child_check_eq");
    assert_aborted(run.status);
    assert!(run.log.contains("before the check"));
    assert!(!run.log.contains("after the check"));
    for log in [&run.log, &run.quiet] {
        assert_eq!(check_failures(log), vec!["CHECK FAILED:  3 == 4  (3 != 4)"]);
        assert!(log.contains("Stack trace:"), "{}", log);
    }
    assert!(!run.quiet.contains("before the check"));
    assert_eq!(run.quiet.lines().next(), Some("CHECK FAILED:  3 == 4  (3 != 4)"));
}

#[test]
fn child_fatal_with_callback() {
    let Some(dir) = child_dir("child_fatal_with_callback") else {
        return;
    };
    child_setup(&dir);
    scopelog::set_stack_trace_on_fatal(false);
    let marker = dir.join("callback-ran");
    scopelog::set_fatal_handler(move |record| {
        let _ = std::fs::write(&marker, record.message());
    });
    scopelog::check_f!(1 > 2, "ordering is {}", "broken");
}

#[test]
fn fatal_callback_runs_before_abort() {
    let run = run_child("child_fatal_with_callback");
    assert_aborted(run.status);
    let marker = std::fs::read_to_string(run.dir.path().join("callback-ran")).unwrap();
    assert_eq!(marker, "CHECK FAILED:  1 > 2  ordering is broken");
    assert!(!run.log.contains("Stack trace:"));
    assert_eq!(check_failures(&run.log).len(), 1);
    assert_eq!(run.quiet, "CHECK FAILED:  1 > 2  ordering is broken\n");
}

#[test]
fn child_panicking_callback() {
    let Some(dir) = child_dir("child_panicking_callback") else {
        return;
    };
    child_setup(&dir);
    scopelog::set_stack_trace_on_fatal(false);
    scopelog::set_fatal_handler(|_| panic!("crash reporter is broken"));
    scopelog::log_f!(FATAL, "giving up");
}

#[test]
fn panicking_callback_is_swallowed() {
    let run = run_child("child_panicking_callback");
    assert_aborted(run.status);
    assert_eq!(run.log.lines().filter(|l| *l == "giving up").count(), 1);
    assert_eq!(run.quiet, "giving up\n");
}

#[test]
fn child_concurrent_fatal() {
    let Some(dir) = child_dir("child_concurrent_fatal") else {
        return;
    };
    child_setup(&dir);
    scopelog::set_stack_trace_on_fatal(false);
    let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                scopelog::log_f!(FATAL, "fatal from thread {}", t);
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
}

#[test]
fn concurrent_fatals_produce_one_record() {
    let run = run_child("child_concurrent_fatal");
    assert_aborted(run.status);
    let fatal_lines = run
        .log
        .lines()
        .filter(|l| l.starts_with("fatal from thread"))
        .count();
    assert_eq!(fatal_lines, 1, "{}", run.log);
    assert_eq!(run.quiet.lines().count(), 1, "{}", run.quiet);
}

#[test]
fn child_fatal_inside_handler() {
    let Some(dir) = child_dir("child_fatal_inside_handler") else {
        return;
    };
    child_setup(&dir);
    scopelog::set_stack_trace_on_fatal(false);
    scopelog::set_fatal_handler(|_| scopelog::log_f!(FATAL, "second fatal"));
    scopelog::log_f!(FATAL, "first fatal");
}

#[test]
fn fatal_inside_handler_aborts_immediately() {
    let run = run_child("child_fatal_inside_handler");
    assert_aborted(run.status);
    assert!(run.log.contains("first fatal"));
    assert!(!run.log.contains("second fatal"));
}

#[test]
fn child_levels_below_fatal() {
    let Some(dir) = child_dir("child_levels_below_fatal") else {
        return;
    };
    child_setup(&dir);
    scopelog::set_verbosity(Level::MAX);
    scopelog::vlog_f!(-4, "louder than fatal");
    scopelog::log_f!(OFF, "off");
    {
        let site = scopelog::CallSite::new(file!(), line!());
        let _scope = scopelog::LogScope::enter(Level::OFF, site, "off scope");
    }
    scopelog::log_f!(ERROR, "still running");
    scopelog::flush();
}

#[test]
fn levels_below_fatal_log_nothing_and_return() {
    let run = run_child("child_levels_below_fatal");
    assert!(run.status.success(), "{:?}", run.status);
    assert_eq!(run.log, "still running\n");
    assert_eq!(run.quiet, "");
}

#[test]
fn fatal_state_is_running_in_a_healthy_process() {
    assert_eq!(scopelog::fatal::fatal_state(), scopelog::FatalState::Running);
}
