// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging macros.
//!
//! Levels are written as bare names: `FATAL`, `ERROR`, `WARNING`, `INFO`, or
//! `MAX`. `OFF` is accepted and logs nothing. Verbose levels go through the
//! `vlog_*` forms, which take a number. Every macro checks
//! [`crate::is_enabled`] before evaluating its arguments, so a disabled call
//! costs a threshold lookup and nothing else.
//!
//! Records carry the path of the function they were logged from.
//!
//! There are two message styles. The `_f` macros take `format!`-style
//! arguments, the `_s` macros take a list of values that are concatenated by
//! their [`crate::Loggable`] impls. Both produce the same text for the same
//! values.
//!
//! ```rust
//! let retries = 3;
//! scopelog::log_f!(INFO, "retrying {} times", retries);
//! scopelog::log_s!(INFO, "retrying ", retries, " times");
//! scopelog::vlog_f!(2, "only with -v 2 or more");
//! scopelog::log_if_f!(WARNING, retries > 2, "many retries");
//! ```

/// Logs `format!`-style arguments at a named level.
///
/// ```rust
/// scopelog::log_f!(WARNING, "disk {}% full", 93);
/// ```
#[macro_export]
macro_rules! log_f {
    ($level:ident, $($arg:tt)+) => {
        $crate::__log_f!($crate::Level::$level, $($arg)+)
    };
}

/// Logs `format!`-style arguments at verbose level `n`.
#[macro_export]
macro_rules! vlog_f {
    ($verbosity:expr, $($arg:tt)+) => {
        $crate::__log_f!($crate::Level::verbose($verbosity), $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_f {
    ($level:expr, $($arg:tt)+) => {{
        let level: $crate::Level = $level;
        if $crate::is_enabled(level, ::core::file!()) {
            $crate::dispatch::log_args_unchecked(
                level,
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::format_args!($($arg)+),
            );
        }
    }};
}

/// [`log_f!`] guarded by a condition. The arguments are only evaluated when
/// the condition holds and the level is enabled.
#[macro_export]
macro_rules! log_if_f {
    ($level:ident, $cond:expr, $($arg:tt)+) => {
        if $cond {
            $crate::log_f!($level, $($arg)+)
        }
    };
}

#[macro_export]
macro_rules! vlog_if_f {
    ($verbosity:expr, $cond:expr, $($arg:tt)+) => {
        if $cond {
            $crate::vlog_f!($verbosity, $($arg)+)
        }
    };
}

/// Logs a line with no preamble and no indentation.
///
/// ```rust
/// scopelog::raw_log_f!(INFO, "+--------+");
/// ```
#[macro_export]
macro_rules! raw_log_f {
    ($level:ident, $($arg:tt)+) => {{
        let level = $crate::Level::$level;
        if $crate::is_enabled(level, ::core::file!()) {
            $crate::dispatch::raw_log_args_unchecked(
                level,
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::format_args!($($arg)+),
            );
        }
    }};
}

/// Logs the concatenation of values at a named level.
///
/// ```rust
/// let path = std::path::Path::new("/etc/app.toml");
/// scopelog::log_s!(INFO, "loaded ", path, " in ", std::time::Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_s {
    ($level:ident, $($value:expr),+ $(,)?) => {
        $crate::__log_s!($crate::Level::$level, $($value),+)
    };
}

#[macro_export]
macro_rules! vlog_s {
    ($verbosity:expr, $($value:expr),+ $(,)?) => {
        $crate::__log_s!($crate::Level::verbose($verbosity), $($value),+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_s {
    ($level:expr, $($value:expr),+) => {{
        let level: $crate::Level = $level;
        if $crate::is_enabled(level, ::core::file!()) {
            let mut stream = $crate::MessageStream::new();
            $( stream.append(&$value); )+
            $crate::dispatch::log_stream_unchecked(
                level,
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                &stream,
            );
        }
    }};
}

#[macro_export]
macro_rules! log_if_s {
    ($level:ident, $cond:expr, $($value:expr),+ $(,)?) => {
        if $cond {
            $crate::log_s!($level, $($value),+)
        }
    };
}

#[macro_export]
macro_rules! vlog_if_s {
    ($verbosity:expr, $cond:expr, $($value:expr),+ $(,)?) => {
        if $cond {
            $crate::vlog_s!($verbosity, $($value),+)
        }
    };
}

/// Whether a named level is enabled for the calling file.
///
/// ```rust
/// if scopelog::is_enabled!(INFO) {
///     // compute something expensive to log
/// }
/// ```
#[macro_export]
macro_rules! is_enabled {
    ($level:ident) => {
        $crate::is_enabled($crate::Level::$level, ::core::file!())
    };
}

/// Whether verbose level `n` is enabled for the calling file.
#[macro_export]
macro_rules! vlog_is_on {
    ($verbosity:expr) => {
        $crate::is_enabled($crate::Level::verbose($verbosity), ::core::file!())
    };
}

/**
Opens a scope that lasts until the end of the enclosing block.

The label uses `format!` syntax and is only formatted if the level is enabled.

```rust
fn parse() {
    scopelog::log_scope_f!(INFO, "parsing {}", "config.toml");
    scopelog::log_f!(INFO, "one step deeper");
} // logs "} parsing config.toml completed, elapsed=..."
# parse();
```
*/
#[macro_export]
macro_rules! log_scope_f {
    ($level:ident, $($arg:tt)+) => {
        let _scopelog_scope = $crate::LogScope::enter_with(
            $crate::Level::$level,
            $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
            || ::std::format!($($arg)+),
        );
    };
}

#[macro_export]
macro_rules! vlog_scope_f {
    ($verbosity:expr, $($arg:tt)+) => {
        let _scopelog_scope = $crate::LogScope::enter_with(
            $crate::Level::verbose($verbosity),
            $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
            || ::std::format!($($arg)+),
        );
    };
}

/// Opens a scope labelled with the enclosing function's name.
///
/// ```rust
/// fn compile() {
///     scopelog::log_scope_function!(INFO); // "{ compile"
/// }
/// # compile();
/// ```
#[macro_export]
macro_rules! log_scope_function {
    ($level:ident) => {
        let _scopelog_scope = {
            let function = $crate::function_name!();
            $crate::LogScope::enter_with(
                $crate::Level::$level,
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function(function),
                || ::std::string::ToString::to_string($crate::hidden::short_function_name(function)),
            )
        };
    };
}

/// The path of the enclosing function, as a `&'static str`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __scopelog_here() {}
        $crate::hidden::function_name(::core::any::type_name_of_val(&__scopelog_here))
    }};
}

/**
Aborts with a FATAL record if the condition is false.

```no_run
scopelog::check_f!(1 + 1 == 3, "arithmetic is broken");
```
*/
#[macro_export]
macro_rules! check_f {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::check::check_failed(
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::stringify!($cond),
                ::core::option::Option::None,
            )
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::check::check_failed(
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::stringify!($cond),
                ::core::option::Option::Some(::core::format_args!($($arg)+)),
            )
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_op {
    ($op:tt, $left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left $op *right) {
                    $crate::check::check_op_failed(
                        $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                        ::core::stringify!($left),
                        ::core::stringify!($op),
                        ::core::stringify!($right),
                        left,
                        right,
                        ::core::option::Option::None,
                    )
                }
            }
        }
    };
    ($op:tt, $left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left $op *right) {
                    $crate::check::check_op_failed(
                        $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                        ::core::stringify!($left),
                        ::core::stringify!($op),
                        ::core::stringify!($right),
                        left,
                        right,
                        ::core::option::Option::Some(::core::format_args!($($arg)+)),
                    )
                }
            }
        }
    };
}

/// Aborts unless `left == right`, printing both values.
#[macro_export]
macro_rules! check_eq_f {
    ($($args:tt)+) => { $crate::__check_op!(==, $($args)+) };
}

#[macro_export]
macro_rules! check_ne_f {
    ($($args:tt)+) => { $crate::__check_op!(!=, $($args)+) };
}

#[macro_export]
macro_rules! check_lt_f {
    ($($args:tt)+) => { $crate::__check_op!(<, $($args)+) };
}

#[macro_export]
macro_rules! check_le_f {
    ($($args:tt)+) => { $crate::__check_op!(<=, $($args)+) };
}

#[macro_export]
macro_rules! check_gt_f {
    ($($args:tt)+) => { $crate::__check_op!(>, $($args)+) };
}

#[macro_export]
macro_rules! check_ge_f {
    ($($args:tt)+) => { $crate::__check_op!(>=, $($args)+) };
}

/// Unwraps an `Option`, aborting with a FATAL record on `None`.
///
/// ```rust
/// let port: u16 = scopelog::check_some_f!("8080".parse().ok(), "bad port");
/// assert_eq!(port, 8080);
/// ```
#[macro_export]
macro_rules! check_some_f {
    ($opt:expr $(,)?) => {
        match $opt {
            ::core::option::Option::Some(value) => value,
            ::core::option::Option::None => $crate::check::check_failed(
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::concat!(::core::stringify!($opt), " is Some"),
                ::core::option::Option::None,
            ),
        }
    };
    ($opt:expr, $($arg:tt)+) => {
        match $opt {
            ::core::option::Option::Some(value) => value,
            ::core::option::Option::None => $crate::check::check_failed(
                $crate::CallSite::new(::core::file!(), ::core::line!()).with_function($crate::function_name!()),
                ::core::concat!(::core::stringify!($opt), " is Some"),
                ::core::option::Option::Some(::core::format_args!($($arg)+)),
            ),
        }
    };
}

/// [`check_f!`] in debug builds only. Release builds still type-check the
/// condition but never evaluate it.
#[macro_export]
macro_rules! dcheck_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_eq_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_eq_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_ne_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_ne_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_lt_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_lt_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_le_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_le_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_gt_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_gt_f!($($args)+)
        }
    };
}

#[macro_export]
macro_rules! dcheck_ge_f {
    ($($args:tt)+) => {
        if ::core::cfg!(debug_assertions) {
            $crate::check_ge_f!($($args)+)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::test_support::TEST_GUARD;
    use crate::{InMemorySink, Level, SinkOptions};
    use std::cell::Cell;
    use std::sync::Arc;

    fn capture(f: impl FnOnce()) -> Vec<crate::CapturedRecord> {
        let _guard = TEST_GUARD.lock();
        crate::reset();
        let memory = Arc::new(InMemorySink::new());
        crate::add_sink("macros", memory.clone(), SinkOptions::default());
        f();
        crate::reset();
        memory.records()
    }

    #[test]
    fn format_and_stream_styles_agree() {
        let records = capture(|| {
            let n = 7;
            log_f!(INFO, "n={} ok={}", n, true);
            log_s!(INFO, "n=", n, " ok=", true);
        });
        assert_eq!(records[0].message, "n=7 ok=true");
        assert_eq!(records[1].message, records[0].message);
        assert_eq!(records[0].file, file!());
        for record in &records {
            assert_eq!(
                record.function.as_deref(),
                Some("scopelog::macros::tests::format_and_stream_styles_agree")
            );
        }
    }

    #[test]
    fn disabled_arguments_are_not_evaluated() {
        let evaluated = Cell::new(0);
        let bump = || {
            evaluated.set(evaluated.get() + 1);
            1
        };
        let records = capture(|| {
            vlog_f!(3, "{}", bump());
            vlog_s!(3, bump());
            log_if_f!(INFO, false, "{}", bump());
            log_if_s!(ERROR, true, "kept ", bump());
            vlog_if_f!(0, true, "also kept {}", bump());
            vlog_if_s!(1, true, bump());
        });
        assert_eq!(evaluated.get(), 2);
        let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["kept 1", "also kept 1"]);
    }

    #[test]
    fn enabled_queries() {
        let _guard = TEST_GUARD.lock();
        crate::reset();
        assert!(is_enabled!(INFO));
        assert!(is_enabled!(FATAL));
        assert!(!vlog_is_on!(1));
        crate::set_verbosity(Level::verbose(1));
        assert!(vlog_is_on!(1));
        crate::reset();
    }

    #[test]
    fn scope_macros_indent_until_block_end() {
        let records = capture(|| {
            log_scope_f!(INFO, "outer {}", 1);
            {
                vlog_scope_f!(0, "inner");
                log_f!(INFO, "deep");
            }
            raw_log_f!(INFO, "raw");
        });
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.depth, r.message.split(" completed").next().unwrap_or("").to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "{ outer 1".to_string()),
                (2, "{ inner".to_string()),
                (2, "deep".to_string()),
                (1, "} inner".to_string()),
                (1, "raw".to_string()),
                (0, "} outer 1".to_string()),
            ]
        );
    }

    #[test]
    fn scope_function_uses_the_function_name() {
        fn compile_unit() {
            log_scope_function!(INFO);
        }
        let records = capture(compile_unit);
        assert_eq!(records[0].message, "{ compile_unit");
        assert!(records[1].message.starts_with("} compile_unit completed, elapsed="));
    }

    #[test]
    fn function_name_strips_the_helper() {
        let name = function_name!();
        assert!(name.ends_with("function_name_strips_the_helper"), "{}", name);
    }

    #[test]
    fn passing_checks_are_silent() {
        let records = capture(|| {
            check_f!(1 + 1 == 2);
            check_f!(true, "with {}", "message");
            check_eq_f!(2, 2);
            check_ne_f!(1, 2, "ne {}", 0);
            check_lt_f!(1, 2);
            check_le_f!(2, 2);
            check_gt_f!(3, 2);
            check_ge_f!(3, 3);
            let value = check_some_f!(Some(5));
            check_eq_f!(value, 5);
            check_eq_f!(String::from("a"), "a");
            dcheck_f!(true);
            dcheck_eq_f!(1, 1);
            dcheck_ne_f!(1, 2);
            dcheck_lt_f!(1, 2);
            dcheck_le_f!(1, 1);
            dcheck_gt_f!(2, 1);
            dcheck_ge_f!(2, 2);
        });
        assert!(records.is_empty());
    }
}
