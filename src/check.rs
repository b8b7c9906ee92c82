// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure paths of the `check_*` macros.
//!
//! A failed check logs one FATAL record and aborts. The message names the
//! checked expression, and for comparisons both operand values:
//!
//! ```text
//! CHECK FAILED:  a == b  (3 != 4)  while parsing header
//! ```
//!
//! These functions are `#[cold]` and never inlined, so a passing check
//! compiles to a comparison and a branch.

use crate::dispatch::log_fatal;
use crate::log_record::CallSite;
use std::fmt::{self, Debug, Write};

fn with_message(mut text: String, message: Option<fmt::Arguments<'_>>) -> String {
    if let Some(message) = message {
        let _ = write!(text, "  {}", message);
    }
    text
}

#[cold]
#[inline(never)]
pub fn check_failed(site: CallSite, expression: &str, message: Option<fmt::Arguments<'_>>) -> ! {
    let text = with_message(format!("CHECK FAILED:  {}", expression), message);
    log_fatal(site, &text)
}

/// The comparison that holds when `op` does not.
fn negated(op: &str) -> &str {
    match op {
        "==" => "!=",
        "!=" => "==",
        "<" => ">=",
        "<=" => ">",
        ">" => "<=",
        ">=" => "<",
        other => other,
    }
}

pub(crate) fn comparison_text<A, B>(
    left_expr: &str,
    op: &str,
    right_expr: &str,
    left: &A,
    right: &B,
    message: Option<fmt::Arguments<'_>>,
) -> String
where
    A: Debug + ?Sized,
    B: Debug + ?Sized,
{
    with_message(
        format!(
            "CHECK FAILED:  {} {} {}  ({:?} {} {:?})",
            left_expr,
            op,
            right_expr,
            left,
            negated(op),
            right
        ),
        message,
    )
}

#[cold]
#[inline(never)]
pub fn check_op_failed<A, B>(
    site: CallSite,
    left_expr: &str,
    op: &str,
    right_expr: &str,
    left: &A,
    right: &B,
    message: Option<fmt::Arguments<'_>>,
) -> !
where
    A: Debug + ?Sized,
    B: Debug + ?Sized,
{
    log_fatal(
        site,
        &comparison_text(left_expr, op, right_expr, left, right, message),
    )
}
