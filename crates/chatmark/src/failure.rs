//! Failure reports with the message text redacted.

use std::error::Error;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w").unwrap());

/// Replace every word character (Unicode `\w`: letters, digits, marks and
/// connector punctuation) with `x`, then escape the result like a Rust
/// string literal so control characters cannot reach the log verbatim.
///
/// Whitespace and punctuation survive, so the structure of the message is
/// still visible.
pub fn redact_for_log(text: &str) -> String {
    let redacted = WORD.replace_all(text, "x");
    format!("{redacted:?}")
}

/// One failed conversion, safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// The error and all of its sources, outermost first.
    pub cause: String,
    /// The input after [`redact_for_log`].
    pub redacted_input: String,
}

impl FailureReport {
    pub fn new(cause: &(dyn Error + 'static), input: &str) -> Self {
        Self {
            cause: error_chain(cause),
            redacted_input: redact_for_log(input),
        }
    }
}

fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let _ = write!(out, ": {inner}");
        source = inner.source();
    }
    out
}

/// Receives failure reports from a converter.
pub trait FailureLog: Send + Sync {
    fn record(&self, report: &FailureReport);
}

/// Logs failures with `tracing::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureLog;

impl FailureLog for TracingFailureLog {
    fn record(&self, report: &FailureReport) {
        tracing::error!(
            cause = %report.cause,
            input = %report.redacted_input,
            "Failed to render message"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_word_characters_are_replaced() {
        assert_eq!(redact_for_log("Hello, world 42!"), r#""xxxxx, xxxxx xx!""#);
        assert_eq!(redact_for_log("snake_case"), r#""xxxxxxxxxx""#);
        assert_eq!(redact_for_log("Grüße, 東京"), r#""xxxxx, xx""#);
    }

    #[test]
    fn test_structure_is_kept() {
        assert_eq!(
            redact_for_log("* a\n* b\t<c>"),
            r#""* x\n* x\t<x>""#
        );
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let redacted = redact_for_log("\u{1b}[31mred\u{7}");
        assert_eq!(redacted, r#""\u{1b}[xxxxxx\u{7}""#);
        assert!(!redacted.contains('\u{1b}'));
    }

    #[test]
    fn test_combining_marks_are_word_characters() {
        assert_eq!(redact_for_log("e\u{301}"), r#""xx""#);
    }

    #[test]
    fn test_report_includes_error_chain() {
        let report = FailureReport::new(&Outer(Inner), "secret text");
        assert_eq!(report.cause, "outer: inner");
        assert_eq!(report.redacted_input, r#""xxxxxx xxxx""#);
    }
}
