//! Code spans, escapes, emphasis and line breaks.

use regex::Captures;

use super::{InlineScanner, RegexPattern, char_at, char_before};
use crate::error::{ConfigError, RenderError};
use crate::tree::InlineSpan;

/// Characters a backslash may escape.
const ESCAPABLE: &str = "\\`*_{}[]()>#+-.!";

type Built = Result<Option<InlineSpan>, RenderError>;

/// First capture group among `names` that participated in the match.
fn group<'t>(caps: &Captures<'t>, names: &[&str]) -> &'t str {
    names
        .iter()
        .find_map(|name| caps.name(name))
        .map_or("", |m| m.as_str())
}

/// `` `code` `` and ``` ``code with ` inside`` ```.
pub fn backtick() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        let code = group(caps, &["double", "single"]).trim();
        Ok(Some(InlineSpan::Code(code.to_owned())))
    }
    RegexPattern::new(
        "backtick",
        r"(?s)``(?P<double>.+?)``|`(?P<single>[^`]+)`",
        build,
    )
}

/// `\*` and friends: the escaped character is kept literally.
pub fn escape() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        let escaped = &caps["char"];
        Ok(ESCAPABLE
            .contains(escaped)
            .then(|| InlineSpan::PlainText(escaped.to_owned())))
    }
    RegexPattern::new("escape", r"\\(?P<char>.)", build)
}

/// Two trailing spaces before a newline.
pub fn line_break() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, _caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::LineBreak))
    }
    RegexPattern::new("linebreak", r"  \n", build)
}

/// Every newline becomes a hard break.
pub fn newline_break() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, _caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::LineBreak))
    }
    RegexPattern::new("nl", r"\n", build)
}

/// A lone `*` or `_` surrounded by spaces stays literal.
pub fn not_strong() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::PlainText(caps[0].to_owned())))
    }
    RegexPattern::new("not_strong", r"(?:^| )[*_](?: |$)", build)
}

/// `***text***` or `___text___`.
pub fn strong_emphasis() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        let inner = scanner.scan_nested(group(caps, &["stars", "unders"]))?;
        Ok(Some(InlineSpan::Strong(vec![InlineSpan::Emphasis(inner)])))
    }
    RegexPattern::new(
        "strong_em",
        r"(?s)\*\*\*(?P<stars>.+?)\*\*\*|___(?P<unders>.+?)___",
        build,
    )
}

/// `**text**` or `__text__`.
pub fn strong() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        let inner = scanner.scan_nested(group(caps, &["stars", "unders"]))?;
        Ok(Some(InlineSpan::Strong(inner)))
    }
    RegexPattern::new(
        "strong",
        r"(?s)\*\*(?P<stars>.+?)\*\*|__(?P<unders>.+?)__",
        build,
    )
}

/// `*text*`.
pub fn emphasis() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::Emphasis(scanner.scan_nested(&caps["text"])?)))
    }
    RegexPattern::new("emphasis", r"\*(?P<text>[^*]+)\*", build)
}

/// `_text_`, but never inside a word (`snake_case_name` stays as is).
pub fn smart_emphasis() -> Result<RegexPattern, ConfigError> {
    fn build(text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        let Some(whole) = caps.get(0) else {
            return Ok(None);
        };
        let word_before = char_before(text, whole.start()).is_some_and(is_word_char);
        let word_after = char_at(text, whole.end()).is_some_and(is_word_char);
        if word_before || word_after {
            return Ok(None);
        }
        Ok(Some(InlineSpan::Emphasis(scanner.scan_nested(&caps["text"])?)))
    }
    RegexPattern::new("emphasis2", r"(?s)_(?P<text>[^_](?:.*?[^_])?)_", build)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::References;
    use crate::inline::InlinePattern;
    use pretty_assertions::assert_eq;

    fn entry(
        name: &str,
        pattern: Result<RegexPattern, ConfigError>,
    ) -> (String, Box<dyn InlinePattern>) {
        (name.to_owned(), Box::new(pattern.unwrap()))
    }

    fn scan(text: &str) -> Vec<InlineSpan> {
        let patterns: Vec<(String, Box<dyn InlinePattern>)> = vec![
            entry("backtick", backtick()),
            entry("escape", escape()),
            entry("linebreak", line_break()),
            entry("not_strong", not_strong()),
            entry("strong_em", strong_emphasis()),
            entry("strong", strong()),
            entry("emphasis", emphasis()),
            entry("emphasis2", smart_emphasis()),
            entry("nl", newline_break()),
        ];
        let references = References::default();
        InlineScanner::new(&patterns, &references, 16)
            .scan(text)
            .unwrap()
    }

    fn text(s: &str) -> InlineSpan {
        InlineSpan::text(s)
    }

    #[test]
    fn test_code_span_is_not_scanned() {
        assert_eq!(
            scan("run `a *b*` now"),
            vec![text("run "), InlineSpan::Code("a *b*".to_owned()), text(" now")]
        );
        assert_eq!(scan("``a ` b``"), vec![InlineSpan::Code("a ` b".to_owned())]);
    }

    #[test]
    fn test_escape() {
        assert_eq!(scan(r"\*not em\*"), vec![text("*not em*")]);
        assert_eq!(scan(r"C:\dir"), vec![text(r"C:\dir")]);
    }

    #[test]
    fn test_strong_and_emphasis() {
        assert_eq!(
            scan("**bold** and *it*"),
            vec![
                InlineSpan::Strong(vec![text("bold")]),
                text(" and "),
                InlineSpan::Emphasis(vec![text("it")]),
            ]
        );
        assert_eq!(
            scan("***both***"),
            vec![InlineSpan::Strong(vec![InlineSpan::Emphasis(vec![text("both")])])]
        );
    }

    #[test]
    fn test_nested_emphasis_in_strong() {
        assert_eq!(
            scan("__a *b* c__"),
            vec![InlineSpan::Strong(vec![
                text("a "),
                InlineSpan::Emphasis(vec![text("b")]),
                text(" c"),
            ])]
        );
    }

    #[test]
    fn test_lone_star_is_literal() {
        assert_eq!(scan("2 * 3 * 4"), vec![text("2 * 3 * 4")]);
    }

    #[test]
    fn test_intraword_underscores() {
        assert_eq!(scan("snake_case_name"), vec![text("snake_case_name")]);
        assert_eq!(
            scan("an _emphasized_ word"),
            vec![
                text("an "),
                InlineSpan::Emphasis(vec![text("emphasized")]),
                text(" word"),
            ]
        );
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(
            scan("one  \ntwo\nthree"),
            vec![
                text("one"),
                InlineSpan::LineBreak,
                text("two"),
                InlineSpan::LineBreak,
                text("three"),
            ]
        );
    }
}
