//! Bare `http://` and `https://` URLs in running text.

use regex::{Captures, Regex};

use super::{InlinePattern, InlineScanner};
use crate::error::{ConfigError, RenderError};
use crate::tree::InlineSpan;

/// A URL ends at whitespace; trailing characters that are neither word
/// characters nor `/` are left outside, but at least one character after
/// `://` is always kept.
const BARE_URL: &str = r"\bhttps?://(?:\S*[\w/]|\S)";

/// Links a bare URL to itself.
///
/// The URL is used verbatim for both the target and the visible text.
pub struct BareUrlPattern {
    regex: Regex,
}

impl BareUrlPattern {
    /// Compile the URL matcher.
    pub fn new() -> Result<Self, ConfigError> {
        let regex = Regex::new(BARE_URL).map_err(|e| ConfigError::InvalidPattern {
            name: "autolink".to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl InlinePattern for BareUrlPattern {
    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(
        &self,
        _text: &str,
        caps: &Captures<'_>,
        _scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        Ok(Some(InlineSpan::bare_link(&caps[0])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::References;
    use pretty_assertions::assert_eq;

    fn scan(text: &str) -> Vec<InlineSpan> {
        let pattern: Box<dyn InlinePattern> = Box::new(BareUrlPattern::new().unwrap());
        let patterns = vec![("autolink".to_owned(), pattern)];
        let references = References::default();
        InlineScanner::new(&patterns, &references, 4)
            .scan(text)
            .unwrap()
    }

    #[test]
    fn test_trailing_punctuation_is_excluded() {
        assert_eq!(
            scan("see http://example.com."),
            vec![
                InlineSpan::text("see "),
                InlineSpan::bare_link("http://example.com"),
                InlineSpan::text("."),
            ]
        );
        assert_eq!(
            scan("(https://example.com/a?b=c)!"),
            vec![
                InlineSpan::text("("),
                InlineSpan::bare_link("https://example.com/a?b=c"),
                InlineSpan::text(")!"),
            ]
        );
    }

    #[test]
    fn test_trailing_slash_is_kept() {
        assert_eq!(
            scan("http://example.com/"),
            vec![InlineSpan::bare_link("http://example.com/")]
        );
    }

    #[test]
    fn test_single_character_after_scheme() {
        assert_eq!(scan("http://."), vec![InlineSpan::bare_link("http://.")]);
        assert_eq!(scan("http:// x"), vec![InlineSpan::text("http:// x")]);
    }

    #[test]
    fn test_requires_word_boundary_and_lowercase_scheme() {
        assert_eq!(scan("xhttp://a.b"), vec![InlineSpan::text("xhttp://a.b")]);
        assert_eq!(scan("HTTP://a.b"), vec![InlineSpan::text("HTTP://a.b")]);
    }

    #[test]
    fn test_unicode_path() {
        assert_eq!(
            scan("http://例え.jp/パス"),
            vec![InlineSpan::bare_link("http://例え.jp/パス")]
        );
    }
}
