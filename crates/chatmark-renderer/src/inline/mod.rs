//! Inline phase: scans text runs against the ordered pattern table.
//!
//! At each position the scanner takes the leftmost match over all patterns;
//! when several patterns match at the same position the one registered
//! first wins. Text between matches becomes [`InlineSpan::PlainText`].
//!
//! Patterns that [claim their matches first](InlinePattern::claims_first)
//! run before the others: their matches are fixed, and the remaining
//! patterns only see the text between them.
//!
//! Each pattern's next match is cached and only searched again once the
//! scan position passes it, so every pattern scans the text at most once
//! per accepted match.

mod autolink;
mod avatar;
mod basic;
mod links;

pub use autolink::BareUrlPattern;
pub use avatar::{AVATAR_CLASS, AvatarHasher, AvatarPattern, AvatarStyle, Md5Hasher};
pub use basic::{
    backtick, emphasis, escape, line_break, newline_break, not_strong, smart_emphasis, strong,
    strong_emphasis,
};
pub use links::{
    angle_autolink, automail, image_link, image_reference, link, reference, sanitize_url,
    short_reference,
};

use regex::{Captures, Regex};

use crate::block::References;
use crate::error::{ConfigError, RenderError};
use crate::tree::InlineSpan;

/// A rule that turns a regex match into an inline span.
pub trait InlinePattern: Send + Sync {
    /// Compiled matcher.
    fn regex(&self) -> &Regex;

    /// Build the span for a match found in `text`.
    ///
    /// Returning `Ok(None)` rejects the candidate; the scanner then keeps the
    /// first matched character as plain text and looks again further on.
    fn build(
        &self,
        text: &str,
        caps: &Captures<'_>,
        scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError>;

    /// Whether matches of this pattern are taken before any other pattern
    /// looks at the text, so no other pattern can swallow them.
    fn claims_first(&self) -> bool {
        false
    }
}

/// Builder signature for [`RegexPattern`].
pub type BuildFn =
    fn(&str, &Captures<'_>, &InlineScanner<'_>) -> Result<Option<InlineSpan>, RenderError>;

/// Pattern made of a regex and a plain builder function.
pub struct RegexPattern {
    regex: Regex,
    build: BuildFn,
}

impl RegexPattern {
    /// Compile `pattern` for the rule called `name`.
    pub fn new(name: &str, pattern: &str, build: BuildFn) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            name: name.to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self { regex, build })
    }
}

impl InlinePattern for RegexPattern {
    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(
        &self,
        text: &str,
        caps: &Captures<'_>,
        scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        (self.build)(text, caps, scanner)
    }
}

/// Scans text runs for inline patterns.
pub struct InlineScanner<'a> {
    patterns: &'a [(String, Box<dyn InlinePattern>)],
    references: &'a References,
    max_depth: usize,
    depth: usize,
}

impl<'a> InlineScanner<'a> {
    /// Create a top-level scanner.
    pub fn new(
        patterns: &'a [(String, Box<dyn InlinePattern>)],
        references: &'a References,
        max_depth: usize,
    ) -> Self {
        Self {
            patterns,
            references,
            max_depth,
            depth: 0,
        }
    }

    /// Reference definitions of the current input.
    pub fn references(&self) -> &References {
        self.references
    }

    /// Scan content nested inside another span (emphasis, link text).
    pub fn scan_nested(&self, text: &str) -> Result<Vec<InlineSpan>, RenderError> {
        Self {
            patterns: self.patterns,
            references: self.references,
            max_depth: self.max_depth,
            depth: self.depth + 1,
        }
        .scan(text)
    }

    /// Scan `text` into inline spans.
    pub fn scan(&self, text: &str) -> Result<Vec<InlineSpan>, RenderError> {
        if self.depth > self.max_depth {
            return Err(RenderError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let (claiming, regular): (Vec<&dyn InlinePattern>, Vec<&dyn InlinePattern>) = self
            .patterns
            .iter()
            .map(|(_, pattern)| &**pattern)
            .partition(|pattern| pattern.claims_first());

        let mut spans = Vec::new();
        if claiming.is_empty() {
            self.scan_run(text, &regular, &mut spans)?;
            return Ok(spans);
        }

        let mut claimed = Vec::new();
        self.scan_run(text, &claiming, &mut claimed)?;
        for span in claimed {
            match span {
                InlineSpan::PlainText(gap) => self.scan_run(&gap, &regular, &mut spans)?,
                span => push_span(&mut spans, span),
            }
        }
        Ok(spans)
    }

    /// Leftmost-match scan of `text` with `patterns`, appending to `spans`.
    fn scan_run(
        &self,
        text: &str,
        patterns: &[&dyn InlinePattern],
        spans: &mut Vec<InlineSpan>,
    ) -> Result<(), RenderError> {
        let mut pending: Vec<Option<Captures<'_>>> = patterns
            .iter()
            .map(|pattern| pattern.regex().captures_at(text, 0))
            .collect();
        let mut pos = 0;
        let mut plain_start = 0;

        loop {
            for (slot, pattern) in pending.iter_mut().zip(patterns) {
                if slot.as_ref().is_some_and(|caps| match_start(caps) < pos) {
                    *slot = pattern.regex().captures_at(text, pos);
                }
            }

            let best = pending
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.as_ref().map(|caps| (match_start(caps), index)))
                .min();
            let Some((start, index)) = best else {
                break;
            };

            let Some(caps) = pending[index].take() else {
                break;
            };
            let end = caps.get(0).map_or(start, |m| m.end());
            let built = if end > start {
                patterns[index].build(text, &caps, self)?
            } else {
                None
            };

            match built {
                Some(span) => {
                    push_plain(spans, &text[plain_start..start]);
                    push_span(spans, span);
                    pos = end;
                    plain_start = end;
                    pending[index] = patterns[index].regex().captures_at(text, end);
                }
                None => {
                    let retry = next_char_boundary(text, start);
                    pending[index] = patterns[index].regex().captures_at(text, retry);
                }
            }
        }

        push_plain(spans, &text[plain_start..]);
        Ok(())
    }
}

fn match_start(caps: &Captures<'_>) -> usize {
    caps.get(0).map_or(0, |m| m.start())
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

fn push_plain(spans: &mut Vec<InlineSpan>, text: &str) {
    if !text.is_empty() {
        push_span(spans, InlineSpan::PlainText(text.to_owned()));
    }
}

/// Append a span, merging adjacent plain text.
fn push_span(spans: &mut Vec<InlineSpan>, span: InlineSpan) {
    if let InlineSpan::PlainText(text) = &span
        && let Some(InlineSpan::PlainText(last)) = spans.last_mut()
    {
        last.push_str(text);
        return;
    }
    spans.push(span);
}

/// The character before byte offset `index`, if any.
pub(crate) fn char_before(text: &str, index: usize) -> Option<char> {
    text[..index].chars().next_back()
}

/// The character at byte offset `index`, if any.
pub(crate) fn char_at(text: &str, index: usize) -> Option<char> {
    text[index..].chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn star(
        _text: &str,
        caps: &Captures<'_>,
        scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        Ok(Some(InlineSpan::Emphasis(scanner.scan_nested(&caps["inner"])?)))
    }

    fn shout(
        _text: &str,
        caps: &Captures<'_>,
        _scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        Ok(Some(InlineSpan::Code(caps[0].to_uppercase())))
    }

    fn reject(
        _text: &str,
        _caps: &Captures<'_>,
        _scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        Ok(None)
    }

    fn table(entries: Vec<(&str, &str, BuildFn)>) -> Vec<(String, Box<dyn InlinePattern>)> {
        entries
            .into_iter()
            .map(|(name, pattern, build)| {
                let pattern: Box<dyn InlinePattern> =
                    Box::new(RegexPattern::new(name, pattern, build).unwrap());
                (name.to_owned(), pattern)
            })
            .collect()
    }

    #[test]
    fn test_plain_text_only() {
        let patterns = table(vec![("star", r"\*(?P<inner>[^*]+)\*", star)]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(scanner.scan("just text").unwrap(), vec![InlineSpan::text("just text")]);
    }

    #[test]
    fn test_leftmost_match_wins() {
        let patterns = table(vec![
            ("shout", r"hey", shout),
            ("star", r"\*(?P<inner>[^*]+)\*", star),
        ]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(
            scanner.scan("a *b* hey").unwrap(),
            vec![
                InlineSpan::text("a "),
                InlineSpan::Emphasis(vec![InlineSpan::text("b")]),
                InlineSpan::text(" "),
                InlineSpan::Code("HEY".to_owned()),
            ]
        );
    }

    #[test]
    fn test_earlier_pattern_wins_ties() {
        let patterns = table(vec![
            ("shout", r"\*x\*", shout),
            ("star", r"\*(?P<inner>[^*]+)\*", star),
        ]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(
            scanner.scan("*x*").unwrap(),
            vec![InlineSpan::Code("*X*".to_owned())]
        );
    }

    #[test]
    fn test_rejected_match_retries_later() {
        let patterns = table(vec![
            ("reject", r"a", reject),
            ("shout", r"ab", shout),
        ]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(
            scanner.scan("ab").unwrap(),
            vec![InlineSpan::Code("AB".to_owned())]
        );
    }

    struct Claiming(RegexPattern);

    impl InlinePattern for Claiming {
        fn regex(&self) -> &Regex {
            self.0.regex()
        }

        fn build(
            &self,
            text: &str,
            caps: &Captures<'_>,
            scanner: &InlineScanner<'_>,
        ) -> Result<Option<InlineSpan>, RenderError> {
            self.0.build(text, caps, scanner)
        }

        fn claims_first(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_claiming_pattern_is_not_swallowed() {
        let mut patterns = table(vec![("star", r"\*(?P<inner>[^*]+)\*", star)]);
        let claiming: Box<dyn InlinePattern> =
            Box::new(Claiming(RegexPattern::new("shout", r"hey\*", shout).unwrap()));
        patterns.push(("shout".to_owned(), claiming));
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(
            scanner.scan("*a hey* b*").unwrap(),
            vec![
                InlineSpan::text("*a "),
                InlineSpan::Code("HEY*".to_owned()),
                InlineSpan::text(" b*"),
            ]
        );
    }

    #[test]
    fn test_nested_scan_depth_limit() {
        let patterns = table(vec![("star", r"\*(?P<inner>.+)\*", star)]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 2);
        assert!(scanner.scan("**x**").is_ok());
        let err = scanner.scan("*****x*****").unwrap_err();
        assert!(matches!(err, RenderError::NestingTooDeep { limit: 2 }));
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let patterns = table(vec![("reject", r"é", reject)]);
        let references = References::default();
        let scanner = InlineScanner::new(&patterns, &references, 8);
        assert_eq!(scanner.scan("café é").unwrap(), vec![InlineSpan::text("café é")]);
    }
}
