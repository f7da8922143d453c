//! `#` headings and setext (underlined) headings.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockParser, BlockRule, Consumed};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

static HASH_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<level>#{1,6})(?P<text>.*?)#*$").unwrap());

static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?P<h1>=+)|-+)[ ]*$").unwrap());

#[allow(clippy::cast_possible_truncation)]
fn heading(level: usize, text: &str) -> SyntaxNode {
    SyntaxNode::Heading {
        level: level as u8,
        children: vec![SyntaxNode::Text(text.trim().to_owned())],
    }
}

/// `# Heading` through `###### Heading`.
#[derive(Debug, Default)]
pub struct HashHeaderRule;

impl HashHeaderRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for HashHeaderRule {
    fn consume(
        &self,
        lines: &[&str],
        _parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        Ok(HASH_HEADER.captures(lines[0]).map(|caps| {
            Consumed::new(heading(caps["level"].len(), &caps["text"]), 1)
        }))
    }

    fn interrupts_paragraph(&self, line: &str) -> bool {
        HASH_HEADER.is_match(line)
    }
}

/// A text line underlined with `===` (level 1) or `---` (level 2).
#[derive(Debug, Default)]
pub struct SetextHeaderRule;

impl SetextHeaderRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for SetextHeaderRule {
    fn consume(
        &self,
        lines: &[&str],
        _parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        let Some(underline) = lines.get(1).and_then(|line| SETEXT_UNDERLINE.captures(line)) else {
            return Ok(None);
        };
        let level = if underline.name("h1").is_some() { 1 } else { 2 };
        Ok(Some(Consumed::new(heading(level, lines[0]), 2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rule: &dyn BlockRule, lines: &[&str]) -> Option<Consumed> {
        let rules = Vec::new();
        let parser = BlockParser::new(&rules, 8);
        rule.consume(lines, &parser).unwrap()
    }

    #[test]
    fn test_hash_header_levels() {
        let consumed = parse(&HashHeaderRule::new(), &["### Title ###"]).unwrap();
        assert_eq!(consumed.node, heading(3, "Title"));

        let consumed = parse(&HashHeaderRule::new(), &["#no space"]).unwrap();
        assert_eq!(consumed.node, heading(1, "no space"));
    }

    #[test]
    fn test_seven_hashes_keeps_extra_hash_as_text() {
        let consumed = parse(&HashHeaderRule::new(), &["####### seven"]).unwrap();
        assert_eq!(consumed.node, heading(6, "# seven"));
    }

    #[test]
    fn test_setext_levels() {
        let consumed = parse(&SetextHeaderRule::new(), &["Title", "====="]).unwrap();
        assert_eq!(consumed.lines, 2);
        assert_eq!(consumed.node, heading(1, "Title"));

        let consumed = parse(&SetextHeaderRule::new(), &["Sub", "---"]).unwrap();
        assert_eq!(consumed.node, heading(2, "Sub"));
    }

    #[test]
    fn test_setext_needs_underline() {
        assert!(parse(&SetextHeaderRule::new(), &["Title"]).is_none());
        assert!(parse(&SetextHeaderRule::new(), &["Title", "text"]).is_none());
    }
}
