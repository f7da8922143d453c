//! Block quotes.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockParser, BlockRule, Consumed};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

static QUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ ]{0,3}>[ ]?(?P<text>.*)$").unwrap());

/// `>` quoted lines, with lazy continuation of unmarked lines.
///
/// The quoted content is parsed again as blocks, so quotes nest.
#[derive(Debug, Default)]
pub struct BlockQuoteRule;

impl BlockQuoteRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for BlockQuoteRule {
    fn consume(
        &self,
        lines: &[&str],
        parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        if !QUOTE_LINE.is_match(lines[0]) {
            return Ok(None);
        }

        let mut inner: Vec<&str> = Vec::new();
        for line in lines {
            if let Some(caps) = QUOTE_LINE.captures(line) {
                inner.push(caps.name("text").map_or("", |text| text.as_str()));
            } else if !line.is_empty() && inner.last().is_some_and(|prev| !prev.is_empty()) {
                inner.push(line);
            } else {
                break;
            }
        }

        let consumed = inner.len();
        let children = parser.parse_nested(&inner)?;
        Ok(Some(Consumed::new(SyntaxNode::BlockQuote(children), consumed)))
    }

    fn interrupts_paragraph(&self, line: &str) -> bool {
        QUOTE_LINE.is_match(line)
    }
}
