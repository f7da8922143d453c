//! Paragraphs: the fallback block.

use super::{BlockParser, BlockRule, Consumed};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

/// Consecutive non-blank lines.
///
/// A paragraph ends at a blank line or at a line another rule would start
/// even mid-paragraph (fences, rules, quotes, `#` headings). Lists never
/// interrupt a paragraph.
#[derive(Debug, Default)]
pub struct ParagraphRule;

impl ParagraphRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for ParagraphRule {
    fn consume(
        &self,
        lines: &[&str],
        parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        let len = 1 + lines[1..]
            .iter()
            .take_while(|line| !line.is_empty() && !parser.interrupts_paragraph(line))
            .count();
        let text = lines[..len].join("\n").trim().to_owned();
        Ok(Some(Consumed::new(
            SyntaxNode::Paragraph(vec![SyntaxNode::Text(text)]),
            len,
        )))
    }
}
