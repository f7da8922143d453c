//! Block phase: splits normalized lines into structural nodes.
//!
//! Every [`BlockRule`] is tried in evaluation order at the start of each
//! block; the first rule that returns a [`Consumed`] wins. Blank lines
//! between blocks are skipped by the parser itself.

mod code;
mod fence;
mod heading;
mod hr;
mod list;
mod paragraph;
mod quote;
mod references;

pub use code::IndentedCodeRule;
pub use fence::FencedCodeRule;
pub use heading::{HashHeaderRule, SetextHeaderRule};
pub use hr::HorizontalRuleRule;
pub use list::ListRule;
pub use paragraph::ParagraphRule;
pub use quote::BlockQuoteRule;
pub use references::{LinkReference, References};

pub(crate) use references::collect_references;

use std::cell::Cell;

use fence::UnclosedFences;

use crate::error::RenderError;
use crate::tree::SyntaxNode;

/// Result of a block rule match.
#[derive(Debug)]
pub struct Consumed {
    /// Node produced for the matched block.
    pub node: SyntaxNode,
    /// Number of input lines the block covers. Always at least one.
    pub lines: usize,
}

impl Consumed {
    /// Create a match result.
    pub fn new(node: SyntaxNode, lines: usize) -> Self {
        Self { node, lines }
    }
}

/// A rule that consumes one or more whole lines.
pub trait BlockRule: Send + Sync {
    /// Try to consume a block starting at `lines[0]`.
    ///
    /// `lines[0]` is never blank. Return `Ok(None)` when the rule does not
    /// apply; use `parser` to parse nested content.
    fn consume(
        &self,
        lines: &[&str],
        parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError>;

    /// Whether `line` starts this kind of block even in the middle of a
    /// paragraph.
    fn interrupts_paragraph(&self, _line: &str) -> bool {
        false
    }
}

/// Drives the block rules over a sequence of lines.
pub struct BlockParser<'r> {
    rules: &'r [(String, Box<dyn BlockRule>)],
    max_depth: usize,
    depth: usize,
    /// Scoped to the block sequence currently being parsed.
    unclosed_fences: Cell<UnclosedFences>,
}

impl<'r> BlockParser<'r> {
    /// Create a top-level parser over `rules`.
    pub fn new(rules: &'r [(String, Box<dyn BlockRule>)], max_depth: usize) -> Self {
        Self {
            rules,
            max_depth,
            depth: 0,
            unclosed_fences: Cell::default(),
        }
    }

    /// Parse `lines` into block nodes.
    pub fn parse(&self, lines: &[&str]) -> Result<Vec<SyntaxNode>, RenderError> {
        if self.depth > self.max_depth {
            return Err(RenderError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let outer_fences = self.unclosed_fences.take();
        let mut nodes = Vec::new();
        let mut index = 0;
        while index < lines.len() {
            if lines[index].is_empty() {
                index += 1;
                continue;
            }

            let rest = &lines[index..];
            match self.first_match(rest)? {
                Some(consumed) => {
                    nodes.push(consumed.node);
                    index += consumed.lines.max(1);
                }
                None => {
                    // No paragraph rule registered: keep the line as text.
                    nodes.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(
                        rest[0].trim().to_owned(),
                    )]));
                    index += 1;
                }
            }
        }
        self.unclosed_fences.set(outer_fences);
        Ok(nodes)
    }

    /// Parse content nested one level deeper (list items, quotes).
    pub fn parse_nested(&self, lines: &[&str]) -> Result<Vec<SyntaxNode>, RenderError> {
        Self {
            rules: self.rules,
            max_depth: self.max_depth,
            depth: self.depth + 1,
            unclosed_fences: Cell::default(),
        }
        .parse(lines)
    }

    /// Whether any registered rule would start a new block at `line`.
    pub fn interrupts_paragraph(&self, line: &str) -> bool {
        self.rules
            .iter()
            .any(|(_, rule)| rule.interrupts_paragraph(line))
    }

    pub(crate) fn unclosed_fences(&self) -> UnclosedFences {
        self.unclosed_fences.get()
    }

    pub(crate) fn remember_unclosed_fences(&self, fences: UnclosedFences) {
        self.unclosed_fences.set(fences);
    }

    fn first_match(&self, lines: &[&str]) -> Result<Option<Consumed>, RenderError> {
        for (_, rule) in self.rules {
            if let Some(consumed) = rule.consume(lines, self)? {
                return Ok(Some(consumed));
            }
        }
        Ok(None)
    }
}

/// Strip up to `width` leading spaces; `None` if the line has fewer.
pub(crate) fn strip_indent(line: &str, width: usize) -> Option<&str> {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    (spaces >= width).then(|| &line[width..])
}
