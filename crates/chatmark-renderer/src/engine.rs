//! One renderer instance: normalization, block phase, inline phase, HTML.

use std::sync::Arc;

use crate::block::{BlockParser, collect_references};
use crate::error::RenderError;
use crate::html::to_html;
use crate::inline::InlineScanner;
use crate::ruleset::RuleSet;
use crate::tree::SyntaxNode;

const TAB_WIDTH: usize = 4;

/// Limits applied to every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Inputs longer than this many bytes are rejected.
    pub max_input_bytes: usize,
    /// Maximum block and inline nesting depth.
    pub max_nesting: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: 100_000,
            max_nesting: 32,
        }
    }
}

/// Renders text with a shared [`RuleSet`].
///
/// Engines are cheap to build; all compiled patterns live in the rule set.
#[derive(Debug)]
pub struct Engine {
    rules: Arc<RuleSet>,
    options: EngineOptions,
    rendered: u64,
}

impl Engine {
    /// Create an engine over `rules`.
    pub fn new(rules: Arc<RuleSet>, options: EngineOptions) -> Self {
        Self {
            rules,
            options,
            rendered: 0,
        }
    }

    /// Limits this engine enforces.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Number of successful renders by this instance.
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Parse `text` into a tree whose text leaves are all inline runs.
    ///
    /// # Errors
    ///
    /// [`RenderError::InputTooLarge`] for oversized input and
    /// [`RenderError::NestingTooDeep`] when blocks or inlines nest past the
    /// configured depth.
    pub fn parse(&self, text: &str) -> Result<SyntaxNode, RenderError> {
        if text.len() > self.options.max_input_bytes {
            return Err(RenderError::InputTooLarge {
                len: text.len(),
                limit: self.options.max_input_bytes,
            });
        }

        let normalized = normalize(text);
        let lines: Vec<&str> = normalized.split('\n').collect();
        let (references, lines) = collect_references(&lines);

        let parser = BlockParser::new(self.rules.blocks(), self.options.max_nesting);
        let mut root = SyntaxNode::Document(parser.parse(&lines)?);

        let scanner = InlineScanner::new(
            self.rules.inlines(),
            &references,
            self.options.max_nesting,
        );
        scan_inlines(&mut root, &scanner)?;
        Ok(root)
    }

    /// Render `text` to HTML.
    ///
    /// # Errors
    ///
    /// See [`Engine::parse`].
    pub fn render(&mut self, text: &str) -> Result<String, RenderError> {
        let root = self.parse(text)?;
        self.rendered += 1;
        Ok(to_html(&root))
    }
}

/// Unify line endings, expand tabs and blank out whitespace-only lines.
fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        expand_tabs(line, &mut out);
    }
    out
}

fn expand_tabs(line: &str, out: &mut String) {
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', spaces));
            column += spaces;
        } else {
            out.push(c);
            column += 1;
        }
    }
}

fn scan_inlines(node: &mut SyntaxNode, scanner: &InlineScanner<'_>) -> Result<(), RenderError> {
    if let SyntaxNode::Text(text) = node {
        let spans = scanner.scan(text)?;
        *node = SyntaxNode::InlineRun(spans);
        return Ok(());
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            scan_inlines(child, scanner)?;
        }
    }
    Ok(())
}
