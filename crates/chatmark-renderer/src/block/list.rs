//! Ordered and unordered lists.
//!
//! Both list kinds share one consumption algorithm; a [`ListRule`] is just a
//! marker pattern plus the container kind it stamps on the result.
//!
//! Inside a list:
//! - a line matching the marker starts a new item;
//! - a line indented by four spaces belongs to the current item and is
//!   parsed as nested blocks (nested lists, code, quotes);
//! - an unindented line directly after item text continues that text;
//! - a blank line followed by anything else ends the list.
//!
//! A blank line between two items makes the whole list loose: every item's
//! text is wrapped in a paragraph.

use regex::Regex;

use super::{BlockParser, BlockRule, Consumed, strip_indent};
use crate::error::{ConfigError, RenderError};
use crate::tree::SyntaxNode;

const CHILD_INDENT: usize = 4;

/// Item marker for `1.` style lists.
pub const ORDERED_MARKER: &str = r"^[ ]{0,3}\d+\.[ ]+(?P<text>.*)$";
/// Item marker for `*`, `+` and `-` bullets.
pub const BULLET_MARKER: &str = r"^[ ]{0,3}[*+-][ ]+(?P<text>.*)$";

/// List block rule.
#[derive(Debug)]
pub struct ListRule {
    ordered: bool,
    item: Regex,
}

impl ListRule {
    /// Create a list rule from an item pattern with a `text` capture group.
    pub fn new(name: &str, item_pattern: &str, ordered: bool) -> Result<Self, ConfigError> {
        let item = Regex::new(item_pattern).map_err(|e| ConfigError::InvalidPattern {
            name: name.to_owned(),
            message: e.to_string(),
        })?;
        if !item.capture_names().any(|group| group == Some("text")) {
            return Err(ConfigError::InvalidPattern {
                name: name.to_owned(),
                message: "item pattern needs a `text` group".to_owned(),
            });
        }
        Ok(Self { ordered, item })
    }

    /// `1.` style ordered list.
    pub fn ordered() -> Result<Self, ConfigError> {
        Self::new("olist", ORDERED_MARKER, true)
    }

    /// Unordered list accepting `*`, `+` and `-` bullets.
    pub fn bulleted() -> Result<Self, ConfigError> {
        Self::new("ulist", BULLET_MARKER, false)
    }

    fn item_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.item
            .captures(line)
            .and_then(|caps| caps.name("text"))
            .map(|text| text.as_str())
    }
}

#[derive(Default)]
struct ItemLines<'a> {
    lead: Vec<&'a str>,
    body: Vec<&'a str>,
}

impl BlockRule for ListRule {
    fn consume(
        &self,
        lines: &[&str],
        parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        let Some(first) = self.item_text(lines[0]) else {
            return Ok(None);
        };

        let mut items = vec![ItemLines {
            lead: vec![first],
            body: Vec::new(),
        }];
        let mut loose = false;
        let mut blank_before = false;
        let mut consumed = 1;

        for (index, line) in lines.iter().enumerate().skip(1) {
            if line.is_empty() {
                blank_before = true;
                continue;
            }

            if let Some(text) = self.item_text(line) {
                loose |= blank_before;
                items.push(ItemLines {
                    lead: vec![text],
                    body: Vec::new(),
                });
            } else if let Some(child) = strip_indent(line, CHILD_INDENT) {
                let Some(item) = items.last_mut() else {
                    break;
                };
                let continues_lead = item.body.is_empty()
                    && !blank_before
                    && self.item_text(child).is_none()
                    && !parser.interrupts_paragraph(child);
                if continues_lead {
                    item.lead.push(child.trim_start());
                } else {
                    loose |= blank_before;
                    if blank_before && !item.body.is_empty() {
                        item.body.push("");
                    }
                    item.body.push(child);
                }
            } else if !blank_before {
                let Some(item) = items.last_mut() else {
                    break;
                };
                if item.body.is_empty() {
                    item.lead.push(line.trim_start());
                } else {
                    item.body.push(line);
                }
            } else {
                break;
            }

            blank_before = false;
            consumed = index + 1;
        }

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let text = SyntaxNode::Text(item.lead.join("\n").trim().to_owned());
            let mut content = vec![if loose {
                SyntaxNode::Paragraph(vec![text])
            } else {
                text
            }];
            if !item.body.is_empty() {
                content.extend(parser.parse_nested(&item.body)?);
            }
            children.push(SyntaxNode::ListItem(content));
        }

        let node = SyntaxNode::List {
            ordered: self.ordered,
            children,
        };
        Ok(Some(Consumed::new(node, consumed)))
    }
}
