//! Horizontal rules.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockParser, BlockRule, Consumed};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ ]{0,3}(?:(?:-[ ]{0,2}){3,}|(?:_[ ]{0,2}){3,}|(?:\*[ ]{0,2}){3,})[ ]*$").unwrap()
});

/// Three or more `-`, `_` or `*`, optionally separated by up to two spaces.
#[derive(Debug, Default)]
pub struct HorizontalRuleRule;

impl HorizontalRuleRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for HorizontalRuleRule {
    fn consume(
        &self,
        lines: &[&str],
        _parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        Ok(RULE_LINE
            .is_match(lines[0])
            .then(|| Consumed::new(SyntaxNode::HorizontalRule, 1)))
    }

    fn interrupts_paragraph(&self, line: &str) -> bool {
        RULE_LINE.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lines() {
        for line in ["---", "***", "___", "- - -", " *  *  *", "-----   "] {
            assert!(RULE_LINE.is_match(line), "{line:?} should be a rule");
        }
    }

    #[test]
    fn test_non_rule_lines() {
        for line in ["--", "-*-", "    ---", "--- x", "* item"] {
            assert!(!RULE_LINE.is_match(line), "{line:?} should not be a rule");
        }
    }
}
