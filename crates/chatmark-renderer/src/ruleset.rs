//! Resolved block and inline rule tables.

use tracing::debug;

use crate::block::{
    BlockQuoteRule, BlockRule, FencedCodeRule, HashHeaderRule, HorizontalRuleRule,
    IndentedCodeRule, ListRule, ParagraphRule, SetextHeaderRule,
};
use crate::error::ConfigError;
use crate::extension::Extension;
use crate::inline::{
    InlinePattern, RegexPattern, angle_autolink, automail, backtick, emphasis, escape, image_link,
    image_reference, line_break, link, newline_break, not_strong, reference, short_reference,
    smart_emphasis, strong, strong_emphasis,
};
use crate::registry::{Anchor, OrderedRegistry};

/// Immutable rule tables in evaluation order.
///
/// Built once and shared by every engine instance.
pub struct RuleSet {
    blocks: Vec<(String, Box<dyn BlockRule>)>,
    inlines: Vec<(String, Box<dyn InlinePattern>)>,
}

impl RuleSet {
    /// Block rules in evaluation order.
    pub fn blocks(&self) -> &[(String, Box<dyn BlockRule>)] {
        &self.blocks
    }

    /// Inline patterns in evaluation order.
    pub fn inlines(&self) -> &[(String, Box<dyn InlinePattern>)] {
        &self.inlines
    }

    /// Block rule names in evaluation order.
    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Inline pattern names in evaluation order.
    pub fn inline_names(&self) -> Vec<&str> {
        self.inlines.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("blocks", &self.block_names())
            .field("inlines", &self.inline_names())
            .finish()
    }
}

/// Mutable rule tables used while configuring a [`RuleSet`].
pub struct RuleSetBuilder {
    blocks: OrderedRegistry<Box<dyn BlockRule>>,
    inlines: OrderedRegistry<Box<dyn InlinePattern>>,
}

impl RuleSetBuilder {
    /// Builder with no rules at all.
    pub fn empty() -> Self {
        Self {
            blocks: OrderedRegistry::new("block"),
            inlines: OrderedRegistry::new("inline"),
        }
    }

    /// Builder holding the base Markdown dialect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a built-in pattern fails
    /// to compile.
    pub fn base() -> Result<Self, ConfigError> {
        let mut builder = Self::empty();

        builder.add_block("fenced_code", FencedCodeRule::new(), &Anchor::End)?;
        builder.add_block("code", IndentedCodeRule::new(), &Anchor::End)?;
        builder.add_block("hashheader", HashHeaderRule::new(), &Anchor::End)?;
        builder.add_block("setextheader", SetextHeaderRule::new(), &Anchor::End)?;
        builder.add_block("hr", HorizontalRuleRule::new(), &Anchor::End)?;
        builder.add_block("olist", ListRule::ordered()?, &Anchor::End)?;
        builder.add_block("ulist", ListRule::bulleted()?, &Anchor::End)?;
        builder.add_block("quote", BlockQuoteRule::new(), &Anchor::End)?;
        builder.add_block("paragraph", ParagraphRule::new(), &Anchor::End)?;

        let inlines: [(&str, fn() -> Result<RegexPattern, ConfigError>); 16] = [
            ("backtick", backtick),
            ("escape", escape),
            ("reference", reference),
            ("link", link),
            ("image_link", image_link),
            ("image_reference", image_reference),
            ("short_reference", short_reference),
            ("autolink", angle_autolink),
            ("automail", automail),
            ("linebreak", line_break),
            ("not_strong", not_strong),
            ("strong_em", strong_emphasis),
            ("strong", strong),
            ("emphasis", emphasis),
            ("emphasis2", smart_emphasis),
            ("nl", newline_break),
        ];
        for (name, pattern) in inlines {
            builder.add_inline(name, pattern()?, &Anchor::End)?;
        }

        Ok(builder)
    }

    /// Register a block rule.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or an unknown anchor.
    pub fn add_block(
        &mut self,
        name: &str,
        rule: impl BlockRule + 'static,
        anchor: &Anchor,
    ) -> Result<(), ConfigError> {
        self.blocks.add(name, Box::new(rule), anchor)
    }

    /// Remove a block rule by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRule`] if no such rule exists.
    pub fn remove_block(&mut self, name: &str) -> Result<(), ConfigError> {
        self.blocks.remove(name).map(drop)
    }

    /// Register an inline pattern.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or an unknown anchor.
    pub fn add_inline(
        &mut self,
        name: &str,
        pattern: impl InlinePattern + 'static,
        anchor: &Anchor,
    ) -> Result<(), ConfigError> {
        self.inlines.add(name, Box::new(pattern), anchor)
    }

    /// Remove an inline pattern by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRule`] if no such pattern exists.
    pub fn remove_inline(&mut self, name: &str) -> Result<(), ConfigError> {
        self.inlines.remove(name).map(drop)
    }

    /// Run an extension's edits against these tables.
    ///
    /// # Errors
    ///
    /// Propagates the first error the extension reports.
    pub fn apply(&mut self, extension: &dyn Extension) -> Result<(), ConfigError> {
        extension.extend(self)
    }

    /// Freeze the tables.
    pub fn build(self) -> RuleSet {
        let rules = RuleSet {
            blocks: self.blocks.into_items(),
            inlines: self.inlines.into_items(),
        };
        debug!(
            blocks = ?rules.block_names(),
            inlines = ?rules.inline_names(),
            "Resolved rule set"
        );
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_order() {
        let rules = RuleSetBuilder::base().unwrap().build();
        assert_eq!(
            rules.block_names(),
            vec![
                "fenced_code",
                "code",
                "hashheader",
                "setextheader",
                "hr",
                "olist",
                "ulist",
                "quote",
                "paragraph",
            ]
        );
        assert_eq!(rules.inline_names().first(), Some(&"backtick"));
        assert_eq!(rules.inline_names().last(), Some(&"nl"));
        assert_eq!(rules.inlines().len(), 16);
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut builder = RuleSetBuilder::base().unwrap();
        builder.remove_block("ulist").unwrap();
        builder
            .add_block("ulist", ListRule::bulleted().unwrap(), &Anchor::after("hr"))
            .unwrap();
        let rules = builder.build();
        assert_eq!(&rules.block_names()[4..7], &["hr", "ulist", "olist"]);
    }

    #[test]
    fn test_remove_unknown_rule_fails() {
        let mut builder = RuleSetBuilder::base().unwrap();
        assert_eq!(
            builder.remove_inline("table"),
            Err(ConfigError::UnknownRule {
                kind: "inline",
                name: "table".to_owned(),
            })
        );
    }

    #[test]
    fn test_duplicate_rule_fails() {
        let mut builder = RuleSetBuilder::base().unwrap();
        let err = builder
            .add_block("hr", HorizontalRuleRule::new(), &Anchor::Start)
            .unwrap_err();
        assert_eq!(err.to_string(), "duplicate block rule: hr");
    }
}
