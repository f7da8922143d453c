//! Extensions that edit the rule tables before they are frozen.

use std::sync::Arc;

use crate::block::ListRule;
use crate::error::ConfigError;
use crate::inline::{AvatarHasher, AvatarPattern, AvatarStyle, BareUrlPattern, Md5Hasher};
use crate::registry::Anchor;
use crate::ruleset::RuleSetBuilder;

/// Bullet marker for chat lists: `*` and `-`, never `+`.
pub const CHAT_BULLET_MARKER: &str = r"^[ ]{0,3}[*-][ ]+(?P<text>.*)$";

const REMOVED_INLINES: &[&str] = &["image_link", "image_reference", "automail", "autolink"];
const REMOVED_BLOCKS: &[&str] = &["hashheader", "setextheader", "olist", "ulist"];

/// Edits a [`RuleSetBuilder`].
pub trait Extension {
    /// Apply this extension's additions and removals.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] aborts rule-set construction.
    fn extend(&self, rules: &mut RuleSetBuilder) -> Result<(), ConfigError>;
}

/// The chat dialect.
///
/// Drops images, headings, ordered lists and angle-bracket autolinks,
/// replaces the bullet list with one that only accepts `*` and `-`, and adds
/// the `!gravatar(email)` shorthand and bare-URL links.
#[derive(Debug, Clone)]
pub struct ChatExtension {
    hasher: Arc<dyn AvatarHasher>,
    avatar: AvatarStyle,
}

impl Default for ChatExtension {
    fn default() -> Self {
        Self::new(Arc::new(Md5Hasher), AvatarStyle::default())
    }
}

impl ChatExtension {
    /// Chat dialect whose avatars use `hasher` and `avatar`.
    pub fn new(hasher: Arc<dyn AvatarHasher>, avatar: AvatarStyle) -> Self {
        Self { hasher, avatar }
    }
}

impl Extension for ChatExtension {
    fn extend(&self, rules: &mut RuleSetBuilder) -> Result<(), ConfigError> {
        for name in REMOVED_INLINES {
            rules.remove_inline(name)?;
        }
        for name in REMOVED_BLOCKS {
            rules.remove_block(name)?;
        }

        rules.add_block(
            "ulist",
            ListRule::new("ulist", CHAT_BULLET_MARKER, false)?,
            &Anchor::after("hr"),
        )?;
        rules.add_inline(
            "gravatar",
            AvatarPattern::new(Arc::clone(&self.hasher), self.avatar.clone())?,
            &Anchor::Start,
        )?;
        rules.add_inline("autolink", BareUrlPattern::new()?, &Anchor::after("link"))?;
        Ok(())
    }
}
