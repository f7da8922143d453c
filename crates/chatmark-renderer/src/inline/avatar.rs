//! `!gravatar(email)` avatar shorthand.

use std::fmt::Debug;
use std::sync::Arc;

use md5::{Digest, Md5};
use regex::{Captures, Regex};

use super::{InlinePattern, InlineScanner};
use crate::error::{ConfigError, RenderError};
use crate::tree::InlineSpan;

/// CSS class stamped on every avatar image.
pub const AVATAR_CLASS: &str = "message_body_gravatar img-rounded";

const AVATAR_PATTERN: &str = r"!gravatar\((?P<email>[^)]*)\)";

/// Turns an email address into the fixed-width hex digest used in avatar
/// URLs.
pub trait AvatarHasher: Send + Sync + Debug {
    fn digest(&self, email: &str) -> String;
}

/// MD5 hex digest of the trimmed, lowercased address.
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Hasher;

impl AvatarHasher for Md5Hasher {
    fn digest(&self, email: &str) -> String {
        let normalized = email.trim().to_lowercase();
        hex::encode(Md5::digest(normalized.as_bytes()))
    }
}

/// Avatar URL parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarStyle {
    /// URL prefix the digest is appended to.
    pub base_url: String,
    /// Icon shown for unknown addresses (`d=` query parameter).
    pub default_icon: String,
    /// Square size in pixels (`s=` query parameter).
    pub size: u32,
}

impl Default for AvatarStyle {
    fn default() -> Self {
        Self {
            base_url: "https://secure.gravatar.com/avatar".to_owned(),
            default_icon: "identicon".to_owned(),
            size: 30,
        }
    }
}

impl AvatarStyle {
    /// Image URL for a digest.
    pub fn url(&self, digest: &str) -> String {
        format!(
            "{}/{digest}?d={}&s={}",
            self.base_url.trim_end_matches('/'),
            self.default_icon,
            self.size
        )
    }
}

/// Inline pattern emitting an avatar `<img>`.
pub struct AvatarPattern {
    regex: Regex,
    hasher: Arc<dyn AvatarHasher>,
    style: AvatarStyle,
}

impl AvatarPattern {
    /// Pattern hashing addresses with `hasher` and building URLs from `style`.
    pub fn new(hasher: Arc<dyn AvatarHasher>, style: AvatarStyle) -> Result<Self, ConfigError> {
        let regex = Regex::new(AVATAR_PATTERN).map_err(|e| ConfigError::InvalidPattern {
            name: "gravatar".to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self {
            regex,
            hasher,
            style,
        })
    }
}

impl InlinePattern for AvatarPattern {
    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(
        &self,
        _text: &str,
        caps: &Captures<'_>,
        _scanner: &InlineScanner<'_>,
    ) -> Result<Option<InlineSpan>, RenderError> {
        let digest = self.hasher.digest(&caps["email"]);
        Ok(Some(InlineSpan::Image {
            src: self.style.url(&digest),
            alt: None,
            title: None,
            class: Some(AVATAR_CLASS.to_owned()),
        }))
    }

    fn claims_first(&self) -> bool {
        true
    }
}
