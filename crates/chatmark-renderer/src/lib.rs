//! Restricted Markdown engine for chat messages.
//!
//! Rendering runs in two phases over named, ordered rule tables:
//!
//! 1. The block phase splits normalized input lines into a [`SyntaxNode`]
//!    tree using the [`BlockRule`]s of a [`RuleSet`].
//! 2. The inline phase scans every text leaf with the rule set's
//!    [`InlinePattern`]s.
//!
//! The tree is then serialized to HTML with all input text escaped.
//!
//! Rule tables are assembled with a [`RuleSetBuilder`]: start from the base
//! dialect, apply [`Extension`]s that add or remove rules at [`Anchor`]ed
//! positions, then freeze the result. A frozen [`RuleSet`] is shared by any
//! number of [`Engine`]s.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chatmark_renderer::{ChatExtension, Engine, EngineOptions, RuleSetBuilder};
//!
//! let mut builder = RuleSetBuilder::base()?;
//! builder.apply(&ChatExtension::default())?;
//! let mut engine = Engine::new(Arc::new(builder.build()), EngineOptions::default());
//!
//! let html = engine.render("*hi* http://example.com").unwrap();
//! assert_eq!(
//!     html,
//!     r#"<p><em>hi</em> <a href="http://example.com">http://example.com</a></p>"#
//! );
//! # Ok::<(), chatmark_renderer::ConfigError>(())
//! ```

pub mod block;
mod engine;
mod error;
mod extension;
pub mod html;
pub mod inline;
mod registry;
mod ruleset;
mod tree;

pub use block::{BlockParser, BlockRule, Consumed};
pub use engine::{Engine, EngineOptions};
pub use error::{ConfigError, RenderError};
pub use extension::{CHAT_BULLET_MARKER, ChatExtension, Extension};
pub use inline::{AvatarHasher, AvatarStyle, InlinePattern, InlineScanner, Md5Hasher};
pub use registry::{Anchor, OrderedRegistry};
pub use ruleset::{RuleSet, RuleSetBuilder};
pub use tree::{InlineSpan, SyntaxNode};
