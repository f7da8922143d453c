//! Error types for rule-set construction and rendering.

/// Error raised while assembling a rule set.
///
/// These are setup-time failures: an engine is never built from a rule set
/// that produced one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A rule with this name is already registered.
    #[error("duplicate {kind} rule: {name}")]
    DuplicateRule {
        /// Rule table (`block` or `inline`).
        kind: &'static str,
        /// Offending rule name.
        name: String,
    },
    /// A removal referenced a rule that is not registered.
    #[error("unknown {kind} rule: {name}")]
    UnknownRule {
        /// Rule table (`block` or `inline`).
        kind: &'static str,
        /// Missing rule name.
        name: String,
    },
    /// An insertion anchor referenced a rule that is not registered.
    #[error("{kind} rule {name} is anchored to unknown rule {anchor}")]
    UnknownAnchor {
        /// Rule table (`block` or `inline`).
        kind: &'static str,
        /// Rule being inserted.
        name: String,
        /// Missing anchor target.
        anchor: String,
    },
    /// A rule's regular expression failed to compile.
    #[error("invalid pattern for rule {name}: {message}")]
    InvalidPattern {
        /// Rule whose pattern failed.
        name: String,
        /// Compiler message.
        message: String,
    },
}

/// Error raised while rendering a single input.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Input exceeds the configured size cap.
    #[error("input of {len} bytes exceeds the {limit} byte limit")]
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Configured cap in bytes.
        limit: usize,
    },
    /// Block or inline nesting exceeded the configured depth.
    #[error("nesting exceeds maximum depth of {limit}")]
    NestingTooDeep {
        /// Configured depth limit.
        limit: usize,
    },
    /// The engine panicked while rendering.
    #[error("engine panicked: {0}")]
    Panicked(String),
}
