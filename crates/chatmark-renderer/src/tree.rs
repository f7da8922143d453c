//! Intermediate syntax tree produced by the block and inline phases.
//!
//! The block phase builds [`SyntaxNode`]s whose text-bearing leaves are
//! [`SyntaxNode::Text`]. The inline phase replaces every `Text` leaf with an
//! [`SyntaxNode::InlineRun`]. Code content is stored as [`SyntaxNode::RawText`]
//! and is never scanned.

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// Root of a rendered input.
    Document(Vec<SyntaxNode>),
    /// `<p>` block.
    Paragraph(Vec<SyntaxNode>),
    /// `<h1>`..`<h6>` block.
    Heading {
        /// Heading level, 1 to 6.
        level: u8,
        /// Heading content.
        children: Vec<SyntaxNode>,
    },
    /// `<blockquote>` block.
    BlockQuote(Vec<SyntaxNode>),
    /// `<ul>` or `<ol>`. Children are always [`SyntaxNode::ListItem`].
    List {
        /// `true` for `<ol>`.
        ordered: bool,
        /// List items.
        children: Vec<SyntaxNode>,
    },
    /// `<li>` inside a [`SyntaxNode::List`].
    ListItem(Vec<SyntaxNode>),
    /// Preformatted code. Children are always [`SyntaxNode::RawText`].
    CodeBlock {
        /// Language tag, if one was given.
        language: Option<String>,
        /// `true` when the block came from a ``` or ~~~ fence.
        fenced: bool,
        /// Literal content.
        children: Vec<SyntaxNode>,
    },
    /// `<hr>`.
    HorizontalRule,
    /// Inline source text awaiting the inline phase.
    Text(String),
    /// Inline content after the inline phase.
    InlineRun(Vec<InlineSpan>),
    /// Literal text that is escaped but never scanned.
    RawText(String),
}

impl SyntaxNode {
    /// Build a code block holding `content` as its only child.
    pub(crate) fn code_block(language: Option<String>, fenced: bool, content: String) -> Self {
        Self::CodeBlock {
            language,
            fenced,
            children: vec![Self::RawText(content)],
        }
    }

    /// Mutable access to block children, if this node has any.
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<SyntaxNode>> {
        match self {
            Self::Document(children)
            | Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::ListItem(children)
            | Self::Heading { children, .. }
            | Self::List { children, .. } => Some(children),
            Self::CodeBlock { .. }
            | Self::HorizontalRule
            | Self::Text(_)
            | Self::InlineRun(_)
            | Self::RawText(_) => None,
        }
    }
}

/// Inline-level span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    /// Literal text, escaped on output.
    PlainText(String),
    /// `<code>` span; content is not scanned.
    Code(String),
    /// `<em>`.
    Emphasis(Vec<InlineSpan>),
    /// `<strong>`.
    Strong(Vec<InlineSpan>),
    /// `<br>`.
    LineBreak,
    /// `<img>`.
    Image {
        /// Image URL.
        src: String,
        /// Alternative text.
        alt: Option<String>,
        /// Title attribute.
        title: Option<String>,
        /// CSS class attribute.
        class: Option<String>,
    },
    /// `<a>`.
    Link {
        /// Link target.
        href: String,
        /// Title attribute.
        title: Option<String>,
        /// Link content.
        children: Vec<InlineSpan>,
    },
}

impl InlineSpan {
    /// Plain text span.
    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    /// Link whose visible text equals its target.
    pub fn bare_link(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::Link {
            children: vec![Self::PlainText(url.clone())],
            href: url,
            title: None,
        }
    }
}
