//! HTML serializer.
//!
//! Every piece of text taken from the input is escaped on the way out; the
//! only markup in the output is produced here from tree nodes.

use crate::tree::{InlineSpan, SyntaxNode};

/// CSS class of the `<pre>` wrapping code blocks.
const CODE_CLASS: &str = "codehilite";

/// Escape text content.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value (always written in double quotes).
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\n' => result.push_str("&#10;"),
            _ => result.push(c),
        }
    }
    result
}

/// Serialize a tree to HTML.
///
/// Top-level blocks are separated by a newline; there is no trailing
/// newline.
pub fn to_html(root: &SyntaxNode) -> String {
    let mut out = String::new();
    match root {
        SyntaxNode::Document(children) => {
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                write_node(child, &mut out);
            }
        }
        node => write_node(node, &mut out),
    }
    out
}

fn write_node(node: &SyntaxNode, out: &mut String) {
    match node {
        SyntaxNode::Document(children) => write_container(children, "", "", out),
        SyntaxNode::Paragraph(children) => write_container(children, "<p>", "</p>", out),
        SyntaxNode::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            let open = format!("<h{level}>");
            let close = format!("</h{level}>");
            write_container(children, &open, &close, out);
        }
        SyntaxNode::BlockQuote(children) => {
            write_container(children, "<blockquote>", "</blockquote>", out);
        }
        SyntaxNode::List { ordered, children } => {
            let (open, close) = if *ordered {
                ("<ol>", "</ol>")
            } else {
                ("<ul>", "</ul>")
            };
            write_container(children, open, close, out);
        }
        SyntaxNode::ListItem(children) => write_container(children, "<li>", "</li>", out),
        SyntaxNode::CodeBlock {
            language,
            children,
            ..
        } => {
            out.push_str(r#"<pre class=""#);
            out.push_str(CODE_CLASS);
            out.push_str(r#""><code"#);
            if let Some(language) = language {
                out.push_str(r#" class="language-"#);
                out.push_str(&escape_attr(language));
                out.push('"');
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            out.push_str("</code></pre>");
        }
        SyntaxNode::HorizontalRule => out.push_str("<hr>"),
        SyntaxNode::Text(text) | SyntaxNode::RawText(text) => out.push_str(&escape_html(text)),
        SyntaxNode::InlineRun(spans) => write_spans(spans, out),
    }
}

fn is_block(node: &SyntaxNode) -> bool {
    !matches!(
        node,
        SyntaxNode::Text(_) | SyntaxNode::InlineRun(_) | SyntaxNode::RawText(_)
    )
}

/// Inline children are written inline; each block child goes on its own
/// line.
fn write_container(children: &[SyntaxNode], open: &str, close: &str, out: &mut String) {
    out.push_str(open);
    if children.first().is_some_and(is_block) {
        out.push('\n');
    }
    for child in children {
        write_node(child, out);
        if is_block(child) {
            out.push('\n');
        }
    }
    out.push_str(close);
}

fn write_spans(spans: &[InlineSpan], out: &mut String) {
    for span in spans {
        write_span(span, out);
    }
}

fn write_span(span: &InlineSpan, out: &mut String) {
    match span {
        InlineSpan::PlainText(text) => out.push_str(&escape_html(text)),
        InlineSpan::Code(code) => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }
        InlineSpan::Emphasis(children) => {
            out.push_str("<em>");
            write_spans(children, out);
            out.push_str("</em>");
        }
        InlineSpan::Strong(children) => {
            out.push_str("<strong>");
            write_spans(children, out);
            out.push_str("</strong>");
        }
        InlineSpan::LineBreak => out.push_str("<br>\n"),
        InlineSpan::Image {
            src,
            alt,
            title,
            class,
        } => {
            out.push_str("<img");
            write_attr(out, "class", class.as_deref());
            write_attr(out, "src", Some(src));
            write_attr(out, "alt", alt.as_deref());
            write_attr(out, "title", title.as_deref());
            out.push('>');
        }
        InlineSpan::Link {
            href,
            title,
            children,
        } => {
            out.push_str("<a");
            write_attr(out, "href", Some(href));
            write_attr(out, "title", title.as_deref());
            out.push('>');
            write_spans(children, out);
            out.push_str("</a>");
        }
    }
}

fn write_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push(' ');
        out.push_str(name);
        out.push_str(r#"=""#);
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}
