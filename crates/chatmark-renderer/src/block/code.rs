//! Indented code blocks.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockParser, BlockRule, Consumed, strip_indent};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

const INDENT: usize = 4;

/// First-line language marker: `:::lang`, `#!lang` or `#!/path/to/lang`.
static LANG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<colons>:::+)|(?P<shebang>#!))(?P<path>(?:/\w+)*[/ ])?(?P<lang>[\w+-]*)$")
        .unwrap()
});

/// Block rule for code indented by four spaces.
///
/// Blank lines inside the block are kept; trailing blank lines are not part
/// of it. A language marker on the first line tags the block and is dropped,
/// except a shebang with a path, which is real content.
#[derive(Debug, Default)]
pub struct IndentedCodeRule;

impl IndentedCodeRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for IndentedCodeRule {
    fn consume(
        &self,
        lines: &[&str],
        _parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        if strip_indent(lines[0], INDENT).is_none() {
            return Ok(None);
        }

        let mut body: Vec<&str> = Vec::new();
        let mut consumed = 0;
        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                body.push("");
                continue;
            }
            match strip_indent(line, INDENT) {
                Some(stripped) => {
                    body.push(stripped);
                    consumed = index + 1;
                }
                None => break,
            }
        }
        while body.last().is_some_and(|line| line.is_empty()) {
            body.pop();
        }

        let mut language = None;
        if let Some(caps) = body.first().and_then(|first| LANG_MARKER.captures(first)) {
            let lang = &caps["lang"];
            if !lang.is_empty() {
                language = Some(lang.to_owned());
            }
            let keep_line = caps.name("shebang").is_some() && caps.name("path").is_some();
            if !keep_line {
                body.remove(0);
            }
        }

        let node = SyntaxNode::code_block(language, false, body.join("\n"));
        Ok(Some(Consumed::new(node, consumed)))
    }
}
