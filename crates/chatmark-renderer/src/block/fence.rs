//! Fenced code blocks.
//!
//! Fences use three or more backticks or tildes. The closing fence must use
//! the same character and be at least as long as the opening fence. A fence
//! that never closes is not a code block.
//!
//! The parser remembers the opening fences it found unclosed in the current
//! block, so later fences that cannot close either are rejected without
//! scanning the rest of the block again.

use super::{BlockParser, BlockRule, Consumed};
use crate::error::RenderError;
use crate::tree::SyntaxNode;

/// Tracks code fence state during line-by-line processing.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character used for the current fence (backtick or tilde).
    fence_char: Option<char>,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// Opening fences known to have no closing line before the end of a block.
///
/// Each entry is `(remaining, len)`: a fence of that character and length,
/// with `remaining` lines from the opening to the end of the block, never
/// closed. Any later opening of the same character that is at least as long
/// cannot close either.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct UnclosedFences {
    backtick: Option<(usize, usize)>,
    tilde: Option<(usize, usize)>,
}

impl UnclosedFences {
    fn slot(&mut self, fence_char: char) -> &mut Option<(usize, usize)> {
        if fence_char == '`' {
            &mut self.backtick
        } else {
            &mut self.tilde
        }
    }

    /// Whether an opening with `remaining` lines left is known to be unclosed.
    pub(crate) fn covers(mut self, remaining: usize, fence_char: char, fence_len: usize) -> bool {
        self.slot(fence_char)
            .is_some_and(|(known, len)| remaining <= known && fence_len >= len)
    }

    fn record(&mut self, remaining: usize, fence_char: char, fence_len: usize) {
        *self.slot(fence_char) = Some((remaining, fence_len));
    }
}

/// Detect if a line starts a code fence.
///
/// Returns the fence character and length if found.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count < 3 {
        return None;
    }
    // A backtick info string may not contain backticks (that is inline code).
    if first == '`' && trimmed[count..].contains('`') {
        return None;
    }
    Some((first, count))
}

/// Check if a line is a valid closing fence.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Language word from a fence info string: ```` ```rust ```` or ```` ```{.rust} ````.
fn fence_language(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    let word = word.trim_start_matches('{').trim_start_matches('.');
    let word = word.trim_end_matches('}');
    (!word.is_empty()).then(|| word.to_owned())
}

/// Block rule for ```` ``` ```` and `~~~` fenced code.
#[derive(Debug, Default)]
pub struct FencedCodeRule;

impl FencedCodeRule {
    pub fn new() -> Self {
        Self
    }
}

impl BlockRule for FencedCodeRule {
    fn consume(
        &self,
        lines: &[&str],
        parser: &BlockParser<'_>,
    ) -> Result<Option<Consumed>, RenderError> {
        let opening = lines[0];
        if leading_spaces(opening) > 3 {
            return Ok(None);
        }

        let mut tracker = FenceTracker::new();
        if !tracker.update(opening) {
            return Ok(None);
        }
        let Some(fence_char) = tracker.fence_char else {
            return Ok(None);
        };
        let fence_len = tracker.fence_len;
        let mut unclosed = parser.unclosed_fences();
        if unclosed.covers(lines.len(), fence_char, fence_len) {
            return Ok(None);
        }

        let trimmed = opening.trim_start();
        let marker_len = trimmed
            .chars()
            .take_while(|&c| c == '`' || c == '~')
            .count();
        let language = fence_language(&trimmed[marker_len..]);

        for (offset, line) in lines[1..].iter().enumerate() {
            if tracker.update(line) {
                let content = lines[1..=offset].join("\n");
                let node = SyntaxNode::code_block(language, true, content);
                return Ok(Some(Consumed::new(node, offset + 2)));
            }
        }
        unclosed.record(lines.len(), fence_char, fence_len);
        parser.remember_unclosed_fences(unclosed);
        Ok(None)
    }

    fn interrupts_paragraph(&self, line: &str) -> bool {
        leading_spaces(line) <= 3 && detect_fence(line.trim_start()).is_some()
    }
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}
