//! Link reference definitions: `[id]: url "title"`.
//!
//! Definitions are collected before the block phase and removed from the
//! input. Lines inside fenced code are left alone.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::fence::FenceTracker;

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[ ]{0,3}\[(?P<id>[^\]]+)\]:[ ]*(?P<url><[^>]*>|\S+)(?:[ ]+(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|\((?P<paren>[^)]*)\)))?[ ]*$"#,
    )
    .unwrap()
});

/// Target of a reference-style link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// Link URL.
    pub url: String,
    /// Optional title.
    pub title: Option<String>,
}

/// Reference definitions keyed by lowercased id.
#[derive(Debug, Default)]
pub struct References {
    entries: HashMap<String, LinkReference>,
}

impl References {
    /// Look up a reference id, ignoring case.
    pub fn get(&self, id: &str) -> Option<&LinkReference> {
        self.entries.get(&id.trim().to_lowercase())
    }

    /// Number of collected definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no definitions were collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, id: &str, reference: LinkReference) {
        self.entries.insert(id.trim().to_lowercase(), reference);
    }
}

/// Split definition lines out of `lines`.
///
/// Returns the collected references and the remaining lines. The first
/// definition of an id wins.
pub(crate) fn collect_references<'a>(lines: &[&'a str]) -> (References, Vec<&'a str>) {
    let mut references = References::default();
    let mut remaining = Vec::with_capacity(lines.len());
    let mut fence = FenceTracker::new();

    for &line in lines {
        if fence.update(line) || fence.in_fence() {
            remaining.push(line);
            continue;
        }

        let Some(caps) = DEFINITION.captures(line) else {
            remaining.push(line);
            continue;
        };

        let url = caps["url"].trim_start_matches('<').trim_end_matches('>');
        let title = ["dq", "sq", "paren"]
            .iter()
            .find_map(|group| caps.name(group))
            .map(|title| title.as_str().to_owned());
        if references.get(&caps["id"]).is_none() {
            references.insert(
                &caps["id"],
                LinkReference {
                    url: url.to_owned(),
                    title,
                },
            );
        }
    }

    (references, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_definitions() {
        let lines = [
            "See [docs][1].",
            "",
            "[1]: http://example.com/docs \"The Docs\"",
            "[Home]: <http://example.com/>",
        ];
        let (references, remaining) = collect_references(&lines);

        assert_eq!(remaining, vec!["See [docs][1].", ""]);
        assert_eq!(references.len(), 2);
        assert_eq!(
            references.get("1"),
            Some(&LinkReference {
                url: "http://example.com/docs".to_owned(),
                title: Some("The Docs".to_owned()),
            })
        );
        assert_eq!(references.get("home").unwrap().url, "http://example.com/");
    }

    #[test]
    fn test_skips_fenced_code() {
        let lines = ["```", "[a]: http://in-code", "```"];
        let (references, remaining) = collect_references(&lines);
        assert!(references.is_empty());
        assert_eq!(remaining.len(), 3);
    }

    #[test]
    fn test_first_definition_wins() {
        let lines = ["[x]: /first", "[X]: /second"];
        let (references, _) = collect_references(&lines);
        assert_eq!(references.get("x").unwrap().url, "/first");
    }
}
