//! Links, images and the URL sanitizer.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{InlineScanner, RegexPattern, char_before};
use crate::error::{ConfigError, RenderError};
use crate::tree::InlineSpan;

type Built = Result<Option<InlineSpan>, RenderError>;

/// Bracketed text allowing one level of nested brackets.
const BRACKETED: &str = r"\[(?P<text>(?:[^\[\]]|\[[^\[\]]*\])*)\]";
/// `(url "title")` tail of inline links and images.
const TARGET: &str = r#"\([ ]*(?P<href><[^>]*>|(?:[^\s()]|\([^\s()]*\))*)(?:\s+(?:"(?P<t1>[^"]*)"|'(?P<t2>[^']*)'))?[ ]*\)"#;
/// `[id]` tail of reference links, optionally on the next line.
const REFERENCE_ID: &str = r"[ ]?(?:\n[ ]*)?\[(?P<id>[^\]]*)\]";

const SCHEMES_WITH_HOST: &[&str] = &["http", "https", "ftp", "ftps"];
const SCHEMES_WITHOUT_HOST: &[&str] = &["mailto", "news"];

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):").unwrap());

/// Make a link or image URL safe to emit.
///
/// Spaces are percent-encoded. URLs with a scheme outside the allowlist,
/// network schemes without a host, and URLs with a `:` past the scheme or
/// host come back as an empty string. Relative URLs pass through.
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim().replace(' ', "%20");

    let (scheme, rest) = match SCHEME.captures(&url) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (caps["scheme"].to_ascii_lowercase(), &url[end..])
        }
        None => (String::new(), url.as_str()),
    };

    let (host, tail) = match rest.strip_prefix("//") {
        Some(after) => after.split_at(after.find(['/', '?', '#']).unwrap_or(after.len())),
        None => ("", rest),
    };

    let allowed = scheme.is_empty()
        || SCHEMES_WITHOUT_HOST.contains(&scheme.as_str())
        || (SCHEMES_WITH_HOST.contains(&scheme.as_str()) && !host.is_empty());
    if !allowed || tail.contains(':') {
        return String::new();
    }
    url
}

fn title(caps: &Captures<'_>) -> Option<String> {
    caps.name("t1")
        .or_else(|| caps.name("t2"))
        .map(|title| title.as_str().to_owned())
}

fn href(caps: &Captures<'_>) -> String {
    let raw = caps.name("href").map_or("", |m| m.as_str());
    sanitize_url(raw.trim_start_matches('<').trim_end_matches('>'))
}

fn preceded_by_bang(text: &str, caps: &Captures<'_>) -> bool {
    caps.get(0)
        .is_some_and(|m| char_before(text, m.start()) == Some('!'))
}

/// `[text](url "title")`.
pub fn link() -> Result<RegexPattern, ConfigError> {
    fn build(text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        if preceded_by_bang(text, caps) {
            return Ok(None);
        }
        Ok(Some(InlineSpan::Link {
            href: href(caps),
            title: title(caps),
            children: scanner.scan_nested(&caps["text"])?,
        }))
    }
    RegexPattern::new("link", &format!("(?s){BRACKETED}{TARGET}"), build)
}

/// `![alt](url "title")`.
pub fn image_link() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::Image {
            src: href(caps),
            alt: Some(caps["text"].to_owned()),
            title: title(caps),
            class: None,
        }))
    }
    RegexPattern::new("image_link", &format!("(?s)!{BRACKETED}{TARGET}"), build)
}

/// Id to look up: the explicit `[id]`, or the link text for `[text][]`.
fn reference_id<'t>(caps: &Captures<'t>) -> &'t str {
    match caps.name("id").map(|m| m.as_str()) {
        Some(id) if !id.trim().is_empty() => id,
        _ => caps.name("text").map_or("", |m| m.as_str()),
    }
}

/// `[text][id]` and `[text][]`.
pub fn reference() -> Result<RegexPattern, ConfigError> {
    fn build(text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        if preceded_by_bang(text, caps) {
            return Ok(None);
        }
        let Some(target) = scanner.references().get(reference_id(caps)) else {
            return Ok(None);
        };
        Ok(Some(InlineSpan::Link {
            href: sanitize_url(&target.url),
            title: target.title.clone(),
            children: scanner.scan_nested(&caps["text"])?,
        }))
    }
    RegexPattern::new(
        "reference",
        &format!("(?s){BRACKETED}{REFERENCE_ID}"),
        build,
    )
}

/// `![alt][id]`.
pub fn image_reference() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        let Some(target) = scanner.references().get(reference_id(caps)) else {
            return Ok(None);
        };
        Ok(Some(InlineSpan::Image {
            src: sanitize_url(&target.url),
            alt: Some(caps["text"].to_owned()),
            title: target.title.clone(),
            class: None,
        }))
    }
    RegexPattern::new(
        "image_reference",
        &format!("(?s)!{BRACKETED}{REFERENCE_ID}"),
        build,
    )
}

/// `[id]` on its own. The id never contains brackets, so a run of `[`
/// yields at most one candidate per `]`.
pub fn short_reference() -> Result<RegexPattern, ConfigError> {
    fn build(text: &str, caps: &Captures<'_>, scanner: &InlineScanner<'_>) -> Built {
        if preceded_by_bang(text, caps) {
            return Ok(None);
        }
        let Some(target) = scanner.references().get(&caps["text"]) else {
            return Ok(None);
        };
        Ok(Some(InlineSpan::Link {
            href: sanitize_url(&target.url),
            title: target.title.clone(),
            children: scanner.scan_nested(&caps["text"])?,
        }))
    }
    RegexPattern::new("short_reference", r"\[(?P<text>[^\[\]]+)\]", build)
}

/// `<http://example.com>`.
pub fn angle_autolink() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        Ok(Some(InlineSpan::bare_link(&caps["url"])))
    }
    RegexPattern::new(
        "autolink",
        r"<(?P<url>(?:[Ff]|[Hh][Tt])[Tt][Pp][Ss]?://[^>]*)>",
        build,
    )
}

/// `<someone@example.com>`.
pub fn automail() -> Result<RegexPattern, ConfigError> {
    fn build(_text: &str, caps: &Captures<'_>, _scanner: &InlineScanner<'_>) -> Built {
        let address = &caps["address"];
        Ok(Some(InlineSpan::Link {
            href: format!("mailto:{address}"),
            title: None,
            children: vec![InlineSpan::text(address)],
        }))
    }
    RegexPattern::new(
        "automail",
        r"<(?:[Mm][Aa][Ii][Ll][Tt][Oo]:)?(?P<address>[-.\w]+@[-\w]+(?:\.[-\w]+)*)>",
        build,
    )
}
