//! URL rules shared by link and image classification.
//!
//! A URL is either absolute (scheme-qualified) or relative. Relative URLs are
//! decomposed into a path and a section anchor, with byte spans into the URL
//! string so rewriting can touch one part and leave the other intact.

use super::LineClassifier;
use mddocs_core::{RelativeUrl, Span};
use regex::Regex;
use std::sync::LazyLock;

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://|mailto:|tel:)").unwrap()
});

static RELATIVE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<path>[^#]*)(?:#(?P<section>.*))?$").unwrap());

/// Matches scheme-qualified URLs
///
/// ```
/// use mddocs_parser::parsers::{AbsoluteUrlRule, LineClassifier};
///
/// assert!(AbsoluteUrlRule.matches("https://example.com"));
/// assert!(AbsoluteUrlRule.matches("mailto:someone@example.com"));
/// assert!(!AbsoluteUrlRule.matches("../docs/a.md"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteUrlRule;

impl LineClassifier for AbsoluteUrlRule {
    type Match = String;

    fn matches(&self, url: &str) -> bool {
        ABSOLUTE_URL.is_match(url.trim())
    }

    fn extract(&self, url: &str) -> Vec<String> {
        if self.matches(url) {
            vec![url.trim().to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Matches any URL that is not absolute and splits it into path and section
///
/// ```
/// use mddocs_parser::parsers::{LineClassifier, RelativeUrlRule};
///
/// let parts = RelativeUrlRule.extract("../ch1.md#sec-1");
/// assert_eq!(parts[0].path.as_deref(), Some("../ch1.md"));
/// assert_eq!(parts[0].section.as_deref(), Some("sec-1"));
///
/// let parts = RelativeUrlRule.extract("#intro");
/// assert_eq!(parts[0].path, None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeUrlRule;

impl LineClassifier for RelativeUrlRule {
    type Match = RelativeUrl;

    fn matches(&self, url: &str) -> bool {
        !AbsoluteUrlRule.matches(url)
    }

    fn extract(&self, url: &str) -> Vec<RelativeUrl> {
        if !self.matches(url) {
            return Vec::new();
        }
        decompose(url).into_iter().collect()
    }
}

fn decompose(url: &str) -> Option<RelativeUrl> {
    let caps = RELATIVE_URL.captures(url)?;
    let path = caps.name("path").filter(|m| !m.as_str().is_empty());
    let section = caps.name("section").filter(|m| !m.as_str().is_empty());
    Some(RelativeUrl {
        path: path.map(|m| m.as_str().to_string()),
        path_span: path.map(|m| Span::new(m.start(), m.end())),
        section: section.map(|m| m.as_str().to_string()),
        section_span: section.map(|m| Span::new(m.start(), m.end())),
    })
}

/// Classify a URL: `None` for absolute URLs, the decomposition otherwise.
pub fn classify_url(url: &str) -> Option<RelativeUrl> {
    RelativeUrlRule.extract(url).into_iter().next()
}
