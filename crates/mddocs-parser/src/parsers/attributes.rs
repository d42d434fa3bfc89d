//! Attribute syntax rule: `{#id .class key=value}`

use super::LineClassifier;
use mddocs_core::Span;
use regex::Regex;
use std::sync::LazyLock;

/// The body must start with `#`, `.` or `key=` so that plain braces in prose
/// are not mistaken for attributes.
static ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*(?P<body>(?:[#.][^\s{}]+|[A-Za-z_][\w\-]*=)[^{}]*)\}").unwrap()
});

/// One attribute block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub full: String,
    /// The first `#id` token, without the `#`
    pub id: Option<String>,
    pub span: Span,
}

/// Matches attribute blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeSyntaxRule;

impl LineClassifier for AttributeSyntaxRule {
    type Match = AttributeMatch;

    fn matches(&self, line: &str) -> bool {
        line.contains('{') && ATTRIBUTES.is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<AttributeMatch> {
        if !line.contains('{') {
            return Vec::new();
        }

        ATTRIBUTES
            .captures_iter(line)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let body = caps.name("body")?.as_str();
                let id = body
                    .split_whitespace()
                    .find_map(|token| token.strip_prefix('#'))
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
                Some(AttributeMatch {
                    full: full.as_str().to_string(),
                    id,
                    span: Span::new(full.start(), full.end()),
                })
            })
            .collect()
    }
}

/// Remove every attribute block from `text`
pub fn strip_attributes(text: &str) -> String {
    if !text.contains('{') {
        return text.to_string();
    }
    ATTRIBUTES.replace_all(text, "").into_owned()
}
