//! HTML image rule: `<img src="...">`

use super::LineClassifier;
use mddocs_core::Span;
use regex::Regex;
use std::sync::LazyLock;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#).unwrap()
});

/// One `<img>` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlImageMatch {
    pub full: String,
    /// `None` when the tag has no `src`
    pub src: Option<String>,
    /// Location of the `src` value within the line
    pub src_span: Option<Span>,
    pub span: Span,
}

/// Matches `<img>` tags
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlImageRule;

impl LineClassifier for HtmlImageRule {
    type Match = HtmlImageMatch;

    fn matches(&self, line: &str) -> bool {
        IMG_TAG.is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<HtmlImageMatch> {
        IMG_TAG
            .find_iter(line)
            .map(|tag| {
                let src = SRC_ATTR
                    .captures(tag.as_str())
                    .and_then(|caps| caps.name("dq").or_else(|| caps.name("sq")));
                HtmlImageMatch {
                    full: tag.as_str().to_string(),
                    src: src.map(|m| m.as_str().to_string()),
                    src_span: src.map(|m| Span::new(m.start(), m.end()).offset_by(tag.start())),
                    span: Span::new(tag.start(), tag.end()),
                }
            })
            .collect()
    }
}
