//! Markdown link and image rules: `[text](url)`, `![caption](url)`
//!
//! Both accept an optional title (`[text](url "title")`) and angle-bracketed
//! URLs (`[text](<url with spaces>)`). Spans in the matches are byte offsets
//! into the line.

use super::LineClassifier;
use mddocs_core::Span;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Rust's regex has no look-behind, so images are filtered out after matching.
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[(?P<text>[^\[\]]*(?:\[[^\[\]]*\][^\[\]]*)*)\]\((?:<(?P<angle>[^>]*)>|(?P<url>[^()\s"]*))(?:\s+"(?P<title>[^"]*)")?\)"#,
    )
    .unwrap()
});

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"!\[(?P<caption>[^\[\]]*)\]\((?:<(?P<angle>[^>]*)>|(?P<url>[^()\s"]*))(?:\s+"(?P<title>[^"]*)")?\)"#,
    )
    .unwrap()
});

/// Fast pre-filter: skip regex if no link pattern exists.
#[inline]
fn has_link_syntax(line: &str) -> bool {
    line.contains("](")
}

/// The URL capture, preferring the angle-bracketed form
fn url_capture<'a>(caps: &Captures<'a>) -> Option<regex::Match<'a>> {
    caps.name("angle").or_else(|| caps.name("url"))
}

/// One `[text](url)` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub full: String,
    pub text: String,
    pub url: String,
    pub span: Span,
    pub url_span: Span,
}

/// One `![caption](url)` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    pub full: String,
    /// `None` when the caption is empty or whitespace
    pub caption: Option<String>,
    pub url: String,
    pub span: Span,
    pub url_span: Span,
}

/// Matches text links, never images
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLinkRule;

impl LineClassifier for MarkdownLinkRule {
    type Match = LinkMatch;

    fn matches(&self, line: &str) -> bool {
        !self.extract(line).is_empty()
    }

    fn extract(&self, line: &str) -> Vec<LinkMatch> {
        if !has_link_syntax(line) {
            return Vec::new();
        }

        MARKDOWN_LINK
            .captures_iter(line)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                if full.start() > 0 && line.as_bytes().get(full.start() - 1) == Some(&b'!') {
                    return None;
                }
                let url = url_capture(&caps)?;
                Some(LinkMatch {
                    full: full.as_str().to_string(),
                    text: caps
                        .name("text")
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                    url: url.as_str().to_string(),
                    span: Span::new(full.start(), full.end()),
                    url_span: Span::new(url.start(), url.end()),
                })
            })
            .collect()
    }
}

/// Matches Markdown images
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownImageRule;

impl LineClassifier for MarkdownImageRule {
    type Match = ImageMatch;

    fn matches(&self, line: &str) -> bool {
        has_link_syntax(line) && MARKDOWN_IMAGE.is_match(line)
    }

    fn extract(&self, line: &str) -> Vec<ImageMatch> {
        if !has_link_syntax(line) {
            return Vec::new();
        }

        MARKDOWN_IMAGE
            .captures_iter(line)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let url = url_capture(&caps)?;
                let caption = caps
                    .name("caption")
                    .map(|m| m.as_str().trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
                Some(ImageMatch {
                    full: full.as_str().to_string(),
                    caption,
                    url: url.as_str().to_string(),
                    span: Span::new(full.start(), full.end()),
                    url_span: Span::new(url.start(), url.end()),
                })
            })
            .collect()
    }
}

/// Replace every text link in `text` with its link text, and every image
/// with its caption.
pub fn replace_links_with_text(text: &str) -> String {
    if !has_link_syntax(text) {
        return text.to_string();
    }
    let without_images = MARKDOWN_IMAGE.replace_all(text, "$caption");
    MARKDOWN_LINK
        .replace_all(&without_images, "$text")
        .into_owned()
}
