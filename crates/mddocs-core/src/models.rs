//! Core data models for documents, links, headers and metadata.
//!
//! These types are plain values:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Position-aware**: Links carry 0-based line numbers and byte spans
//! - **Type-Safe**: Enums replace magic strings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-open byte range `[start, end)` within a string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translate a span relative to some substring into the enclosing string.
    pub fn offset_by(&self, base: usize) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

/// Classification of a link found in a Markdown line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// `[text](https://...)`, `[text](mailto:...)`
    Absolute,
    /// `[text](path/file.md#section)` or `[text](#section)`
    RelativeMarkdown,
    /// `![caption](path/image.png)`
    Image,
    /// `<img src="path/image.png">`
    HtmlImage,
}

impl LinkKind {
    /// True for either image flavour
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image | Self::HtmlImage)
    }
}

/// Decomposition of a non-absolute URL into path and section anchor.
///
/// Spans are relative to the URL string, not the line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativeUrl {
    /// `None` for anchor-only links such as `#intro`
    pub path: Option<String>,
    pub path_span: Option<Span>,
    pub section: Option<String>,
    pub section_span: Option<Span>,
}

impl RelativeUrl {
    /// True when neither a path nor a section is present
    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.section.is_none()
    }

    /// True when the path ends with the Markdown extension
    pub fn targets_markdown(&self) -> bool {
        self.path
            .as_deref()
            .is_some_and(|p| p.to_ascii_lowercase().ends_with(".md"))
    }
}

/// A link, image or HTML image found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub kind: LinkKind,
    /// 0-based line number in the owning document
    pub line: usize,
    /// The complete matched text
    pub full: String,
    /// Link text or image caption, `None` when empty or absent
    pub text: Option<String>,
    /// The URL (or `src`) exactly as written; empty for `<img>` without `src`
    pub url: String,
    /// Location of `url` within the line
    pub url_span: Span,
    /// Present when `url` is not scheme-qualified
    pub relative: Option<RelativeUrl>,
}

impl Link {
    /// True when the link has no scheme
    pub fn is_relative(&self) -> bool {
        self.relative.is_some()
    }

    /// Target path portion of a relative URL
    pub fn target_path(&self) -> Option<&str> {
        self.relative.as_ref().and_then(|r| r.path.as_deref())
    }

    /// Section anchor portion of a relative URL
    pub fn section(&self) -> Option<&str> {
        self.relative.as_ref().and_then(|r| r.section.as_deref())
    }

    /// Span of the target path within the line
    pub fn path_span_in_line(&self) -> Option<Span> {
        self.relative
            .as_ref()
            .and_then(|r| r.path_span)
            .map(|s| s.offset_by(self.url_span.start))
    }
}

/// All link views of one document, each ordered by line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInventory {
    /// Every `[text](url)` link, absolute and relative
    pub all: Vec<Link>,
    pub absolute: Vec<Link>,
    pub relative: Vec<Link>,
    /// Markdown and HTML images
    pub images: Vec<Link>,
}

/// An ATX header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// 0-based line number
    pub line: usize,
    /// 1 through 6
    pub depth: u8,
    /// Raw header text, including any attribute syntax or link markup
    pub text: String,
}

/// Headers keyed by depth, each list in line order
pub type HeaderIndex = BTreeMap<u8, Vec<Header>>;

/// Inclusive range of delimiter lines enclosing one YAML block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Merged YAML metadata of a document.
///
/// Later blocks overwrite keys defined by earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YamlMetadata {
    pub data: serde_json::Map<String, serde_json::Value>,
    pub blocks: Vec<LineRange>,
}

impl YamlMetadata {
    /// True when no YAML block was found
    pub fn has_block(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// True when no keys were defined
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// The `title` key, rendered as text
    pub fn title(&self) -> Option<String> {
        self.get("title").and_then(scalar_to_string)
    }

    /// The `UUID` (or `uuid`) key, rendered as text. `Some("")` when present
    /// but null or blank.
    pub fn uuid(&self) -> Option<String> {
        self.get("UUID")
            .or_else(|| self.get("uuid"))
            .map(|v| scalar_to_string(v).unwrap_or_default())
    }

    /// The `date` key, rendered as text
    pub fn date(&self) -> Option<String> {
        self.get("date").and_then(scalar_to_string)
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
