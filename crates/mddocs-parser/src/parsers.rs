//! Line classifiers.
//!
//! Every classifier is a stateless rule built on a regular expression that is
//! compiled once per process. Classifiers never look at fence state; callers
//! skip fenced lines with a [`FenceTracker`](fences::FenceTracker).

mod attributes;
pub mod fences;
mod headers;
mod html_images;
pub mod link_utils;
mod markdown_links;
pub mod yaml_block;

pub use self::attributes::{AttributeMatch, AttributeSyntaxRule, strip_attributes};
pub use self::fences::{CodeFenceRule, FenceState, FenceTracker, YamlFenceRule};
pub use self::headers::{ATX_HEADERS, AtxHeaderRule, classify_header};
pub use self::html_images::{HtmlImageMatch, HtmlImageRule};
pub use self::link_utils::{AbsoluteUrlRule, RelativeUrlRule, classify_url};
pub use self::markdown_links::{
    ImageMatch, LinkMatch, MarkdownImageRule, MarkdownLinkRule, replace_links_with_text,
};
pub use self::yaml_block::{extract_yaml, find_yaml_blocks};

/// A pure, reusable pattern rule applied to one line (or one URL) at a time.
pub trait LineClassifier {
    /// Structured data produced for each occurrence
    type Match;

    /// True when the rule matches anywhere in `line`
    fn matches(&self, line: &str) -> bool;

    /// Every occurrence in `line`, left to right. Empty when nothing matches.
    fn extract(&self, line: &str) -> Vec<Self::Match>;
}
