//! # mddocs Parser
//!
//! Line-oriented classification of Markdown documents.
//!
//! This crate provides:
//! - Regex classifiers for ATX headers, links, images, `<img>` tags, URLs,
//!   attribute syntax and fence delimiters, all behind [`LineClassifier`]
//! - A [`FenceTracker`] that suppresses classification inside code and YAML blocks
//! - YAML metadata extraction with left-to-right merging
//! - Header text to anchor derivation
//!
//! Patterns are compiled once per process (`LazyLock` / `lazy_static`) and
//! shared by every document.
//!
//! ## Quick Start
//!
//! ```
//! use mddocs_parser::prelude::*;
//!
//! let lines = ["# Intro {#start}", "See [chapter one](ch1.md#overview)."];
//!
//! let headers = scan_headers(&lines);
//! assert_eq!(section_to_anchor(&headers[&1][0].text), "start");
//!
//! let links = scan_links(&lines);
//! assert_eq!(links.relative[0].target_path(), Some("ch1.md"));
//! assert_eq!(links.relative[0].section(), Some("overview"));
//! ```

pub mod anchors;
pub mod parsers;
pub mod scan;

pub use anchors::{clean_header_text, section_to_anchor, title_case};
pub use parsers::{FenceState, FenceTracker, LineClassifier, extract_yaml};
pub use scan::{headers_in_order, line_lookup, scan_headers, scan_links};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::anchors::{clean_header_text, section_to_anchor, title_case};
    pub use crate::parsers::{
        ATX_HEADERS, AbsoluteUrlRule, AttributeSyntaxRule, CodeFenceRule, FenceState,
        FenceTracker, HtmlImageRule, LineClassifier, MarkdownImageRule, MarkdownLinkRule,
        RelativeUrlRule, YamlFenceRule, extract_yaml,
    };
    pub use crate::scan::{headers_in_order, line_lookup, scan_headers, scan_links};
}
