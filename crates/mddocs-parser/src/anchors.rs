//! Header text to anchor identifiers.
//!
//! The identifiers reproduce the renderer's automatic header identifiers so
//! that generated `file.html#anchor` links resolve after rendering.

use crate::parsers::{AttributeSyntaxRule, LineClassifier, replace_links_with_text, strip_attributes};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Derive the anchor identifier for raw header text.
///
/// An explicit `{#id}` wins outright. Otherwise links are replaced by their
/// text, the result is lowercased, whitespace runs become `-`, and anything
/// other than alphanumerics, `_`, `-` and `.` is dropped.
///
/// ```
/// use mddocs_parser::section_to_anchor;
///
/// assert_eq!(section_to_anchor("Heading identifiers in HTML"), "heading-identifiers-in-html");
/// assert_eq!(section_to_anchor("Preamble {#sec:ch0_0_preamble-1}"), "sec:ch0_0_preamble-1");
/// ```
pub fn section_to_anchor(text: &str) -> String {
    if let Some(id) = AttributeSyntaxRule
        .extract(text)
        .into_iter()
        .find_map(|attr| attr.id)
    {
        return id;
    }

    let text = replace_links_with_text(&strip_attributes(text)).to_lowercase();
    WHITESPACE
        .replace_all(text.trim(), "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Header text for display: attribute blocks removed, links replaced by
/// their text, surrounding whitespace trimmed.
pub fn clean_header_text(text: &str) -> String {
    replace_links_with_text(&strip_attributes(text))
        .trim()
        .to_string()
}

/// Title-case words: the first letter after any non-letter is uppercased and
/// every other letter lowercased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_id_short_circuits() {
        assert_eq!(section_to_anchor("Anything [x](y.md) at all {#custom}"), "custom");
        assert_eq!(section_to_anchor("{.cls #Mixed_Case} Title"), "Mixed_Case");
    }

    #[test]
    fn test_normalization_steps() {
        assert_eq!(section_to_anchor("Maître d'hôtel"), "maître-dhôtel");
        assert_eq!(section_to_anchor("*Dogs*?--in *my* house?"), "dogs--in-my-house");
        assert_eq!(section_to_anchor("Version 1.2   Notes"), "version-1.2-notes");
        assert_eq!(
            section_to_anchor("Using [pandoc-fignos](https://github.com/tomduck/pandoc-fignos)"),
            "using-pandoc-fignos"
        );
    }

    #[test]
    fn test_class_only_attributes_are_removed() {
        assert_eq!(section_to_anchor("Appendix {.unnumbered}"), "appendix");
    }

    #[test]
    fn test_idempotent_without_attributes() {
        for text in [
            "Heading identifiers in HTML",
            "  Spaced   Out  ",
            "Links [a](b.md) and ![img](c.png)",
            "Ünïcödé & symbols #1",
            "already-an-anchor_1.2",
        ] {
            let once = section_to_anchor(text);
            assert_eq!(section_to_anchor(&once), once, "{text}");
        }
    }

    #[test]
    fn test_clean_header_text() {
        assert_eq!(clean_header_text("Intro [Rust](r.md) {#intro}"), "Intro Rust");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting started"), "Getting Started");
        assert_eq!(title_case("API reference"), "Api Reference");
        assert_eq!(title_case("chapter 2b"), "Chapter 2B");
    }
}
