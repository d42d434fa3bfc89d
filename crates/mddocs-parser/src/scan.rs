//! Whole-document scans over a slice of lines.
//!
//! Each scan runs its own [`FenceTracker`], so fenced content never yields
//! headers or links.

use crate::parsers::{
    FenceTracker, HtmlImageRule, LineClassifier, MarkdownImageRule, MarkdownLinkRule,
    classify_header, classify_url,
};
use mddocs_core::{Header, HeaderIndex, Link, LinkInventory, LinkKind, Span};
use std::collections::HashMap;

/// All ATX headers outside fences, keyed by depth
pub fn scan_headers<S: AsRef<str>>(lines: &[S]) -> HeaderIndex {
    let mut fences = FenceTracker::new();
    let mut index = HeaderIndex::new();

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if fences.in_block(line) {
            continue;
        }
        if let Some((depth, text)) = classify_header(line) {
            index.entry(depth).or_default().push(Header {
                line: idx,
                depth,
                text,
            });
        }
    }

    index
}

/// Headers of every depth in document order
pub fn headers_in_order(index: &HeaderIndex) -> Vec<&Header> {
    let mut headers: Vec<&Header> = index.values().flatten().collect();
    headers.sort_by_key(|h| h.line);
    headers
}

/// Links, absolute links, relative links and images outside fences
pub fn scan_links<S: AsRef<str>>(lines: &[S]) -> LinkInventory {
    let mut fences = FenceTracker::new();
    let mut inventory = LinkInventory::default();

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if fences.in_block(line) {
            continue;
        }

        for m in MarkdownLinkRule.extract(line) {
            let relative = classify_url(&m.url);
            let link = Link {
                kind: if relative.is_some() {
                    LinkKind::RelativeMarkdown
                } else {
                    LinkKind::Absolute
                },
                line: idx,
                full: m.full,
                text: Some(m.text).filter(|t| !t.is_empty()),
                url: m.url,
                url_span: m.url_span,
                relative,
            };
            if link.is_relative() {
                inventory.relative.push(link.clone());
            } else {
                inventory.absolute.push(link.clone());
            }
            inventory.all.push(link);
        }

        let mut images: Vec<Link> = MarkdownImageRule
            .extract(line)
            .into_iter()
            .map(|m| Link {
                kind: LinkKind::Image,
                line: idx,
                relative: classify_url(&m.url),
                full: m.full,
                text: m.caption,
                url: m.url,
                url_span: m.url_span,
            })
            .collect();

        images.extend(HtmlImageRule.extract(line).into_iter().map(|m| {
            let url = m.src.unwrap_or_default();
            Link {
                kind: LinkKind::HtmlImage,
                line: idx,
                relative: if url.is_empty() { None } else { classify_url(&url) },
                full: m.full,
                text: None,
                url_span: m.src_span.unwrap_or(Span::new(m.span.start, m.span.start)),
                url,
            }
        }));

        images.sort_by_key(|l| l.url_span.start);
        inventory.images.extend(images);
    }

    inventory
}

/// Exact line text to every 0-based line number carrying it
pub fn line_lookup<S: AsRef<str>>(lines: &[S]) -> HashMap<String, Vec<usize>> {
    let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, line) in lines.iter().enumerate() {
        lookup.entry(line.as_ref().to_string()).or_default().push(idx);
    }
    lookup
}
