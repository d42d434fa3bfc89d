//! Table-of-contents and index synthesis from list files.
//!
//! Entries are Markdown list items carrying attribute classes the renderer
//! styles: `{.toc-file}` and `{.toc-file-section}` for tables of contents,
//! `{.index-file-date}` and `{.index-file-link}` for blog-style indexes.

use mddocs_core::prelude::*;
use mddocs_core::{relative_path, to_url_path};
use mddocs_graph::{Document, ListDocument, MarkdownDocument};
use mddocs_parser::{clean_header_text, section_to_anchor, title_case};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Deepest header level a TOC can include
pub const MAX_TOC_DEPTH: u8 = 6;

fn check_depth(depth: u8) -> Result<()> {
    if depth > MAX_TOC_DEPTH {
        return Err(Error::invalid_depth(depth));
    }
    Ok(())
}

/// URL of `path` relative to the list file's directory
fn url_from_list(list: &Path, path: &Path) -> String {
    let dir = list.parent().unwrap_or_else(|| Path::new(""));
    to_url_path(&relative_path(dir, path))
}

/// Entries for one document: the file itself, then its headers up to `depth`.
///
/// A header whose display text equals the document title is skipped, so a
/// document opening with its own title does not list it twice.
pub fn create_file_toc(doc: &MarkdownDocument, url: &str, depth: u8) -> Result<Vec<String>> {
    check_depth(depth)?;

    let title = doc.display_title()?;
    let mut entries = vec![format!("- [{title}]({url}){{.toc-file}}")];
    if depth == 0 {
        return Ok(entries);
    }

    for header in doc.headers_in_order()? {
        if header.depth > depth {
            continue;
        }
        let text = title_case(&clean_header_text(&header.text));
        if text == title {
            continue;
        }
        entries.push(format!(
            "{}- [{}]({}#{}){{.toc-file-section}}",
            "  ".repeat(header.depth as usize),
            text,
            url,
            section_to_anchor(&header.text)
        ));
    }

    Ok(entries)
}

/// Table of contents for every document a list resolves to, in list order,
/// surrounded by blank lines.
#[instrument(skip(list, ignore), fields(list = %list.path().display()), name = "create_toc")]
pub fn create_toc(
    list: &ListDocument,
    depth: u8,
    ignore: &HashSet<PathBuf>,
) -> Result<Vec<String>> {
    check_depth(depth)?;

    let mut toc = vec![String::new()];
    for path in list.links()? {
        if ignore.contains(path) {
            log::debug!("Leaving {} out of the TOC", path.display());
            continue;
        }
        let doc = MarkdownDocument::load(path)?;
        toc.extend(create_file_toc(&doc, &url_from_list(list.path(), path), depth)?);
    }
    toc.push(String::new());

    log::info!(
        "TOC for {} has {} entries",
        list.path().display(),
        toc.len() - 2
    );
    Ok(toc)
}

/// Blog-style index of every listed document with both a `date` and a
/// `title` in its metadata
pub fn create_blog_index(list: &ListDocument, ignore: &HashSet<PathBuf>) -> Result<Vec<String>> {
    let mut index = vec!["::: {.index-file-lst}".to_string()];
    for path in list.links()? {
        if ignore.contains(path) {
            continue;
        }
        let doc = MarkdownDocument::load(path)?;
        let Some(metadata) = doc.yaml_block_lenient()? else {
            continue;
        };
        let (Some(date), Some(title)) = (metadata.date(), metadata.title()) else {
            log::debug!("{} has no date or title, not indexed", path.display());
            continue;
        };
        index.push(format!(
            "- [{date}]{{.index-file-date}} - [{title}]({}){{.index-file-link}}",
            url_from_list(list.path(), path)
        ));
    }
    index.push(":::".to_string());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, text: &str) -> PathBuf {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    fn book() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "book.lst",
            "index.md\nchapters/getting-started.md\nchapters/hidden.md\n",
        );
        write(
            root,
            "index.md",
            "---\ntitle: Handbook\n---\n# Handbook\n## Who Should Read {#audience}\n",
        );
        write(
            root,
            "chapters/getting-started.md",
            "# Getting Started\n\nText\n## Install [the tool](tool.md)\n```\n# not a header\n```\n### Verify the setup\n#### Deep\n",
        );
        write(root, "chapters/hidden.md", "# Hidden\n");
        temp
    }

    #[test]
    fn test_toc_snapshot() {
        let temp = book();
        let root = temp.path();
        let list = ListDocument::new(root.join("book.lst"));
        let ignore = HashSet::from([root.join("chapters/hidden.md")]);

        let toc = create_toc(&list, 3, &ignore).unwrap();
        assert_eq!(toc.first().map(String::as_str), Some(""));
        assert_eq!(toc.last().map(String::as_str), Some(""));

        let rendered = toc[1..toc.len() - 1].join("\n");
        insta::assert_snapshot!("book_toc", rendered);
    }

    #[test]
    fn test_depth_zero_lists_files_only() {
        let temp = book();
        let list = ListDocument::new(temp.path().join("book.lst"));
        let toc = create_toc(&list, 0, &HashSet::new()).unwrap();
        assert_eq!(
            toc,
            vec![
                "",
                "- [Handbook](index.md){.toc-file}",
                "- [Getting Started](chapters/getting-started.md){.toc-file}",
                "- [Hidden](chapters/hidden.md){.toc-file}",
                "",
            ]
        );
    }

    #[test]
    fn test_invalid_depth() {
        let temp = book();
        let list = ListDocument::new(temp.path().join("book.lst"));
        assert!(matches!(
            create_toc(&list, 7, &HashSet::new()),
            Err(Error::InvalidDepth { depth: 7 })
        ));
    }

    #[test]
    fn test_file_toc_url_is_used_verbatim() {
        let doc = MarkdownDocument::with_contents(
            "/d/release_notes.md",
            vec!["# Changes".into(), "## Fixed".into()],
        );
        assert_eq!(
            create_file_toc(&doc, "../release_notes.md", 1).unwrap(),
            vec![
                "- [Release Notes](../release_notes.md){.toc-file}",
                "  - [Changes](../release_notes.md#changes){.toc-file-section}",
            ]
        );
    }

    #[test]
    fn test_blog_index() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "posts/posts.lst", "first.md\nsecond.md\nundated.md\n");
        write(root, "posts/first.md", "---\ntitle: First Post\ndate: 2024-01-02\n---\n");
        write(root, "posts/second.md", "---\ntitle: Second\ndate: 2024-03-04\n---\n");
        write(root, "posts/undated.md", "---\ntitle: Draft\n---\n");

        let list = ListDocument::new(root.join("posts/posts.lst"));
        let ignore = HashSet::from([root.join("posts/second.md")]);
        assert_eq!(
            create_blog_index(&list, &ignore).unwrap(),
            vec![
                "::: {.index-file-lst}",
                "- [2024-01-02]{.index-file-date} - [First Post](first.md){.index-file-link}",
                ":::",
            ]
        );
    }
}
