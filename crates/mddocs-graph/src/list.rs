//! List files (`.lst`) and their recursive resolution.
//!
//! A list file names one Markdown (`.md`) or list (`.lst`) file per line,
//! relative to the list file's own directory. `#` starts a comment unless
//! escaped as `\#`. Nested lists are resolved depth-first and spliced in
//! place, so the result is the document order the list describes.

use crate::document::{Document, read_lines};
use mddocs_core::normalize_path;
use mddocs_core::prelude::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::instrument;

/// One non-blank, non-comment line of a list file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// 0-based line number
    pub line: usize,
    /// The entry as written, comment removed and trimmed
    pub token: String,
    /// Entry resolved against the list file's directory
    pub path: PathBuf,
}

/// Remove a trailing comment from a list file line and trim it.
///
/// ```
/// use mddocs_graph::list::strip_list_comment;
///
/// assert_eq!(strip_list_comment("  ch1/intro.md  # first"), "ch1/intro.md");
/// assert_eq!(strip_list_comment(r"notes\#1.md"), "notes#1.md");
/// assert_eq!(strip_list_comment("# only a comment"), "");
/// ```
pub fn strip_list_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Entries of one list file, without recursion
pub fn parse_list_entries<S: AsRef<str>>(list_path: &Path, lines: &[S]) -> Vec<ListEntry> {
    let dir = list_path.parent().unwrap_or_else(|| Path::new(""));
    lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            let token = strip_list_comment(text.as_ref());
            if token.is_empty() {
                return None;
            }
            let path = normalize_path(&dir.join(&token));
            Some(ListEntry { line, token, path })
        })
        .collect()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Resolve a list file to the ordered Markdown paths it describes.
///
/// Duplicates are preserved. A list that includes itself, directly or
/// through other lists, is an error, as is any entry that is neither
/// `.md` nor `.lst`.
#[instrument(skip(path), fields(list = %path.display()), name = "resolve_list")]
pub fn resolve_list(path: &Path) -> Result<Vec<PathBuf>> {
    let mut chain = Vec::new();
    resolve_recursive(&normalize_path(path), &mut chain)
}

fn resolve_recursive(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    chain.push(path.to_path_buf());
    let lines = read_lines(path)?;
    let mut resolved = Vec::new();

    for entry in parse_list_entries(path, &lines) {
        match extension_of(&entry.path).as_deref() {
            Some("md") => resolved.push(entry.path),
            Some("lst") => {
                if chain.contains(&entry.path) {
                    return Err(Error::self_referential_list(entry.path, chain));
                }
                log::debug!("{} includes {}", path.display(), entry.path.display());
                resolved.extend(resolve_recursive(&entry.path, chain)?);
            }
            _ => return Err(Error::unknown_list_extension(path, entry.path)),
        }
    }

    chain.pop();
    Ok(resolved)
}

/// Resolve independent list files in parallel. Fails on the first error.
pub fn resolve_lists(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Vec<PathBuf>)>> {
    paths
        .par_iter()
        .map(|p| resolve_list(p).map(|links| (p.clone(), links)))
        .collect()
}

/// Drop repeated paths, keeping the first occurrence of each
pub fn dedup_preserving_order<I: IntoIterator<Item = PathBuf>>(paths: I) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// A list file
#[derive(Debug, Clone)]
pub struct ListDocument {
    path: PathBuf,
    contents: OnceLock<Vec<String>>,
    links: OnceLock<Vec<PathBuf>>,
}

impl ListDocument {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            contents: OnceLock::new(),
            links: OnceLock::new(),
        }
    }

    /// Direct entries of this list, nested lists not expanded
    pub fn entries(&self) -> Result<Vec<ListEntry>> {
        Ok(parse_list_entries(&self.path, self.contents()?))
    }

    /// Markdown paths in list order, nested lists expanded, duplicates kept
    pub fn links(&self) -> Result<&[PathBuf]> {
        if let Some(links) = self.links.get() {
            return Ok(links);
        }
        let links = resolve_list(&self.path)?;
        Ok(self.links.get_or_init(|| links))
    }

    /// [`links`](Self::links) with repeats removed, first occurrence kept
    pub fn unique_links(&self) -> Result<Vec<PathBuf>> {
        Ok(dedup_preserving_order(self.links()?.iter().cloned()))
    }
}

impl Document for ListDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn contents(&self) -> Result<&[String]> {
        if let Some(lines) = self.contents.get() {
            return Ok(lines);
        }
        let lines = read_lines(&self.path)?;
        Ok(self.contents.get_or_init(|| lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_nested_resolution_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let a = write(root, "a.lst", "# heading comment\na.md\n\nsub/b.lst  # nested\n");
        write(root, "sub/b.lst", "../c.md\n");

        let links = resolve_list(&a).unwrap();
        assert_eq!(links, vec![root.join("a.md"), root.join("c.md")]);
    }

    #[test]
    fn test_direct_self_reference() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "x.md\na.lst\n");
        let err = resolve_list(&a).unwrap_err();
        assert!(matches!(err, Error::SelfReferentialList { .. }));
    }

    #[test]
    fn test_transitive_self_reference() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "b.lst\n");
        write(temp.path(), "b.lst", "./a.lst\n");
        let err = resolve_list(&a).unwrap_err();
        match err {
            Error::SelfReferentialList { path, .. } => assert_eq!(path, temp.path().join("a.lst")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shared_nested_list_is_not_a_cycle() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "b.lst\nc.lst\n");
        write(temp.path(), "b.lst", "d.lst\n");
        write(temp.path(), "c.lst", "d.lst\n");
        write(temp.path(), "d.lst", "d.md\n");

        let links = resolve_list(&a).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(dedup_preserving_order(links).len(), 1);
    }

    #[test]
    fn test_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "notes.txt\n");
        assert!(matches!(
            resolve_list(&a),
            Err(Error::UnknownListExtension { .. })
        ));
    }

    #[test]
    fn test_list_document_caches_links() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "one.md\ntwo.md\none.md\n");
        let lst = ListDocument::new(&a);
        assert_eq!(lst.links().unwrap().len(), 3);
        assert_eq!(
            lst.unique_links().unwrap(),
            vec![temp.path().join("one.md"), temp.path().join("two.md")]
        );
        assert_eq!(lst.entries().unwrap()[1].line, 1);
    }

    #[test]
    fn test_resolve_lists_in_parallel() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.lst", "a.md\n");
        let b = write(temp.path(), "b.lst", "b.md\n");
        let resolved = resolve_lists(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(resolved[0], (a, vec![temp.path().join("a.md")]));
        assert_eq!(resolved[1], (b, vec![temp.path().join("b.md")]));
    }
}
