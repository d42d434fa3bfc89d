//! Document discovery under a root directory.

use crate::document::MarkdownDocument;
use crate::list::ListDocument;
use mddocs_core::normalize_path;
use mddocs_core::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

/// Files below `root` with the given extension (case-insensitive), sorted
pub fn find_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::file_not_found(root));
    }

    let mut files = Vec::with_capacity(100);
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(normalize_path(path));
        }
    }

    files.sort();
    log::debug!("Found {} .{} files under {}", files.len(), extension, root.display());
    Ok(files)
}

/// Every Markdown document below `root`, loaded in parallel
#[instrument(skip(root), fields(root = %root.display()), name = "search_markdown")]
pub fn search_markdown(root: &Path) -> Result<Vec<MarkdownDocument>> {
    let docs = find_files(root, "md")?
        .par_iter()
        .map(MarkdownDocument::load)
        .collect::<Result<Vec<_>>>()?;
    log::info!("{} Markdown files were found", docs.len());
    Ok(docs)
}

/// Every list file below `root`; contents load on first use
pub fn search_lists(root: &Path) -> Result<Vec<ListDocument>> {
    let lists: Vec<_> = find_files(root, "lst")?
        .into_iter()
        .map(ListDocument::new)
        .collect();
    log::info!("{} LST files were found", lists.len());
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use tempfile::TempDir;

    #[test]
    fn test_discovery() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("a/b")).unwrap();
        std::fs::write(root.join("z.md"), "# Z").unwrap();
        std::fs::write(root.join("a/b/y.MD"), "# Y").unwrap();
        std::fs::write(root.join("a/notes.txt"), "").unwrap();
        std::fs::write(root.join("a/all.lst"), "../z.md").unwrap();

        let docs = search_markdown(root).unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path().to_path_buf()).collect();
        assert_eq!(paths, vec![root.join("a/b/y.MD"), root.join("z.md")]);

        let lists = search_lists(root).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].links().unwrap(), &[root.join("z.md")]);
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            find_files(Path::new("/definitely/not/here"), "md"),
            Err(Error::FileNotFound { .. })
        ));
    }
}
