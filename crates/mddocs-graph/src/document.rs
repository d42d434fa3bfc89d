//! Markdown documents with lazily derived views.
//!
//! A [`MarkdownDocument`] loads its lines on first use and derives headers,
//! YAML metadata and link inventories on demand, caching each view
//! separately. Equality, hashing and ordering use the path only.

use mddocs_core::prelude::*;
use mddocs_core::normalize_path;
use mddocs_parser::{extract_yaml, line_lookup, scan_headers, scan_links, title_case};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Anything backed by a file of lines
pub trait Document {
    fn path(&self) -> &Path;

    /// Lines without terminators, loaded on first access
    fn contents(&self) -> Result<&[String]>;
}

/// Read a UTF-8 file into lines, mapping a missing file to `FileNotFound`
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::file_not_found(path),
        _ => Error::Io(e),
    })?;
    Ok(text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::to_string)
        .collect())
}

/// Display title derived from a file name: `_` and `-` become spaces and the
/// words are title-cased.
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default();
    title_case(&stem)
}

/// A Markdown file
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    path: PathBuf,
    contents: OnceLock<Vec<String>>,
    headers: OnceLock<HeaderIndex>,
    metadata: OnceLock<YamlMetadata>,
    links: OnceLock<LinkInventory>,
}

impl MarkdownDocument {
    /// Document at `path`; nothing is read until a view is requested
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            contents: OnceLock::new(),
            headers: OnceLock::new(),
            metadata: OnceLock::new(),
            links: OnceLock::new(),
        }
    }

    /// Document with preloaded contents, used for in-memory transforms
    pub fn with_contents(path: impl AsRef<Path>, lines: Vec<String>) -> Self {
        let doc = Self::new(path);
        let _ = doc.contents.set(lines);
        doc
    }

    /// Document read eagerly from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let doc = Self::new(path);
        doc.contents()?;
        Ok(doc)
    }

    /// Header index, depth to headers in line order
    pub fn headers(&self) -> Result<&HeaderIndex> {
        if let Some(headers) = self.headers.get() {
            return Ok(headers);
        }
        let headers = scan_headers(self.contents()?);
        Ok(self.headers.get_or_init(|| headers))
    }

    /// Headers of every depth in document order
    pub fn headers_in_order(&self) -> Result<Vec<&Header>> {
        Ok(mddocs_parser::headers_in_order(self.headers()?))
    }

    /// Merged YAML metadata; empty when the document has no block
    pub fn yaml_block(&self) -> Result<&YamlMetadata> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let metadata = extract_yaml(self.contents()?).map_err(|e| e.in_file(&self.path))?;
        Ok(self.metadata.get_or_init(|| metadata))
    }

    /// All, absolute, relative and image link views
    pub fn links(&self) -> Result<&LinkInventory> {
        if let Some(links) = self.links.get() {
            return Ok(links);
        }
        let links = scan_links(self.contents()?);
        Ok(self.links.get_or_init(|| links))
    }

    /// Exact line text to the line numbers carrying it
    pub fn line_look_up(&self) -> Result<HashMap<String, Vec<usize>>> {
        Ok(line_lookup(self.contents()?))
    }

    /// YAML `title`, or a title derived from the file name
    pub fn display_title(&self) -> Result<String> {
        Ok(self
            .yaml_block_lenient()?
            .and_then(YamlMetadata::title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_from_path(&self.path)))
    }

    /// Like [`yaml_block`](Self::yaml_block), but a block that does not
    /// parse is logged and yields `None`. I/O errors still propagate.
    pub fn yaml_block_lenient(&self) -> Result<Option<&YamlMetadata>> {
        match self.yaml_block() {
            Ok(metadata) => Ok(Some(metadata)),
            Err(err @ Error::MalformedYaml { .. }) => {
                log::warn!("{}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Absolute path a relative link points at, resolved against this
    /// document's directory. `None` for absolute and anchor-only links.
    pub fn resolve_target(&self, link: &Link) -> Option<PathBuf> {
        let target = link.target_path()?;
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        Some(normalize_path(&parent.join(target)))
    }

    /// Mutable access to the lines. Derived views are discarded.
    pub fn lines_mut(&mut self) -> Result<&mut Vec<String>> {
        self.contents()?;
        self.invalidate();
        self.contents
            .get_mut()
            .ok_or_else(|| Error::other(format!("{} has no contents", self.path.display())))
    }

    /// Replace the lines. Derived views are discarded.
    pub fn set_contents(&mut self, lines: Vec<String>) {
        self.invalidate();
        self.contents = OnceLock::new();
        let _ = self.contents.set(lines);
    }

    /// Append lines to the end of the document
    pub fn append<I: IntoIterator<Item = String>>(&mut self, lines: I) -> Result<()> {
        self.lines_mut()?.extend(lines);
        Ok(())
    }

    /// Move the document to a new path, keeping its contents
    pub fn relocate(mut self, path: impl AsRef<Path>) -> Self {
        self.path = normalize_path(path.as_ref());
        self
    }

    /// Write the lines to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut text = self.contents()?.join("\n");
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.headers = OnceLock::new();
        self.metadata = OnceLock::new();
        self.links = OnceLock::new();
    }
}

impl Document for MarkdownDocument {
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

impl PartialEq for MarkdownDocument {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for MarkdownDocument {}

impl Hash for MarkdownDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for MarkdownDocument {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MarkdownDocument {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}
