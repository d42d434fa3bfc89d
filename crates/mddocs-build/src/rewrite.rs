//! Span-based link and image rewriting.
//!
//! Every transform produces [`Edit`]s against byte spans recorded by the
//! link scan. Edits on a line are applied right to left, so several links on
//! one line are rewritten without reparsing it.

use mddocs_core::prelude::*;
use mddocs_core::{normalize_path, relative_path, to_url_path};
use mddocs_graph::{Document, MarkdownDocument};
use mddocs_parser::scan_links;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Replacement of one byte range on one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// 0-based line number
    pub line: usize,
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn new(line: usize, span: Span, replacement: impl Into<String>) -> Self {
        Self {
            line,
            span,
            replacement: replacement.into(),
        }
    }
}

/// Apply edits to a single line, rightmost first. An edit overlapping one
/// already applied is skipped.
pub fn apply_edits(line: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| Reverse(e.span.start));
    let mut out = line.to_string();
    let mut limit = out.len();
    for edit in edits {
        if edit.span.start > edit.span.end || edit.span.end > limit {
            log::debug!("Skipping overlapping edit at {:?}", edit.span);
            continue;
        }
        out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        limit = edit.span.start;
    }
    out
}

/// How relative Markdown links are rewritten
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// `ch1.md#intro` becomes `ch1.html#intro`
    #[default]
    Extension,
    /// `ch1.md#intro` becomes `#intro`; a link without an anchor is fatal
    AnchorOnly,
}

fn is_markdown_link(link: &Link) -> bool {
    link.kind == LinkKind::RelativeMarkdown
        && link.relative.as_ref().is_some_and(|r| r.targets_markdown())
}

/// Replace the `.md` extension of every relative Markdown link with `.html`
pub fn extension_edits<'a>(links: impl IntoIterator<Item = &'a Link>) -> Vec<Edit> {
    links
        .into_iter()
        .filter(|link| is_markdown_link(link))
        .filter_map(|link| {
            let path = link.path_span_in_line()?;
            Some(Edit::new(
                link.line,
                Span::new(path.end - ".md".len(), path.end),
                ".html",
            ))
        })
        .collect()
}

/// Drop the path of every relative Markdown link, leaving its anchor
pub fn anchor_only_edits<'a>(
    file: &Path,
    links: impl IntoIterator<Item = &'a Link>,
) -> Result<Vec<Edit>> {
    links
        .into_iter()
        .filter(|link| is_markdown_link(link))
        .map(|link| match (link.section(), link.path_span_in_line()) {
            (Some(_), Some(path)) => Ok(Edit::new(link.line, path, "")),
            _ => Err(Error::missing_section_anchor(file, link.line, &link.full)),
        })
        .collect()
}

/// Rewrite a single line for multi-file output
///
/// ```
/// use mddocs_build::rewrite::rewrite_extension;
///
/// assert_eq!(
///     rewrite_extension("[a](../ch1.md#sec-1) and [b](https://x.y/c.md)"),
///     "[a](../ch1.html#sec-1) and [b](https://x.y/c.md)"
/// );
/// ```
pub fn rewrite_extension(line: &str) -> String {
    let links = scan_links(&[line]);
    apply_edits(line, extension_edits(&links.relative))
}

/// Rewrite a single line for merged output. `line_number` is 0-based and
/// only used for the error.
pub fn rewrite_anchor_only(file: &Path, line_number: usize, line: &str) -> Result<String> {
    let links: Vec<Link> = scan_links(&[line])
        .relative
        .into_iter()
        .map(|mut link| {
            link.line = line_number;
            link
        })
        .collect();
    let edits = anchor_only_edits(file, &links)?;
    Ok(apply_edits(line, edits))
}

/// Flattens local images under an assets directory to `assets/<name>`.
///
/// The same rewriter should see every document of a build so that two
/// different assets flattening to the same name are reported. Nothing is
/// renamed when that happens.
#[derive(Debug, Clone)]
pub struct ImageRewriter {
    documents_root: PathBuf,
    assets_dir: PathBuf,
    assets_name: String,
    merged: bool,
    flattened: HashMap<String, PathBuf>,
}

impl ImageRewriter {
    pub fn new(documents_root: impl AsRef<Path>, assets_dir: impl AsRef<Path>) -> Self {
        let assets_dir = normalize_path(assets_dir.as_ref());
        let assets_name = assets_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assets".to_string());
        Self {
            documents_root: normalize_path(documents_root.as_ref()),
            assets_dir,
            assets_name,
            merged: false,
            flattened: HashMap::new(),
        }
    }

    /// Every document ends up in one file at the documents root
    pub fn merged(mut self) -> Self {
        self.merged = true;
        self
    }

    fn flattened_url(&self, doc_dir: &Path, name: &str) -> String {
        let prefix = if self.merged {
            PathBuf::new()
        } else {
            relative_path(doc_dir, &self.documents_root)
        };
        if prefix.as_os_str().is_empty() {
            format!("./{}/{}", self.assets_name, name)
        } else {
            format!("{}/{}/{}", to_url_path(&prefix), self.assets_name, name)
        }
    }

    /// Edits for the images of one document, recording findings in `report`
    pub fn image_edits(
        &mut self,
        doc: &MarkdownDocument,
        report: &mut ValidationReport,
    ) -> Result<Vec<Edit>> {
        let path = doc.path();
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut edits = Vec::new();

        for image in &doc.links()?.images {
            if image.kind == LinkKind::Image && image.text.is_none() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::MissingCaption,
                        path,
                        format!("`{}`", image.full),
                    )
                    .with_line(image.line),
                );
            }
            if image.kind == LinkKind::HtmlImage && image.url.is_empty() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::HtmlImageMissingSource,
                        path,
                        format!("`{}`", image.full),
                    )
                    .with_line(image.line),
                );
                continue;
            }

            let Some(target) = image.target_path() else {
                continue;
            };
            let resolved = normalize_path(&dir.join(target));
            if !resolved.exists() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::BrokenImage,
                        path,
                        format!("`{}`", image.full),
                    )
                    .with_line(image.line),
                );
                continue;
            }
            if !resolved.starts_with(&self.assets_dir) {
                continue;
            }
            let Some(name) = resolved.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            match self.flattened.get(&name) {
                Some(previous) if previous != &resolved => {
                    report.add_issue(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueKind::AssetNameCollision,
                            path,
                            format!(
                                "{} and {} both flatten to {}",
                                previous.display(),
                                resolved.display(),
                                name
                            ),
                        )
                        .with_line(image.line),
                    );
                }
                Some(_) => {}
                None => {
                    self.flattened.insert(name.clone(), resolved.clone());
                }
            }

            let span = image.path_span_in_line().unwrap_or(image.url_span);
            edits.push(Edit::new(image.line, span, self.flattened_url(dir, &name)));
        }

        Ok(edits)
    }
}

/// Applies the link mode and, when configured, image flattening to whole
/// documents in place
#[derive(Debug, Clone, Default)]
pub struct DocumentRewriter {
    mode: LinkMode,
    images: Option<ImageRewriter>,
}

impl DocumentRewriter {
    pub fn new(mode: LinkMode) -> Self {
        Self { mode, images: None }
    }

    pub fn with_images(mut self, images: ImageRewriter) -> Self {
        self.images = Some(images);
        self
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Rewrite one document. Returns the image findings; a relative link
    /// without an anchor in [`LinkMode::AnchorOnly`] is an error.
    pub fn rewrite(&mut self, doc: &mut MarkdownDocument) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();

        let mut edits = {
            let links = doc.links()?;
            match self.mode {
                LinkMode::Extension => extension_edits(&links.relative),
                LinkMode::AnchorOnly => anchor_only_edits(doc.path(), &links.relative)?,
            }
        };
        if let Some(images) = self.images.as_mut() {
            edits.extend(images.image_edits(doc, &mut report)?);
        }
        if edits.is_empty() {
            return Ok(report);
        }

        let mut by_line: BTreeMap<usize, Vec<Edit>> = BTreeMap::new();
        for edit in edits {
            by_line.entry(edit.line).or_default().push(edit);
        }

        log::debug!(
            "Rewriting {} lines in {}",
            by_line.len(),
            doc.path().display()
        );
        let lines = doc.lines_mut()?;
        for (line, edits) in by_line {
            if let Some(text) = lines.get_mut(line) {
                *text = apply_edits(text, edits);
            }
        }

        Ok(report)
    }
}
