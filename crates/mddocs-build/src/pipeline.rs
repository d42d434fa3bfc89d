//! Build preparation: turns the documents of the root list into Markdown
//! ready for an external renderer.
//!
//! ## Modes
//!
//! - [`BuildMode::Html`]: one output file per document. Configured tables
//!   of contents are appended to their index documents, `.md` links become
//!   `.html`.
//! - [`BuildMode::Single`]: every document concatenated into `single.md`.
//!   Links keep only their anchor; a link to another document without an
//!   anchor aborts the build.
//!
//! Images under the configured assets directory are flattened in both modes
//! and the assets are copied flat into `<output>/<assets name>/`.

use crate::plugins::{PluginContext, PluginRegistry};
use crate::rewrite::{DocumentRewriter, ImageRewriter, LinkMode};
use mddocs_core::prelude::*;
use mddocs_core::{normalize_path, relative_path};
use mddocs_graph::{Document, ListDocument, MarkdownDocument};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

/// Name of the merged document
pub const SINGLE_DOCUMENT: &str = "single.md";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    #[default]
    Html,
    Single,
}

impl BuildMode {
    pub fn link_mode(&self) -> LinkMode {
        match self {
            Self::Html => LinkMode::Extension,
            Self::Single => LinkMode::AnchorOnly,
        }
    }
}

/// Rewritten documents, not yet written
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub mode: BuildMode,
    /// In output order; paths are still under the documents root
    pub documents: Vec<MarkdownDocument>,
    /// Image findings from rewriting
    pub findings: ValidationReport,
}

/// What a build wrote
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub documents: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    /// Files written by navigation and JSON plugins
    pub generated: Vec<PathBuf>,
    pub findings: ValidationReport,
}

/// Prepares and writes builds for one project
#[derive(Debug)]
pub struct Builder {
    config: ProjectConfig,
    registry: PluginRegistry,
}

impl Builder {
    /// Builder using the built-in plugins
    pub fn new(config: ProjectConfig) -> Self {
        Self::with_registry(config, PluginRegistry::with_defaults())
    }

    pub fn with_registry(config: ProjectConfig, registry: PluginRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    fn documents_root(&self) -> PathBuf {
        normalize_path(&self.config.documents.path)
    }

    /// Load and rewrite the documents of the root list
    #[instrument(skip(self), name = "prepare_build")]
    pub fn prepare(&self, mode: BuildMode) -> Result<PreparedBuild> {
        let root = self.documents_root();
        let root_lst = self
            .config
            .root_lst()
            .ok_or_else(|| Error::config_error("documents.lst is required to build"))?;

        let links = ListDocument::new(&root_lst).unique_links()?;
        let mut documents = links
            .par_iter()
            .map(MarkdownDocument::load)
            .collect::<Result<Vec<_>>>()?;
        log::info!("{} documents listed in {}", documents.len(), root_lst.display());

        if mode == BuildMode::Html {
            self.inject_tocs(&root, &mut documents)?;
        }

        let mut rewriter = DocumentRewriter::new(mode.link_mode());
        if let Some(assets) = self.config.assets_dir() {
            let images = ImageRewriter::new(&root, assets);
            rewriter = rewriter.with_images(match mode {
                BuildMode::Html => images,
                BuildMode::Single => images.merged(),
            });
        }

        let mut findings = ValidationReport::new();
        for doc in &mut documents {
            findings.merge(rewriter.rewrite(doc)?);
        }

        if mode == BuildMode::Single {
            documents = vec![merge_documents(&root.join(SINGLE_DOCUMENT), &documents)?];
        }

        findings.sort();
        Ok(PreparedBuild {
            mode,
            documents,
            findings,
        })
    }

    /// Append every configured TOC to its index document. An index outside
    /// the listed documents is loaded, or started empty, and placed first.
    fn inject_tocs(&self, root: &Path, documents: &mut Vec<MarkdownDocument>) -> Result<()> {
        let ignore = self.config.ignore_toc_paths();

        for toc in &self.config.documents.tocs {
            let plugin = self.registry.toc_or_default(&toc.plugin)?;
            let list = ListDocument::new(root.join(&toc.lst));
            let lines = plugin.generate(&list, toc.depth, &ignore)?;

            let index = normalize_path(&root.join(&toc.index));
            match documents.iter_mut().find(|d| d.path() == index.as_path()) {
                Some(doc) => doc.append(lines)?,
                None => {
                    let mut doc = if index.exists() {
                        MarkdownDocument::load(&index)?
                    } else {
                        MarkdownDocument::with_contents(&index, Vec::new())
                    };
                    doc.append(lines)?;
                    documents.insert(0, doc);
                }
            }
            log::info!("{} TOC added to {}", plugin.name(), index.display());
        }

        Ok(())
    }

    /// Write prepared documents, copy assets and run the configured plugins
    #[instrument(skip(self, prepared), fields(mode = ?prepared.mode), name = "write_build")]
    pub fn write(&self, prepared: PreparedBuild) -> Result<BuildOutput> {
        let root = self.documents_root();
        let output = normalize_path(&self.config.output);
        std::fs::create_dir_all(&output)?;

        let mut documents = Vec::with_capacity(prepared.documents.len());
        for doc in &prepared.documents {
            let dest = output.join(relative_path(&root, doc.path()));
            doc.write_to(&dest)?;
            log::debug!("Wrote {}", dest.display());
            documents.push(dest);
        }

        let assets = match self.config.assets_dir() {
            Some(dir) if dir.is_dir() => {
                let name = dir.file_name().map(PathBuf::from).unwrap_or_else(|| "assets".into());
                copy_assets_flat(&dir, &output.join(name))?
            }
            Some(dir) => {
                log::warn!("Assets directory {} does not exist", dir.display());
                Vec::new()
            }
            None => Vec::new(),
        };

        let ignore = self.config.ignore_toc_paths();
        let ctx = PluginContext {
            documents_root: &root,
            output: &output,
            ignore: &ignore,
        };
        let mut generated = Vec::new();
        if let Some(name) = &self.config.navigation_plugin {
            generated.push(self.registry.navigation(name)?.generate(&prepared.documents, &ctx)?);
        }
        if let Some(name) = &self.config.json_plugin {
            generated.push(self.registry.json(name)?.generate(&prepared.documents, &ctx)?);
        }

        log::info!(
            "Build wrote {} documents and {} assets to {}",
            documents.len(),
            assets.len(),
            output.display()
        );
        Ok(BuildOutput {
            documents,
            assets,
            generated,
            findings: prepared.findings,
        })
    }

    /// Prepare and write in one step
    pub fn build(&self, mode: BuildMode) -> Result<BuildOutput> {
        let prepared = self.prepare(mode)?;
        self.write(prepared)
    }
}

/// Concatenate documents, separated by blank lines, into one at `path`
pub fn merge_documents(path: &Path, documents: &[MarkdownDocument]) -> Result<MarkdownDocument> {
    let mut lines = Vec::new();
    for doc in documents {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(doc.contents()?.iter().cloned());
    }
    Ok(MarkdownDocument::with_contents(path, lines))
}

/// Copy every file below `source` directly into `dest`. When two files share
/// a name the first one in walk order is kept.
pub fn copy_assets_flat(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest)?;

    let mut copied: HashMap<PathBuf, PathBuf> = HashMap::new();
    for entry in WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        if let Some(previous) = copied.get(&target) {
            log::warn!(
                "Not copying {}: {} already uses the name",
                path.display(),
                previous.display()
            );
            continue;
        }
        std::fs::copy(path, &target)?;
        copied.insert(target, path.to_path_buf());
    }

    let mut written: Vec<_> = copied.into_keys().collect();
    written.sort();
    Ok(written)
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

    #[test]
    fn test_merge_documents() {
        let docs = vec![
            MarkdownDocument::with_contents("/d/a.md", vec!["# A".into()]),
            MarkdownDocument::with_contents("/d/b.md", vec!["# B".into(), "b".into()]),
        ];
        let merged = merge_documents(Path::new("/d/single.md"), &docs).unwrap();
        assert_eq!(merged.contents().unwrap(), &["# A", "", "# B", "b"]);
    }

    #[test]
    fn test_copy_assets_flat() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("assets");
        write(&src, "a/logo.png", "a");
        write(&src, "b/logo.png", "b");
        write(&src, "b/chart.svg", "c");

        let dest = temp.path().join("out/assets");
        let copied = copy_assets_flat(&src, &dest).unwrap();
        assert_eq!(copied, vec![dest.join("chart.svg"), dest.join("logo.png")]);
        assert_eq!(std::fs::read_to_string(dest.join("logo.png")).unwrap(), "a");
    }

    #[test]
    fn test_prepare_requires_root_list() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::builder(temp.path()).build().unwrap();
        assert!(matches!(
            Builder::new(config).prepare(BuildMode::Html),
            Err(Error::ConfigError { .. })
        ));
    }
}
