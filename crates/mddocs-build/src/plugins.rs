//! Named generators for tables of contents, navigation maps and JSON
//! document indexes.
//!
//! Plugins are registered explicitly on a [`PluginRegistry`], one map per
//! capability. Names are unique within a capability.
//!
//! ## Built-ins
//!
//! | Capability | Name | Output |
//! |------------|------|--------|
//! | TOC | `TOC` | nested file/section list |
//! | TOC | `Blog Index` | dated post list |
//! | Navigation | `CSV Navigation` | `url_map.csv` |
//! | JSON | `JSON Minimum` | `basic_document.json` |

use crate::toc::{create_blog_index, create_toc};
use mddocs_core::prelude::*;
use mddocs_core::{CSVBuilder, DEFAULT_TOC_PLUGIN, relative_path, to_json_string, to_url_path};
use mddocs_graph::{Document, ListDocument, MarkdownDocument};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Shared inputs of the post-build plugins
#[derive(Debug, Clone, Copy)]
pub struct PluginContext<'a> {
    pub documents_root: &'a Path,
    /// Directory the plugin writes into
    pub output: &'a Path,
    /// Documents left out of generated indexes
    pub ignore: &'a HashSet<PathBuf>,
}

/// Generates the lines appended to an index document
pub trait TocPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        list: &ListDocument,
        depth: u8,
        ignore: &HashSet<PathBuf>,
    ) -> Result<Vec<String>>;
}

/// Writes a navigation map for a set of documents
pub trait NavigationPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the path of the written file
    fn generate(&self, docs: &[MarkdownDocument], ctx: &PluginContext<'_>) -> Result<PathBuf>;
}

/// Writes a JSON index of document contents
pub trait JsonDocumentPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the path of the written file
    fn generate(&self, docs: &[MarkdownDocument], ctx: &PluginContext<'_>) -> Result<PathBuf>;
}

/// Nested file and section list
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultToc;

impl TocPlugin for DefaultToc {
    fn name(&self) -> &str {
        DEFAULT_TOC_PLUGIN
    }

    fn generate(
        &self,
        list: &ListDocument,
        depth: u8,
        ignore: &HashSet<PathBuf>,
    ) -> Result<Vec<String>> {
        create_toc(list, depth, ignore)
    }
}

/// Dated post list; `depth` is ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct BlogIndex;

impl TocPlugin for BlogIndex {
    fn name(&self) -> &str {
        "Blog Index"
    }

    fn generate(
        &self,
        list: &ListDocument,
        _depth: u8,
        ignore: &HashSet<PathBuf>,
    ) -> Result<Vec<String>> {
        create_blog_index(list, ignore)
    }
}

/// One row of the CSV navigation map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRecord {
    pub uuid: String,
    pub title: String,
    /// Rendered page relative to the documents root
    pub path: String,
}

/// Maps document UUIDs to titles and rendered `.html` paths
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvNavigation;

impl CsvNavigation {
    pub const FILE_NAME: &'static str = "url_map.csv";

    /// Navigation rows in document order. Documents without a YAML block
    /// or UUID get blank fields.
    pub fn records(docs: &[MarkdownDocument], documents_root: &Path) -> Result<Vec<NavigationRecord>> {
        docs.iter()
            .map(|doc| {
                let metadata = doc.yaml_block_lenient()?;
                match metadata {
                    Some(m) if !m.has_block() => {
                        log::warn!("{} has no YAML block", doc.path().display())
                    }
                    Some(m) if m.uuid().is_none_or(|u| u.is_empty()) => {
                        log::warn!("{} has no UUID", doc.path().display())
                    }
                    _ => {}
                }
                Ok(NavigationRecord {
                    uuid: metadata.and_then(YamlMetadata::uuid).unwrap_or_default(),
                    title: metadata.and_then(YamlMetadata::title).unwrap_or_default(),
                    path: to_url_path(&relative_path(
                        documents_root,
                        &doc.path().with_extension("html"),
                    )),
                })
            })
            .collect()
    }

    pub fn to_csv(records: &[NavigationRecord]) -> String {
        records
            .iter()
            .fold(CSVBuilder::new(vec!["uuid", "title", "path"]), |csv, r| {
                csv.add_row(vec![r.uuid.as_str(), r.title.as_str(), r.path.as_str()])
            })
            .build()
    }
}

impl NavigationPlugin for CsvNavigation {
    fn name(&self) -> &str {
        "CSV Navigation"
    }

    fn generate(&self, docs: &[MarkdownDocument], ctx: &PluginContext<'_>) -> Result<PathBuf> {
        let records = Self::records(docs, ctx.documents_root)?;
        std::fs::create_dir_all(ctx.output)?;
        let path = ctx.output.join(Self::FILE_NAME);
        std::fs::write(&path, Self::to_csv(&records))?;
        log::info!("Wrote {} navigation entries to {}", records.len(), path.display());
        Ok(path)
    }
}

/// One entry of the minimal JSON document index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDocumentRecord {
    /// Path relative to the documents root
    pub file: String,
    pub contents: String,
}

/// File path and full text of every document not ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMinimum;

impl JsonMinimum {
    pub const FILE_NAME: &'static str = "basic_document.json";

    pub fn records(
        docs: &[MarkdownDocument],
        documents_root: &Path,
        ignore: &HashSet<PathBuf>,
    ) -> Result<Vec<JsonDocumentRecord>> {
        docs.iter()
            .filter(|doc| !ignore.contains(doc.path()))
            .map(|doc| {
                Ok(JsonDocumentRecord {
                    file: to_url_path(&relative_path(documents_root, doc.path())),
                    contents: doc.contents()?.join("\n"),
                })
            })
            .collect()
    }
}

impl JsonDocumentPlugin for JsonMinimum {
    fn name(&self) -> &str {
        "JSON Minimum"
    }

    fn generate(&self, docs: &[MarkdownDocument], ctx: &PluginContext<'_>) -> Result<PathBuf> {
        let records = Self::records(docs, ctx.documents_root, ctx.ignore)?;
        std::fs::create_dir_all(ctx.output)?;
        let path = ctx.output.join(Self::FILE_NAME);
        std::fs::write(&path, to_json_string(&records, "document index")?)?;
        log::info!("Wrote {} documents to {}", records.len(), path.display());
        Ok(path)
    }
}

fn insert_unique<T: ?Sized>(
    plugins: &mut BTreeMap<String, Box<T>>,
    capability: &str,
    name: &str,
    plugin: Box<T>,
) -> Result<()> {
    if plugins.contains_key(name) {
        return Err(Error::plugin_error(format!(
            "Plugin names must be unique: {capability} plugin '{name}' is already registered"
        )));
    }
    plugins.insert(name.to_string(), plugin);
    Ok(())
}

fn unknown(capability: &str, name: &str) -> Error {
    Error::plugin_error(format!("No {capability} plugin named '{name}'"))
}

/// Plugins by capability and name
#[derive(Default)]
pub struct PluginRegistry {
    toc: BTreeMap<String, Box<dyn TocPlugin>>,
    navigation: BTreeMap<String, Box<dyn NavigationPlugin>>,
    json: BTreeMap<String, Box<dyn JsonDocumentPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in plugins
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let tocs: [Box<dyn TocPlugin>; 2] = [Box::new(DefaultToc), Box::new(BlogIndex)];
        for plugin in tocs {
            registry.toc.insert(plugin.name().to_string(), plugin);
        }
        registry
            .navigation
            .insert(CsvNavigation.name().to_string(), Box::new(CsvNavigation));
        registry
            .json
            .insert(JsonMinimum.name().to_string(), Box::new(JsonMinimum));
        registry
    }

    pub fn register_toc(&mut self, plugin: impl TocPlugin + 'static) -> Result<()> {
        let name = plugin.name().to_string();
        let plugin: Box<dyn TocPlugin> = Box::new(plugin);
        insert_unique(&mut self.toc, "TOC", &name, plugin)
    }

    pub fn register_navigation(&mut self, plugin: impl NavigationPlugin + 'static) -> Result<()> {
        let name = plugin.name().to_string();
        let plugin: Box<dyn NavigationPlugin> = Box::new(plugin);
        insert_unique(&mut self.navigation, "navigation", &name, plugin)
    }

    pub fn register_json(&mut self, plugin: impl JsonDocumentPlugin + 'static) -> Result<()> {
        let name = plugin.name().to_string();
        let plugin: Box<dyn JsonDocumentPlugin> = Box::new(plugin);
        insert_unique(&mut self.json, "JSON", &name, plugin)
    }

    pub fn toc(&self, name: &str) -> Result<&dyn TocPlugin> {
        self.toc
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| unknown("TOC", name))
    }

    /// The named TOC plugin, or the default one with a warning
    pub fn toc_or_default(&self, name: &str) -> Result<&dyn TocPlugin> {
        if let Ok(plugin) = self.toc(name) {
            return Ok(plugin);
        }
        log::warn!(
            "TOC plugin '{}' does not exist, using '{}'",
            name,
            DEFAULT_TOC_PLUGIN
        );
        self.toc(DEFAULT_TOC_PLUGIN)
    }

    pub fn navigation(&self, name: &str) -> Result<&dyn NavigationPlugin> {
        self.navigation
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| unknown("navigation", name))
    }

    pub fn json(&self, name: &str) -> Result<&dyn JsonDocumentPlugin> {
        self.json
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| unknown("JSON", name))
    }

    pub fn toc_names(&self) -> Vec<&str> {
        self.toc.keys().map(String::as_str).collect()
    }

    pub fn navigation_names(&self) -> Vec<&str> {
        self.navigation.keys().map(String::as_str).collect()
    }

    pub fn json_names(&self) -> Vec<&str> {
        self.json.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("toc", &self.toc_names())
            .field("navigation", &self.navigation_names())
            .field("json", &self.json_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(path: &str, text: &str) -> MarkdownDocument {
        MarkdownDocument::with_contents(path, text.lines().map(str::to_string).collect())
    }

    #[test]
    fn test_defaults() {
        let registry = PluginRegistry::with_defaults();
        assert_eq!(registry.toc_names(), vec!["Blog Index", "TOC"]);
        assert_eq!(registry.navigation_names(), vec!["CSV Navigation"]);
        assert_eq!(registry.json_names(), vec!["JSON Minimum"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = PluginRegistry::with_defaults();
        let err = registry.register_toc(DefaultToc).unwrap_err();
        assert!(matches!(err, Error::PluginError { .. }));
        assert!(err.to_string().contains("Plugin names must be unique"));

        let mut empty = PluginRegistry::new();
        empty.register_json(JsonMinimum).unwrap();
        assert!(empty.register_json(JsonMinimum).is_err());
    }

    #[test]
    fn test_unknown_toc_falls_back() {
        let registry = PluginRegistry::with_defaults();
        assert!(registry.toc("Fancy").is_err());
        assert_eq!(registry.toc_or_default("Fancy").unwrap().name(), "TOC");
        assert_eq!(registry.toc_or_default("Blog Index").unwrap().name(), "Blog Index");
        assert!(PluginRegistry::new().toc_or_default("TOC").is_err());
    }

    #[test]
    fn test_csv_navigation() {
        let docs = vec![
            doc(
                "/d/guide/intro.md",
                "---\nUUID: 0f8fad5b-d9cb-469f-a165-70867728950e\ntitle: Intro, part 1\n---\n",
            ),
            doc("/d/index.md", "# No metadata"),
        ];
        let records = CsvNavigation::records(&docs, Path::new("/d")).unwrap();
        assert_eq!(records[0].path, "guide/intro.html");
        assert_eq!(records[1].uuid, "");
        assert_eq!(
            CsvNavigation::to_csv(&records),
            "uuid,title,path\n0f8fad5b-d9cb-469f-a165-70867728950e,\"Intro, part 1\",guide/intro.html\n,,index.html\n"
        );
    }

    #[test]
    fn test_json_minimum_writes_file() {
        let temp = TempDir::new().unwrap();
        let docs = vec![doc("/d/a.md", "# A\nbody"), doc("/d/skip.md", "# Skip")];
        let ignore = HashSet::from([PathBuf::from("/d/skip.md")]);
        let ctx = PluginContext {
            documents_root: Path::new("/d"),
            output: temp.path(),
            ignore: &ignore,
        };

        let registry = PluginRegistry::with_defaults();
        let path = registry.json("JSON Minimum").unwrap().generate(&docs, &ctx).unwrap();
        assert_eq!(path, temp.path().join("basic_document.json"));

        let written: Vec<JsonDocumentRecord> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            vec![JsonDocumentRecord {
                file: "a.md".into(),
                contents: "# A\nbody".into(),
            }]
        );
    }
}
