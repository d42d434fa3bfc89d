//! Project configuration.
//!
//! Loaded from one or more YAML files (later files override earlier ones),
//! or assembled with [`ProjectConfig::builder`]. Paths under `documents`
//! are relative to `documents.path`; `documents.path` and `output` are
//! relative to the directory of the first configuration file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default similarity cutoff for broken-link suggestions
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default name of the table-of-contents plugin
pub const DEFAULT_TOC_PLUGIN: &str = "TOC";

/// One table of contents to synthesize during a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    /// List file describing the documents in the TOC
    pub lst: PathBuf,
    /// Markdown document receiving the TOC
    pub index: PathBuf,
    #[serde(default = "default_toc_depth")]
    pub depth: u8,
    #[serde(default = "default_toc_plugin")]
    pub plugin: String,
}

fn default_toc_depth() -> u8 {
    6
}

fn default_toc_plugin() -> String {
    DEFAULT_TOC_PLUGIN.to_string()
}

/// Location of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Root directory of the Markdown tree
    pub path: PathBuf,
    /// Root list file
    #[serde(default)]
    pub lst: Option<PathBuf>,
    /// Asset directory that images are flattened into
    #[serde(default)]
    pub assets: Option<PathBuf>,
    #[serde(default)]
    pub tocs: Vec<TocConfig>,
}

/// Complete project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub documents: DocumentsConfig,
    /// Directory receiving prepared output
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Documents excluded from tables of contents
    #[serde(default)]
    pub ignore_toc: HashSet<PathBuf>,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    /// Worker threads; `None` uses one per CPU
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Navigation plugin to run after a build
    #[serde(default)]
    pub navigation_plugin: Option<String>,
    /// JSON document plugin to run after a build
    #[serde(default)]
    pub json_plugin: Option<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ProjectConfig {
    /// Create a new config with builder
    pub fn builder(documents_path: impl Into<PathBuf>) -> ProjectConfigBuilder {
        ProjectConfigBuilder::new(documents_path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let root = &self.documents.path;
        if !root.exists() {
            return Err(Error::config_error(format!(
                "Documents path does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(Error::config_error(format!(
                "Documents path is not a directory: {}",
                root.display()
            )));
        }

        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(Error::config_error(format!(
                "Similarity threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }

        if self.jobs == Some(0) {
            return Err(Error::config_error("jobs must be at least 1"));
        }

        for toc in &self.documents.tocs {
            if toc.depth > 6 {
                return Err(Error::invalid_depth(toc.depth));
            }
        }

        Ok(())
    }

    /// Absolute path of the root list file, if configured
    pub fn root_lst(&self) -> Option<PathBuf> {
        self.documents.lst.as_ref().map(|p| self.documents.path.join(p))
    }

    /// Absolute path of the asset directory, if configured
    pub fn assets_dir(&self) -> Option<PathBuf> {
        self.documents
            .assets
            .as_ref()
            .map(|p| self.documents.path.join(p))
    }

    /// `ignore_toc` entries resolved against the documents path
    pub fn ignore_toc_paths(&self) -> HashSet<PathBuf> {
        self.ignore_toc
            .iter()
            .map(|p| crate::utils::normalize_path(&self.documents.path.join(p)))
            .collect()
    }

    /// Load a single configuration file
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_merged(&[path.to_path_buf()])
    }

    /// Load and merge several configuration files in order.
    pub fn load_merged(paths: &[PathBuf]) -> Result<Self> {
        let first = paths
            .first()
            .ok_or_else(|| Error::config_error("At least one configuration file is required"))?;

        let mut merged = serde_yaml::Value::Mapping(Default::default());
        for path in paths {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::config_error(format!("Failed to load {}: {}", path.display(), e))
            })?;
            let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
                Error::config_error(format!("Invalid configuration {}: {}", path.display(), e))
            })?;
            log::debug!("Merging configuration {}", path.display());
            merge_yaml(&mut merged, value);
        }

        let mut config: ProjectConfig = serde_yaml::from_value(merged)
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;

        let base = first.parent().unwrap_or_else(|| Path::new("."));
        config.anchor_paths(base);
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, yaml).map_err(|e| {
            Error::config_error(format!("Failed to save config to {}: {}", path.display(), e))
        })
    }

    fn anchor_paths(&mut self, base: &Path) {
        if self.documents.path.is_relative() {
            self.documents.path = crate::utils::normalize_path(&base.join(&self.documents.path));
        }
        if self.output.is_relative() {
            self.output = crate::utils::normalize_path(&base.join(&self.output));
        }
    }
}

/// Recursively merge `overlay` into `base`; mappings merge, everything else replaces.
fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Builder for ProjectConfig
pub struct ProjectConfigBuilder {
    documents: DocumentsConfig,
    output: PathBuf,
    ignore_toc: HashSet<PathBuf>,
    similarity_threshold: f64,
    jobs: Option<usize>,
    log_level: String,
    navigation_plugin: Option<String>,
    json_plugin: Option<String>,
}

impl ProjectConfigBuilder {
    /// Create a new builder
    pub fn new(documents_path: impl Into<PathBuf>) -> Self {
        Self {
            documents: DocumentsConfig {
                path: documents_path.into(),
                lst: None,
                assets: None,
                tocs: Vec::new(),
            },
            output: default_output(),
            ignore_toc: HashSet::new(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            jobs: None,
            log_level: default_log_level(),
            navigation_plugin: None,
            json_plugin: None,
        }
    }

    /// Set the root list file
    pub fn lst(mut self, lst: impl Into<PathBuf>) -> Self {
        self.documents.lst = Some(lst.into());
        self
    }

    /// Set the asset directory
    pub fn assets(mut self, assets: impl Into<PathBuf>) -> Self {
        self.documents.assets = Some(assets.into());
        self
    }

    /// Add a table of contents
    pub fn toc(mut self, toc: TocConfig) -> Self {
        self.documents.tocs.push(toc);
        self
    }

    /// Set the output directory
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Exclude a document from tables of contents
    pub fn ignore_toc(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_toc.insert(path.into());
        self
    }

    /// Set the suggestion similarity threshold
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the worker count
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Set the log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Select the navigation plugin
    pub fn navigation_plugin(mut self, name: impl Into<String>) -> Self {
        self.navigation_plugin = Some(name.into());
        self
    }

    /// Select the JSON document plugin
    pub fn json_plugin(mut self, name: impl Into<String>) -> Self {
        self.json_plugin = Some(name.into());
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<ProjectConfig> {
        let config = ProjectConfig {
            documents: self.documents,
            output: self.output,
            ignore_toc: self.ignore_toc,
            similarity_threshold: self.similarity_threshold,
            jobs: self.jobs,
            log_level: self.log_level,
            navigation_plugin: self.navigation_plugin,
            json_plugin: self.json_plugin,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::builder(temp.path())
            .lst("all.lst")
            .assets("assets")
            .jobs(2)
            .build()
            .unwrap();

        assert_eq!(config.root_lst(), Some(temp.path().join("all.lst")));
        assert_eq!(config.assets_dir(), Some(temp.path().join("assets")));
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let temp = TempDir::new().unwrap();
        assert!(
            ProjectConfig::builder(temp.path())
                .similarity_threshold(1.5)
                .build()
                .is_err()
        );
        assert!(ProjectConfig::builder(temp.path()).jobs(0).build().is_err());
        assert!(
            ProjectConfig::builder(temp.path().join("missing"))
                .build()
                .is_err()
        );

        let bad_toc = TocConfig {
            lst: "toc.lst".into(),
            index: "index.md".into(),
            depth: 9,
            plugin: DEFAULT_TOC_PLUGIN.into(),
        };
        let err = ProjectConfig::builder(temp.path())
            .toc(bad_toc)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDepth { depth: 9 }));
    }

    #[test]
    fn test_load_merged_later_file_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("docs")).unwrap();

        let common = temp.path().join("common.yaml");
        std::fs::write(
            &common,
            "documents:\n  path: docs\n  lst: all.lst\n  tocs:\n    - lst: toc.lst\n      index: index.md\nsimilarity_threshold: 0.7\n",
        )
        .unwrap();
        let overlay = temp.path().join("html.yaml");
        std::fs::write(&overlay, "documents:\n  assets: assets\nsimilarity_threshold: 0.9\n")
            .unwrap();

        let config = ProjectConfig::load_merged(&[common, overlay]).unwrap();
        assert_eq!(config.documents.path, temp.path().join("docs"));
        assert_eq!(config.documents.lst, Some(PathBuf::from("all.lst")));
        assert_eq!(config.documents.assets, Some(PathBuf::from("assets")));
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.documents.tocs[0].depth, 6);
        assert_eq!(config.documents.tocs[0].plugin, "TOC");
        assert_eq!(config.output, temp.path().join("output"));
        config.validate().unwrap();
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::builder(temp.path())
            .ignore_toc("draft.md")
            .output(temp.path().join("out"))
            .build()
            .unwrap();
        let path = temp.path().join("config.yaml");
        config.save(&path).unwrap();

        let loaded = ProjectConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
