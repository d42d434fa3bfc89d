//! Error types for the document system.
//!
//! All fatal errors are represented by the [`Error`] enum. Problems that
//! should be reported but must not abort a run are expressed as
//! [`ValidationIssue`](crate::validation::ValidationIssue)s instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all document operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A YAML block that does not parse. `line` is the 0-based line of the
    /// opening delimiter.
    #[error("Invalid YAML block in {} at line {}: {reason}", .file.display(), .line + 1)]
    MalformedYaml {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A list file references itself, directly or through another list
    #[error("Self-referential list file: {path} (chain: {chain})")]
    SelfReferentialList { path: PathBuf, chain: String },

    /// A list file entry is neither `.md` nor `.lst`
    #[error("Unknown file extension in {list}: {entry}")]
    UnknownListExtension { list: PathBuf, entry: PathBuf },

    /// A relative Markdown link without a section anchor in merged output
    #[error("Missing Section Link - {file}, line {line} - `{text}`")]
    MissingSectionAnchor {
        file: PathBuf,
        line: usize,
        text: String,
    },

    /// TOC depth outside the supported range
    #[error("Invalid TOC depth {depth}: must be between 0 and 6")]
    InvalidDepth { depth: u8 },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Plugin registration or lookup failure
    #[error("Plugin error: {reason}")]
    PluginError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a self-referential list error from the resolution chain
    pub fn self_referential_list(path: impl Into<PathBuf>, chain: &[PathBuf]) -> Self {
        let path = path.into();
        let chain = chain
            .iter()
            .chain(std::iter::once(&path))
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        Error::SelfReferentialList { path, chain }
    }

    /// Create an unknown list extension error
    pub fn unknown_list_extension(list: impl Into<PathBuf>, entry: impl Into<PathBuf>) -> Self {
        Error::UnknownListExtension {
            list: list.into(),
            entry: entry.into(),
        }
    }

    /// Create a missing section anchor error. `line` is 0-based and reported 1-based.
    pub fn missing_section_anchor(
        file: impl Into<PathBuf>,
        line: usize,
        text: impl Into<String>,
    ) -> Self {
        Error::MissingSectionAnchor {
            file: file.into(),
            line: line + 1,
            text: text.into(),
        }
    }

    /// Create an invalid depth error
    pub fn invalid_depth(depth: u8) -> Self {
        Error::InvalidDepth { depth }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a plugin error
    pub fn plugin_error(reason: impl Into<String>) -> Self {
        Error::PluginError {
            reason: reason.into(),
        }
    }

    /// Create a malformed YAML error. `line` is 0-based and reported 1-based.
    pub fn malformed_yaml(
        file: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedYaml {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// The same error attributed to `file`, for errors raised before the
    /// file was known
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Error::MalformedYaml { line, reason, .. } => Error::MalformedYaml {
                file: file.into(),
                line,
                reason,
            },
            other => other,
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::file_not_found("/path/to/file");
        assert!(err.to_string().contains("File not found"));

        let err = Error::invalid_depth(7);
        assert!(err.to_string().contains("between 0 and 6"));
    }

    #[test]
    fn test_missing_section_anchor_reports_one_based_line() {
        let err = Error::missing_section_anchor("a.md", 3, "See [here](../x.md)");
        let msg = err.to_string();
        assert!(msg.contains("a.md"));
        assert!(msg.contains("line 4"));
        assert!(msg.contains("../x.md"));
    }

    #[test]
    fn test_malformed_yaml_takes_file() {
        let err = Error::malformed_yaml("", 4, "bad mapping").in_file("/d/b.md");
        match &err {
            Error::MalformedYaml { file, line, .. } => {
                assert_eq!(file, &PathBuf::from("/d/b.md"));
                assert_eq!(*line, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("/d/b.md at line 5"));
    }

    #[test]
    fn test_self_referential_chain() {
        let chain = vec![PathBuf::from("/d/a.lst"), PathBuf::from("/d/b.lst")];
        let err = Error::self_referential_list("/d/a.lst", &chain);
        assert!(
            err.to_string()
                .contains("/d/a.lst -> /d/b.lst -> /d/a.lst")
        );
    }
}
