//! # mddocs Core
//!
//! Core data models, error types, and configuration for the Markdown document
//! system. This crate defines the canonical types that all other crates depend on.
//!
//! ## Core Modules
//!
//! - [`models`] - Links, headers, spans and YAML metadata
//! - [`error`] - Fatal error types and Result alias
//! - [`config`] - Project configuration loaded from YAML
//! - [`validation`] - Recoverable findings and reports
//! - [`utils`] - Path helpers, CSV and JSON builders
//!
//! ## Error Handling
//!
//! ```
//! use mddocs_core::prelude::*;
//!
//! fn check_depth(depth: u8) -> Result<u8> {
//!     if depth > 6 {
//!         return Err(Error::invalid_depth(depth));
//!     }
//!     Ok(depth)
//! }
//!
//! assert!(check_depth(7).is_err());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;
pub use utils::{CSVBuilder, normalize_path, relative_path, to_json_string, to_url_path};
pub use validation::{IssueKind, Severity, ValidationIssue, ValidationReport, ValidationSummary};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DocumentsConfig, ProjectConfig, TocConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Header, HeaderIndex, LineRange, Link, LinkInventory, LinkKind, RelativeUrl, Span,
        YamlMetadata,
    };
    pub use crate::validation::{IssueKind, Severity, ValidationIssue, ValidationReport};
}
