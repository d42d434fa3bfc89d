//! # mddocs
//!
//! Assemble, check and prepare Markdown document trees described by list
//! files.
//!
//! This crate re-exports the workspace crates and holds the command layer
//! used by the `mddocs` binary:
//!
//! - [`mddocs_core`] - Models, configuration, errors and reports
//! - [`mddocs_parser`] - Line classifiers, fence tracking and anchors
//! - [`mddocs_graph`] - Documents, list resolution, link graph and repair
//! - [`mddocs_build`] - Rewriting, tables of contents, validation and builds
//!
//! ```no_run
//! use mddocs::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = ProjectConfig::load(std::path::Path::new("mddocs.yaml"))?;
//! let report = mddocs::commands::validate_markdown(&config)?;
//! println!("{} errors", report.summary.error_count);
//! # Ok(())
//! # }
//! ```

pub mod commands;

pub use mddocs_build;
pub use mddocs_core;
pub use mddocs_graph;
pub use mddocs_parser;

pub mod prelude {
    pub use crate::commands::{GraphSummary, RepairOutcome};
    pub use mddocs_build::prelude::*;
}
