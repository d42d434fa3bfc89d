//! # mddocs Graph
//!
//! The document layer: Markdown and list documents, recursive list
//! resolution, the cross-document link graph, and broken-link repair.
//!
//! Provides:
//! - [`MarkdownDocument`] with lazily cached headers, YAML metadata and links
//! - [`ListDocument`] and depth-first list resolution with cycle detection
//! - Forward and reverse link indexes
//! - A petgraph [`DocumentGraph`]: backlinks, leaf documents, orphans, cycles
//! - [`RepairEngine`]: broken-link classification and unambiguous write-back
//! - Parallel document discovery
//!
//! ## Quick Start
//!
//! ```
//! use mddocs_graph::prelude::*;
//!
//! let docs = vec![
//!     MarkdownDocument::with_contents("/book/index.md", vec!["[One](ch1.md)".into()]),
//!     MarkdownDocument::with_contents("/book/ch1.md", vec!["# One".into()]),
//! ];
//!
//! let graph = DocumentGraph::from_documents(&docs).unwrap();
//! assert_eq!(graph.leaf_documents(), vec![std::path::PathBuf::from("/book/ch1.md")]);
//! ```
//!
//! ## Modules
//!
//! - [`document`] - The `Document` trait and `MarkdownDocument`
//! - [`list`] - List files and their resolution
//! - [`graph`] - Link indexes and the document graph
//! - [`repair`] - Broken-link detection and repair
//! - [`search`] - Discovery under a root directory
//!
//! ## Concurrency
//!
//! Discovery, link indexing and broken-link detection process one document
//! per rayon task and aggregate once every task has finished. Each list is
//! resolved sequentially; independent lists resolve in parallel.

pub mod document;
pub mod graph;
pub mod list;
pub mod repair;
pub mod search;

pub use document::{Document, MarkdownDocument, title_from_path};
pub use graph::{DocumentGraph, GraphStats, LinkReference, forward_index, reverse_index};
pub use list::{ListDocument, ListEntry, dedup_preserving_order, resolve_list, resolve_lists};
pub use repair::{
    AppliedRepair, BrokenLink, Candidate, NameIndex, RepairClass, RepairEngine, RepairEntry,
    RepairReport,
};
pub use search::{find_files, search_lists, search_markdown};

pub mod prelude {
    pub use crate::document::{Document, MarkdownDocument};
    pub use crate::graph::{DocumentGraph, GraphStats, LinkReference};
    pub use crate::list::{ListDocument, dedup_preserving_order, resolve_list};
    pub use crate::repair::{NameIndex, RepairClass, RepairEngine, RepairReport};
    pub use crate::search::{search_lists, search_markdown};
    pub use mddocs_core::prelude::*;
}
