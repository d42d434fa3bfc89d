//! # mddocs Build
//!
//! Everything that turns a listed document tree into renderer input:
//! link rewriting, image flattening, tables of contents, validation and
//! the build pipeline.
//!
//! ## Quick Start
//!
//! ```
//! use mddocs_build::prelude::*;
//!
//! let mut doc = MarkdownDocument::with_contents(
//!     "/book/index.md",
//!     vec!["Read [chapter one](ch1.md#start) first.".into()],
//! );
//!
//! DocumentRewriter::new(LinkMode::Extension).rewrite(&mut doc).unwrap();
//! assert_eq!(
//!     doc.contents().unwrap()[0],
//!     "Read [chapter one](ch1.html#start) first."
//! );
//! ```
//!
//! ## Modules
//!
//! - [`rewrite`] - Span-based link and image rewriting
//! - [`toc`] - Tables of contents and blog indexes
//! - [`plugins`] - The TOC, navigation and JSON plugin registry
//! - [`validate`] - Document and list validators
//! - [`pipeline`] - Build preparation and output

pub mod pipeline;
pub mod plugins;
pub mod rewrite;
pub mod toc;
pub mod validate;

pub use pipeline::{BuildMode, BuildOutput, Builder, PreparedBuild, copy_assets_flat, merge_documents};
pub use plugins::{
    BlogIndex, CsvNavigation, DefaultToc, JsonDocumentPlugin, JsonMinimum, NavigationPlugin,
    PluginContext, PluginRegistry, TocPlugin,
};
pub use rewrite::{
    DocumentRewriter, Edit, ImageRewriter, LinkMode, apply_edits, rewrite_anchor_only,
    rewrite_extension,
};
pub use toc::{create_blog_index, create_file_toc, create_toc};
pub use validate::{
    CompositeValidator, ImageValidator, LinkValidator, MetadataValidator, NoopUrlChecker,
    UrlChecker, UrlStatus, Validator, check_duplicate_uuids, validate_documents, validate_lists,
    validate_markdown,
};

pub mod prelude {
    pub use crate::pipeline::{BuildMode, BuildOutput, Builder};
    pub use crate::plugins::PluginRegistry;
    pub use crate::rewrite::{DocumentRewriter, ImageRewriter, LinkMode};
    pub use crate::toc::create_toc;
    pub use crate::validate::{CompositeValidator, Validator, validate_lists, validate_markdown};
    pub use mddocs_graph::prelude::*;
}
