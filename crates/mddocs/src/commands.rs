//! Command implementations behind the `mddocs` binary.
//!
//! Each command takes a loaded [`ProjectConfig`] and returns a value the
//! binary renders; nothing here prints or exits.

use mddocs_build::{BuildMode, BuildOutput, Builder, create_toc};
use mddocs_core::prelude::*;
use mddocs_core::normalize_path;
use mddocs_graph::{
    AppliedRepair, DocumentGraph, GraphStats, ListDocument, MarkdownDocument, NameIndex,
    RepairEngine, RepairReport, search_lists, search_markdown,
};
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Validate every Markdown document under the documents root
#[instrument(skip(config), name = "validate_markdown_command")]
pub fn validate_markdown(config: &ProjectConfig) -> Result<ValidationReport> {
    let docs = search_markdown(&config.documents.path)?;
    mddocs_build::validate_markdown(&docs)
}

/// Check every list file under the documents root against the Markdown
/// documents found there
#[instrument(skip(config), name = "validate_lists_command")]
pub fn validate_lists(config: &ProjectConfig) -> Result<ValidationReport> {
    let root = &config.documents.path;
    let lists = search_lists(root)?;
    let docs = search_markdown(root)?;
    mddocs_build::validate_lists(&lists, &docs)
}

/// Outcome of `repair links`
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub report: RepairReport,
    pub applied: Vec<AppliedRepair>,
    pub dry_run: bool,
}

/// Classify broken relative links and rewrite the unambiguous ones
#[instrument(skip(config), name = "repair_links_command")]
pub fn repair_links(config: &ProjectConfig, dry_run: bool) -> Result<RepairOutcome> {
    let mut docs = search_markdown(&config.documents.path)?;
    let engine = RepairEngine::new(NameIndex::from_documents(&docs))
        .with_threshold(config.similarity_threshold)?;

    let report = engine.analyze(&docs)?;
    let applied = engine.apply_repairs(&mut docs, &report, dry_run)?;
    Ok(RepairOutcome {
        report,
        applied,
        dry_run,
    })
}

/// Table of contents for a list file, honoring `ignore_toc` when a
/// configuration is given
pub fn toc(config: Option<&ProjectConfig>, list: &Path, depth: u8) -> Result<Vec<String>> {
    let ignore = config.map(ProjectConfig::ignore_toc_paths).unwrap_or_default();
    create_toc(&ListDocument::new(list), depth, &ignore)
}

/// Prepare and write a build
pub fn build(config: &ProjectConfig, mode: BuildMode) -> Result<BuildOutput> {
    Builder::new(config.clone()).build(mode)
}

/// Link structure of the documents a list resolves to
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub stats: GraphStats,
    pub edges: Vec<(PathBuf, PathBuf)>,
    /// Documents linked from exactly one document and linking nowhere
    pub leaves: Vec<PathBuf>,
    pub orphans: Vec<PathBuf>,
    pub cycles: Vec<Vec<PathBuf>>,
}

#[instrument(skip(list), fields(list = %list.display()), name = "graph_command")]
pub fn graph(list: &Path) -> Result<GraphSummary> {
    let docs = ListDocument::new(normalize_path(list))
        .unique_links()?
        .par_iter()
        .map(MarkdownDocument::load)
        .collect::<Result<Vec<_>>>()?;
    let graph = DocumentGraph::from_documents(&docs)?;

    Ok(GraphSummary {
        stats: graph.stats(),
        edges: graph.edges(),
        leaves: graph.leaf_documents(),
        orphans: graph.orphans(),
        cycles: graph.cycles(),
    })
}

/// Print issues one per line followed by a summary
pub fn write_report(out: &mut impl Write, report: &ValidationReport) -> io::Result<()> {
    for issue in &report.issues {
        writeln!(out, "{}", issue)?;
    }
    writeln!(
        out,
        "{} errors, {} warnings, {} notes",
        report.summary.error_count, report.summary.warning_count, report.summary.info_count
    )
}

pub fn write_repairs(out: &mut impl Write, outcome: &RepairOutcome) -> io::Result<()> {
    write_report(out, &outcome.report.to_validation_report())?;
    let verb = if outcome.dry_run { "Would repair" } else { "Repaired" };
    for repair in &outcome.applied {
        writeln!(
            out,
            "{} {}:{} {} -> {}",
            verb,
            repair.source.display(),
            repair.line + 1,
            repair.from,
            repair.to
        )?;
    }
    Ok(())
}

pub fn write_graph(out: &mut impl Write, summary: &GraphSummary) -> io::Result<()> {
    for (from, to) in &summary.edges {
        writeln!(out, "{} -> {}", from.display(), to.display())?;
    }
    if !summary.leaves.is_empty() {
        writeln!(out, "\nLeaf documents:")?;
        for leaf in &summary.leaves {
            writeln!(out, "  {}", leaf.display())?;
        }
    }
    for cycle in &summary.cycles {
        let members: Vec<_> = cycle.iter().map(|p| p.display().to_string()).collect();
        writeln!(out, "Cycle: {}", members.join(", "))?;
    }
    writeln!(
        out,
        "{} documents, {} links, {} orphaned",
        summary.stats.total_documents, summary.stats.total_links, summary.stats.orphaned_documents
    )
}
