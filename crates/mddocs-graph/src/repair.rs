//! Broken-link detection and repair.
//!
//! A link is broken when its resolved target does not exist. Each broken
//! link is classified against a name-keyed index of the known documents:
//! an exact file-name hit is a file match, a close name is a suggestion,
//! anything else is unresolved. Only a file match with a single candidate
//! is ever written back, and only through [`RepairEngine::apply_repairs`].

use crate::document::{Document, MarkdownDocument};
use mddocs_core::prelude::*;
use mddocs_core::{DEFAULT_SIMILARITY_THRESHOLD, relative_path, to_url_path};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Upper bound on close-name suggestions per broken link
pub const MAX_SUGGESTIONS: usize = 3;

/// A relative link whose target does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    /// Document containing the link
    pub source: PathBuf,
    /// 0-based line number
    pub line: usize,
    pub link: Link,
    /// Where the link resolves to
    pub target: PathBuf,
}

impl BrokenLink {
    /// File name the link asks for
    pub fn name(&self) -> Option<String> {
        self.link
            .target_path()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// A close-name candidate and its similarity to the requested name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub score: f64,
}

/// How a broken link could be repaired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RepairClass {
    /// Nothing with the same or a similar name exists
    Unresolved,
    /// Documents with exactly the requested file name
    FileMatch { candidates: Vec<PathBuf> },
    /// Documents with similar names, most similar first
    Suggestion { candidates: Vec<Candidate> },
}

impl RepairClass {
    /// The single replacement target, if the repair is unambiguous
    pub fn unique_match(&self) -> Option<&Path> {
        match self {
            Self::FileMatch { candidates } if candidates.len() == 1 => Some(&candidates[0]),
            _ => None,
        }
    }
}

/// Documents keyed by file name
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_name: BTreeMap<String, Vec<PathBuf>>,
}

impl NameIndex {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for path in paths {
            let path = path.as_ref();
            if let Some(name) = path.file_name() {
                by_name
                    .entry(name.to_string_lossy().into_owned())
                    .or_default()
                    .push(path.to_path_buf());
            }
        }
        for paths in by_name.values_mut() {
            paths.sort();
            paths.dedup();
        }
        Self { by_name }
    }

    pub fn from_documents(docs: &[MarkdownDocument]) -> Self {
        Self::new(docs.iter().map(|d| d.path()))
    }

    /// Documents named exactly `name`
    pub fn get(&self, name: &str) -> Option<&[PathBuf]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Names at least `threshold` similar to `name`, best first
    pub fn close_matches(&self, name: &str, threshold: f64) -> Vec<(&str, f64)> {
        let mut scored: Vec<(&str, f64)> = self
            .by_name
            .keys()
            .map(|key| (key.as_str(), strsim::normalized_levenshtein(name, key)))
            .filter(|(_, score)| *score >= threshold)
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scored.truncate(MAX_SUGGESTIONS);
        scored
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// A broken link and its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairEntry {
    pub broken: BrokenLink,
    pub class: RepairClass,
}

/// Result of a repair analysis, ordered by source then line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepairReport {
    pub entries: Vec<RepairEntry>,
}

impl RepairReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &RepairEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.class, RepairClass::Unresolved))
    }

    pub fn file_matches(&self) -> impl Iterator<Item = &RepairEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.class, RepairClass::FileMatch { .. }))
    }

    pub fn suggestions(&self) -> impl Iterator<Item = &RepairEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.class, RepairClass::Suggestion { .. }))
    }

    /// Entries that [`RepairEngine::apply_repairs`] would rewrite
    pub fn repairable(&self) -> impl Iterator<Item = &RepairEntry> {
        self.entries.iter().filter(|e| e.class.unique_match().is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Findings for the validation report. Unresolved links are errors,
    /// ambiguous matches and suggestions are warnings, and links with a
    /// single file match are informational.
    pub fn to_validation_report(&self) -> ValidationReport {
        self.entries
            .iter()
            .map(|entry| {
                let broken = &entry.broken;
                let message = format!("UNRESOLVED URL -> {}", broken.link.full);
                let list = |paths: Vec<String>| paths.join(", ");
                let issue = match &entry.class {
                    RepairClass::Unresolved => ValidationIssue::new(
                        Severity::Error,
                        IssueKind::BrokenRelativeLink,
                        &broken.source,
                        message,
                    ),
                    RepairClass::FileMatch { candidates } if candidates.len() == 1 => {
                        ValidationIssue::new(
                            Severity::Info,
                            IssueKind::RepairCandidate,
                            &broken.source,
                            message,
                        )
                        .with_suggestion(format!(
                            "FILE MATCH -> {}",
                            candidates[0].display()
                        ))
                    }
                    RepairClass::FileMatch { candidates } => ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::BrokenRelativeLink,
                        &broken.source,
                        message,
                    )
                    .with_suggestion(format!(
                        "FILE MATCH -> {}",
                        list(candidates.iter().map(|p| p.display().to_string()).collect())
                    )),
                    RepairClass::Suggestion { candidates } => ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::BrokenRelativeLink,
                        &broken.source,
                        message,
                    )
                    .with_suggestion(format!(
                        "POTENTIAL MATCH -> {}",
                        list(candidates.iter().map(|c| c.path.display().to_string()).collect())
                    )),
                };
                issue.with_line(broken.line)
            })
            .collect()
    }
}

/// One rewritten (or, in a dry run, rewritable) link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRepair {
    pub source: PathBuf,
    pub line: usize,
    /// URL before the repair
    pub from: String,
    /// URL after the repair
    pub to: String,
}

/// Finds and classifies broken links, and writes back unambiguous fixes
#[derive(Debug, Clone)]
pub struct RepairEngine {
    index: NameIndex,
    threshold: f64,
}

impl RepairEngine {
    pub fn new(index: NameIndex) -> Self {
        Self {
            index,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Override the similarity cutoff; must lie in `(0, 1]`
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::config_error(format!(
                "similarity threshold must be in (0, 1], got {threshold}"
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Relative links whose resolved target does not exist, per document in
    /// parallel
    #[instrument(skip(self, docs), fields(documents = docs.len()), name = "find_broken_links")]
    pub fn find_broken_links(&self, docs: &[MarkdownDocument]) -> Result<Vec<BrokenLink>> {
        let per_doc: Vec<Vec<BrokenLink>> = docs
            .par_iter()
            .map(|doc| {
                let links = doc.links()?;
                Ok(links
                    .relative
                    .iter()
                    .filter_map(|link| {
                        let target = doc.resolve_target(link)?;
                        (!target.exists()).then(|| BrokenLink {
                            source: doc.path().to_path_buf(),
                            line: link.line,
                            link: link.clone(),
                            target,
                        })
                    })
                    .collect())
            })
            .collect::<Result<_>>()?;
        Ok(per_doc.into_iter().flatten().collect())
    }

    /// Classify one broken link against the name index
    pub fn classify(&self, broken: &BrokenLink) -> RepairClass {
        let Some(name) = broken.name() else {
            return RepairClass::Unresolved;
        };

        if let Some(paths) = self.index.get(&name) {
            return RepairClass::FileMatch {
                candidates: paths.to_vec(),
            };
        }

        let candidates: Vec<Candidate> = self
            .index
            .close_matches(&name, self.threshold)
            .into_iter()
            .flat_map(|(key, score)| {
                self.index
                    .get(key)
                    .unwrap_or_default()
                    .iter()
                    .map(move |path| Candidate {
                        path: path.clone(),
                        score,
                    })
            })
            .collect();

        if candidates.is_empty() {
            RepairClass::Unresolved
        } else {
            RepairClass::Suggestion { candidates }
        }
    }

    /// Find and classify every broken link in the document set
    pub fn analyze(&self, docs: &[MarkdownDocument]) -> Result<RepairReport> {
        let mut entries: Vec<RepairEntry> = self
            .find_broken_links(docs)?
            .into_iter()
            .map(|broken| {
                let class = self.classify(&broken);
                RepairEntry { broken, class }
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.broken.source, a.broken.line, a.broken.link.url_span.start).cmp(&(
                &b.broken.source,
                b.broken.line,
                b.broken.link.url_span.start,
            ))
        });

        let report = RepairReport { entries };
        log::info!(
            "{} broken links: {} file matches, {} suggestions, {} unresolved",
            report.entries.len(),
            report.file_matches().count(),
            report.suggestions().count(),
            report.unresolved().count()
        );
        Ok(report)
    }

    /// Rewrite every link with a single file match to point at it, relative
    /// to the linking document and keeping the section anchor. With
    /// `dry_run` nothing is modified or written. Changed documents are
    /// written back to their own paths.
    pub fn apply_repairs(
        &self,
        docs: &mut [MarkdownDocument],
        report: &RepairReport,
        dry_run: bool,
    ) -> Result<Vec<AppliedRepair>> {
        let mut planned: HashMap<&Path, Vec<(&RepairEntry, &Path)>> = HashMap::new();
        for entry in &report.entries {
            if let Some(target) = entry.class.unique_match() {
                planned
                    .entry(entry.broken.source.as_path())
                    .or_default()
                    .push((entry, target));
            }
        }

        let mut applied = Vec::new();
        for doc in docs.iter_mut() {
            let Some(mut repairs) = planned.remove(doc.path()) else {
                continue;
            };
            // Right to left within each line keeps earlier spans valid
            repairs.sort_by(|a, b| {
                (b.0.broken.line, b.0.broken.link.url_span.start)
                    .cmp(&(a.0.broken.line, a.0.broken.link.url_span.start))
            });

            let dir = doc.path().parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let source = doc.path().to_path_buf();
            let mut changed = false;
            let mut doc_applied = Vec::new();

            for (entry, target) in repairs {
                let link = &entry.broken.link;
                let mut url = to_url_path(&relative_path(&dir, target));
                if let Some(section) = link.section() {
                    url.push('#');
                    url.push_str(section);
                }

                let lines = doc.lines_mut()?;
                let Some(line) = lines.get_mut(link.line) else {
                    log::warn!("{}: line {} no longer exists", source.display(), link.line + 1);
                    continue;
                };
                let span = link.url_span;
                if line.get(span.start..span.end) != Some(link.url.as_str()) {
                    log::warn!(
                        "{}: line {} changed since analysis, skipping {}",
                        source.display(),
                        link.line + 1,
                        link.full
                    );
                    continue;
                }

                log::info!(
                    "{} - line: {} - {} -> {}",
                    source.display(),
                    link.line + 1,
                    link.full,
                    url
                );
                if !dry_run {
                    line.replace_range(span.start..span.end, &url);
                    changed = true;
                }
                doc_applied.push(AppliedRepair {
                    source: source.clone(),
                    line: link.line,
                    from: link.url.clone(),
                    to: url,
                });
            }

            if changed {
                doc.write_to(&source)?;
            }
            doc_applied.reverse();
            applied.extend(doc_applied);
        }

        Ok(applied)
    }
}
