//! Document graph using petgraph for cross-document link analysis

use crate::document::{Document, MarkdownDocument};
use mddocs_core::prelude::*;
use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Node index type for graph
type NodeIndex = petgraph::graph::NodeIndex;

/// One relative link, seen from either end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Document containing the link
    pub source: PathBuf,
    /// Resolved target path; may not exist
    pub target: PathBuf,
    pub link: Link,
}

/// Every relative link with a path, resolved against its document
fn references_of(doc: &MarkdownDocument) -> Result<Vec<LinkReference>> {
    let links = doc.links()?;
    Ok(links
        .relative
        .iter()
        .filter_map(|link| {
            doc.resolve_target(link).map(|target| LinkReference {
                source: doc.path().to_path_buf(),
                target,
                link: link.clone(),
            })
        })
        .collect())
}

fn collect_references(docs: &[MarkdownDocument]) -> Result<Vec<Vec<LinkReference>>> {
    docs.par_iter().map(references_of).collect()
}

/// Source document to the links it makes, in line order
pub fn forward_index(docs: &[MarkdownDocument]) -> Result<BTreeMap<PathBuf, Vec<LinkReference>>> {
    let mut index = BTreeMap::new();
    for (doc, refs) in docs.iter().zip(collect_references(docs)?) {
        index.insert(doc.path().to_path_buf(), refs);
    }
    Ok(index)
}

/// Target path to the links pointing at it, including targets that do not
/// exist on disk
pub fn reverse_index(docs: &[MarkdownDocument]) -> Result<BTreeMap<PathBuf, Vec<LinkReference>>> {
    let mut index: BTreeMap<PathBuf, Vec<LinkReference>> = BTreeMap::new();
    for reference in collect_references(docs)?.into_iter().flatten() {
        index.entry(reference.target.clone()).or_default().push(reference);
    }
    Ok(index)
}

/// Directed graph of Markdown documents and the relative links between them
pub struct DocumentGraph {
    /// Nodes are document paths, edges are links
    graph: DiGraph<PathBuf, Link>,

    /// Map from full path to node index (for quick lookups)
    path_index: HashMap<PathBuf, NodeIndex>,
}

impl DocumentGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_index: HashMap::new(),
        }
    }

    /// Build the graph for a document set. Links to Markdown files outside
    /// the set produce no edge.
    #[instrument(skip(docs), fields(documents = docs.len()), name = "build_graph")]
    pub fn from_documents(docs: &[MarkdownDocument]) -> Result<Self> {
        let mut graph = Self::new();
        for doc in docs {
            graph.add_document(doc.path());
        }

        for reference in collect_references(docs)?.into_iter().flatten() {
            if !reference.link.relative.as_ref().is_some_and(|r| r.targets_markdown()) {
                continue;
            }
            let Some(&target) = graph.path_index.get(&reference.target) else {
                log::debug!(
                    "{}:{} links outside the document set: {}",
                    reference.source.display(),
                    reference.link.line + 1,
                    reference.target.display()
                );
                continue;
            };
            let source = graph.path_index[&reference.source];
            graph.graph.add_edge(source, target, reference.link);
        }

        log::info!(
            "Document graph: {} documents, {} links",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Add a document node, returning the existing node if already present
    pub fn add_document(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.path_index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.path_index.insert(path.to_path_buf(), idx);
        idx
    }

    /// Documents this document links to, with the links, sorted by path
    pub fn forward_links(&self, path: &Path) -> Vec<(PathBuf, Vec<Link>)> {
        let Some(&idx) = self.path_index.get(path) else {
            return vec![];
        };
        self.group_edges(self.graph.edges(idx).map(|e| (e.target(), e.weight())))
    }

    /// Documents linking to this document, with the links, sorted by path
    pub fn backlinks(&self, path: &Path) -> Vec<(PathBuf, Vec<Link>)> {
        let Some(&idx) = self.path_index.get(path) else {
            return vec![];
        };
        self.group_edges(
            self.graph
                .edges_directed(idx, Incoming)
                .map(|e| (e.source(), e.weight())),
        )
    }

    fn group_edges<'a>(
        &'a self,
        edges: impl Iterator<Item = (NodeIndex, &'a Link)>,
    ) -> Vec<(PathBuf, Vec<Link>)> {
        let grouped = edges.fold(BTreeMap::new(), |mut acc, (idx, link)| {
            acc.entry(self.graph[idx].clone())
                .or_insert_with(Vec::new)
                .push(link.clone());
            acc
        });
        grouped
            .into_iter()
            .map(|(path, mut links)| {
                links.sort_by_key(|l| (l.line, l.url_span.start));
                (path, links)
            })
            .collect()
    }

    /// Distinct (source, target) pairs, sorted
    pub fn edges(&self) -> Vec<(PathBuf, PathBuf)> {
        let pairs: HashSet<_> = self
            .graph
            .edge_references()
            .map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect();
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort();
        pairs
    }

    fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Incoming)
            .collect::<HashSet<_>>()
            .len()
    }

    fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).collect::<HashSet<_>>().len()
    }

    /// Documents referenced by exactly one other document and linking nowhere
    pub fn leaf_documents(&self) -> Vec<PathBuf> {
        let mut leaves: Vec<_> = self
            .graph
            .node_indices()
            .filter(|&idx| self.in_degree(idx) == 1 && self.out_degree(idx) == 0)
            .map(|idx| self.graph[idx].clone())
            .collect();
        leaves.sort();
        leaves
    }

    /// Edges ending at a leaf document
    pub fn leaf_edges(&self) -> Vec<(PathBuf, PathBuf)> {
        let leaves: HashSet<_> = self.leaf_documents().into_iter().collect();
        self.edges()
            .into_iter()
            .filter(|(_, target)| leaves.contains(target))
            .collect()
    }

    /// Documents with no incoming or outgoing links
    pub fn orphans(&self) -> Vec<PathBuf> {
        let mut orphans: Vec<_> = self
            .graph
            .node_indices()
            .filter(|&idx| self.in_degree(idx) == 0 && self.out_degree(idx) == 0)
            .map(|idx| self.graph[idx].clone())
            .collect();
        orphans.sort();
        orphans
    }

    /// Strongly connected components with more than one document
    pub fn cycles(&self) -> Vec<Vec<PathBuf>> {
        let sccs = kosaraju_scc(&self.graph);
        sccs.into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut paths: Vec<_> = scc.iter().map(|&idx| self.graph[idx].clone()).collect();
                paths.sort();
                paths
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let node_count = self.graph.node_count();
        let edge_count = self.graph.edge_count();

        let average_links_per_document = if node_count > 0 {
            edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        GraphStats {
            total_documents: node_count,
            total_links: edge_count,
            orphaned_documents: self.orphans().len(),
            leaf_documents: self.leaf_documents().len(),
            average_links_per_document,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.path_index.contains_key(path)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for DocumentGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_documents: usize,
    pub total_links: usize,
    pub orphaned_documents: usize,
    pub leaf_documents: usize,
    pub average_links_per_document: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, text: &str) -> MarkdownDocument {
        MarkdownDocument::with_contents(path, text.lines().map(str::to_string).collect())
    }

    fn sample() -> Vec<MarkdownDocument> {
        vec![
            doc("/d/index.md", "[a](ch/a.md) [b](ch/b.md#top)\n[web](https://x.y)"),
            doc("/d/ch/a.md", "[back](../index.md)\n[gone](missing.md)"),
            doc("/d/ch/b.md", "# Top\n[pic](img.png)"),
            doc("/d/lonely.md", "nothing here"),
        ]
    }

    #[test]
    fn test_from_documents() {
        let graph = DocumentGraph::from_documents(&sample()).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains(Path::new("/d/ch/a.md")));
    }

    #[test]
    fn test_forward_and_backlinks() {
        let graph = DocumentGraph::from_documents(&sample()).unwrap();
        let forward = graph.forward_links(Path::new("/d/index.md"));
        let targets: Vec<_> = forward.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(targets, vec![PathBuf::from("/d/ch/a.md"), PathBuf::from("/d/ch/b.md")]);

        let back = graph.backlinks(Path::new("/d/index.md"));
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].0, PathBuf::from("/d/ch/a.md"));
        assert!(graph.forward_links(Path::new("/d/unknown.md")).is_empty());
    }

    #[test]
    fn test_leaf_documents_and_orphans() {
        let graph = DocumentGraph::from_documents(&sample()).unwrap();
        assert_eq!(graph.leaf_documents(), vec![PathBuf::from("/d/ch/b.md")]);
        assert_eq!(
            graph.leaf_edges(),
            vec![(PathBuf::from("/d/index.md"), PathBuf::from("/d/ch/b.md"))]
        );
        assert_eq!(graph.orphans(), vec![PathBuf::from("/d/lonely.md")]);
    }

    #[test]
    fn test_cycles() {
        let graph = DocumentGraph::from_documents(&sample()).unwrap();
        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0],
            vec![PathBuf::from("/d/ch/a.md"), PathBuf::from("/d/index.md")]
        );
    }

    #[test]
    fn test_indexes_include_missing_targets() {
        let docs = sample();
        let reverse = reverse_index(&docs).unwrap();
        assert_eq!(reverse[Path::new("/d/ch/missing.md")].len(), 1);
        assert_eq!(reverse[Path::new("/d/ch/img.png")][0].source, PathBuf::from("/d/ch/b.md"));

        let forward = forward_index(&docs).unwrap();
        assert_eq!(forward[Path::new("/d/index.md")].len(), 2);
        assert!(forward[Path::new("/d/lonely.md")].is_empty());
    }

    #[test]
    fn test_graph_stats() {
        let stats = DocumentGraph::from_documents(&sample()).unwrap().stats();
        assert_eq!(stats.total_documents, 4);
        assert_eq!(stats.total_links, 3);
        assert_eq!(stats.orphaned_documents, 1);
        assert_eq!(stats.leaf_documents, 1);
    }
}
