//! Integration tests for document discovery, list resolution and repair

use mddocs_graph::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, name: &str, text: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

/// A small book: root list, a nested chapter list, three chapters
fn book() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "book.lst", "# The book\nindex.md\nchapters/chapters.lst\n");
    write(root, "chapters/chapters.lst", "one.md\ntwo.md  # second\n");
    write(
        root,
        "index.md",
        "---\ntitle: Handbook\nuuid: 4b7a1c3e-2f6d-4c8b-9a0e-5d1f2e3a4b5c\n---\n# Handbook\n\n- [One](chapters/one.md)\n- [Two](chapters/two.md#start)\n",
    );
    write(
        root,
        "chapters/one.md",
        "# One\n\nBack to [index](../index.md). See [setup](setup.md#install).\n\n```\n[ignored](nowhere.md)\n```\n",
    );
    write(root, "chapters/two.md", "# Two {#start}\n\nNothing else.\n");
    write(root, "appendix/setup.md", "# Setup\n\n## Install\n");
    temp
}

// ==================== List Resolution Tests ====================

#[test]
fn test_root_list_resolves_in_order() {
    let temp = book();
    let root = temp.path();
    let lst = ListDocument::new(root.join("book.lst"));

    assert_eq!(
        lst.links().unwrap(),
        &[
            root.join("index.md"),
            root.join("chapters/one.md"),
            root.join("chapters/two.md"),
        ]
    );
}

#[test]
fn test_self_referencing_list_is_fatal() {
    let temp = book();
    let root = temp.path();
    write(root, "chapters/chapters.lst", "one.md\n../book.lst\n");

    let err = resolve_list(&root.join("book.lst")).unwrap_err();
    assert!(matches!(err, Error::SelfReferentialList { .. }));
    assert!(err.to_string().contains("book.lst"));
}

// ==================== Graph Tests ====================

#[test]
fn test_graph_over_discovered_documents() {
    let temp = book();
    let root = temp.path();
    let docs = search_markdown(root).unwrap();
    assert_eq!(docs.len(), 4);

    let graph = DocumentGraph::from_documents(&docs).unwrap();
    assert_eq!(graph.leaf_documents(), vec![root.join("chapters/two.md")]);
    assert_eq!(graph.orphans(), vec![root.join("appendix/setup.md")]);
    assert_eq!(graph.cycles().len(), 1);

    let back = graph.backlinks(&root.join("index.md"));
    assert_eq!(back[0].0, root.join("chapters/one.md"));
}

// ==================== Repair Tests ====================

#[test]
fn test_repair_round_trip() {
    let temp = book();
    let root = temp.path();
    let mut docs = search_markdown(root).unwrap();

    let engine = RepairEngine::new(NameIndex::from_documents(&docs));
    let report = engine.analyze(&docs).unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(
        report.entries[0].class.unique_match(),
        Some(root.join("appendix/setup.md").as_path())
    );

    let applied = engine.apply_repairs(&mut docs, &report, false).unwrap();
    assert_eq!(applied[0].to, "../appendix/setup.md#install");

    let text = std::fs::read_to_string(root.join("chapters/one.md")).unwrap();
    assert!(text.contains("[setup](../appendix/setup.md#install)"));
    assert!(text.contains("[ignored](nowhere.md)"));

    let docs = search_markdown(root).unwrap();
    assert!(engine.analyze(&docs).unwrap().is_empty());
}
