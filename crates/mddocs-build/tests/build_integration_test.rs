//! Integration tests for build preparation in both output modes

use mddocs_build::prelude::*;
use mddocs_core::TocConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, name: &str, text: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "book.lst", "index.md\nchapters/one.md\nchapters/two.md\n");
    write(root, "toc.lst", "chapters/one.md\nchapters/two.md\n");
    write(
        root,
        "index.md",
        "---\ntitle: Guide\nUUID: 0f8fad5b-d9cb-469f-a165-70867728950e\n---\n# Guide\n",
    );
    write(
        root,
        "chapters/one.md",
        "---\ntitle: One\n---\n# One {#one}\n\nNext: [two](two.md#two). ![Diagram](../assets/img/flow.png)\n",
    );
    write(root, "chapters/two.md", "# Two {#two}\n\nBack to [one](one.md#one).\n");
    write(root, "assets/img/flow.png", "png");
    temp
}

fn config(root: &Path) -> ProjectConfig {
    ProjectConfig::builder(root)
        .lst("book.lst")
        .assets("assets")
        .toc(TocConfig {
            lst: "toc.lst".into(),
            index: "index.md".into(),
            depth: 1,
            plugin: "TOC".into(),
        })
        .output(root.join("out"))
        .navigation_plugin("CSV Navigation")
        .json_plugin("JSON Minimum")
        .build()
        .unwrap()
}

// ==================== HTML Mode ====================

#[test]
fn test_html_build() {
    let temp = project();
    let root = temp.path();
    let out = root.join("out");

    let output = Builder::new(config(root)).build(BuildMode::Html).unwrap();
    assert_eq!(output.documents.len(), 3);
    assert_eq!(output.findings.total_issues(), 0);

    let index = read(out.join("index.md"));
    assert!(index.contains("- [One](chapters/one.html){.toc-file}"));
    assert!(index.contains("- [Two](chapters/two.html){.toc-file}"));

    let one = read(out.join("chapters/one.md"));
    assert!(one.contains("[two](two.html#two)"));
    assert!(one.contains("![Diagram](../assets/flow.png)"));
    assert!(out.join("assets/flow.png").is_file());

    let csv = read(out.join("url_map.csv"));
    assert!(csv.starts_with("uuid,title,path\n"));
    assert!(csv.contains("0f8fad5b-d9cb-469f-a165-70867728950e,Guide,index.html"));
    assert!(out.join("basic_document.json").is_file());
    assert_eq!(output.generated.len(), 2);

    // Sources are untouched
    assert!(read(root.join("chapters/one.md")).contains("[two](two.md#two)"));
}

#[test]
fn test_toc_index_outside_list_is_placed_first() {
    let temp = project();
    let root = temp.path();
    let mut config = config(root);
    config.documents.tocs[0].index = "contents.md".into();

    let prepared = Builder::new(config).prepare(BuildMode::Html).unwrap();
    assert_eq!(prepared.documents.len(), 4);
    assert_eq!(prepared.documents[0].path(), root.join("contents.md"));
    assert!(
        prepared.documents[0]
            .contents()
            .unwrap()
            .iter()
            .any(|l| l.ends_with("{.toc-file}"))
    );
}

// ==================== Single Mode ====================

#[test]
fn test_single_build() {
    let temp = project();
    let root = temp.path();

    let output = Builder::new(config(root)).build(BuildMode::Single).unwrap();
    assert_eq!(output.documents, vec![root.join("out/single.md")]);

    let single = read(root.join("out/single.md"));
    assert!(single.contains("[two](#two)"));
    assert!(single.contains("[one](#one)"));
    assert!(single.contains("![Diagram](./assets/flow.png)"));
    assert!(!single.contains("{.toc-file}"));
}

#[test]
fn test_single_build_requires_anchors() {
    let temp = project();
    let root = temp.path();
    write(root, "chapters/two.md", "# Two\n\nSee [here](one.md)\n");

    let err = Builder::new(config(root))
        .prepare(BuildMode::Single)
        .unwrap_err();
    match err {
        Error::MissingSectionAnchor { file, line, text } => {
            assert_eq!(file, root.join("chapters/two.md"));
            assert_eq!(line, 3);
            assert_eq!(text, "[here](one.md)");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("out").exists());
}

// ==================== Missing Assets ====================

#[test]
fn test_missing_asset_left_untouched_in_both_modes() {
    let temp = project();
    let root = temp.path();
    write(
        root,
        "chapters/two.md",
        "# Two {#two}\n\nBack to [one](one.md#one). ![Missing](../assets/img/none.png)\n",
    );

    let html = Builder::new(config(root)).build(BuildMode::Html).unwrap();
    assert_eq!(html.findings.issues_of_kind(IssueKind::BrokenImage).len(), 1);
    assert!(read(root.join("out/chapters/two.md")).contains("![Missing](../assets/img/none.png)"));
    assert!(!root.join("out/assets/none.png").exists());

    let single = Builder::new(config(root)).build(BuildMode::Single).unwrap();
    assert_eq!(single.findings.issues_of_kind(IssueKind::BrokenImage).len(), 1);
    let merged = read(root.join("out/single.md"));
    assert!(merged.contains("![Missing](../assets/img/none.png)"));
    assert!(merged.contains("![Diagram](./assets/flow.png)"));
}
