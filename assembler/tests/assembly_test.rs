//! End-to-end tests for context assembly.
//!
//! These build small workspaces on disk and check the assembled fragments
//! and rendered documents.

use std::fs;
use std::path::Path;

use ctxgen_assembler::{
    ContextAssembler, ContextConfig, ContextFragment, FragmentFormatter, SelectionRequest,
    TemplateFormatter,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fragment_paths(fragments: &[ContextFragment]) -> Vec<&str> {
    fragments.iter().map(|f| f.relative_path.as_str()).collect()
}

#[tokio::test]
async fn test_whole_tree_respects_ignore_and_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "node_modules/\n");
    write(root, "a.ts", "export const a = 1;");
    write(root, "b.md", "# b");
    write(root, "node_modules/c.ts", "export const c = 3;");

    let config = ContextConfig::default().with_extensions(["ts"]);
    let assembler = ContextAssembler::new(root, config).unwrap();
    let assembly = assembler.assemble(&SelectionRequest::WholeTree).await.unwrap();

    assert_eq!(fragment_paths(&assembly.fragments), vec!["a.ts"]);
}

#[tokio::test]
async fn test_excluded_directory_is_never_entered() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "build/\n");
    write(root, "build/out/bundle.ts", "bundle");
    write(root, "src/main.ts", "main");

    for parallel in [false, true] {
        let config = ContextConfig::default().with_parallel_traversal(parallel);
        let assembler = ContextAssembler::new(root, config).unwrap();
        let assembly = assembler.assemble(&SelectionRequest::WholeTree).await.unwrap();

        assert_eq!(fragment_paths(&assembly.fragments), vec!["src/main.ts"]);
    }
}

#[tokio::test]
async fn test_non_utf8_file_is_skipped_with_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.ts", "export const a = 1;");
    fs::write(root.join("bin.ts"), b"\xff\xff").unwrap();

    for parallel in [false, true] {
        let config = ContextConfig::default()
            .with_extensions(["ts"])
            .with_parallel_traversal(parallel);
        let assembler = ContextAssembler::new(root, config).unwrap();
        let assembly = assembler.assemble(&SelectionRequest::WholeTree).await.unwrap();

        assert_eq!(fragment_paths(&assembly.fragments), vec!["a.ts"]);
        assert_eq!(assembly.warnings.len(), 1);
        assert!(
            assembly.warnings[0].starts_with("Skipped bin.ts: "),
            "unexpected warning: {}",
            assembly.warnings[0]
        );
    }
}

#[tokio::test]
async fn test_open_file_pulls_in_imports() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/x.ts", "import \"./y\";\nconsole.log(y);");
    write(root, "src/y.tsx", "export const y = <div />;");

    let config = ContextConfig::default().with_extensions(["ts", "tsx"]);
    let assembler = ContextAssembler::new(root, config).unwrap();
    let assembly = assembler
        .assemble(&SelectionRequest::OpenFile("src/x.ts".into()))
        .await
        .unwrap();

    assert_eq!(fragment_paths(&assembly.fragments), vec!["src/x.ts", "src/y.tsx"]);
}

#[tokio::test]
async fn test_open_file_import_forms() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "src/app.ts",
        r#"
import React from "react";
import { a, b } from './lib/ab';
import * as util from "../shared/util";
const lazy = import('./lazy');
import "./lib/ab";
"#,
    );
    write(root, "src/lib/ab.ts", "export const a = 1, b = 2;");
    write(root, "src/lazy.js", "export default 1;");
    write(root, "shared/util.ts", "export {};");

    let assembler = ContextAssembler::new(root, ContextConfig::default()).unwrap();
    let assembly = assembler
        .assemble(&SelectionRequest::OpenFile(root.join("src/app.ts")))
        .await
        .unwrap();

    // Duplicates are kept; the package import is dropped.
    assert_eq!(
        fragment_paths(&assembly.fragments),
        vec![
            "src/app.ts",
            "src/lib/ab.ts",
            "shared/util.ts",
            "src/lazy.js",
            "src/lib/ab.ts",
        ]
    );
}

#[tokio::test]
async fn test_imports_respect_ignore_patterns() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "generated/\n");
    write(root, "main.ts", "import { api } from './generated/api';\nimport './ok';");
    write(root, "generated/api.ts", "export const api = 1;");
    write(root, "ok.ts", "ok");

    let assembler = ContextAssembler::new(root, ContextConfig::default()).unwrap();
    let assembly = assembler
        .assemble(&SelectionRequest::OpenFile("main.ts".into()))
        .await
        .unwrap();

    assert_eq!(fragment_paths(&assembly.fragments), vec!["main.ts", "ok.ts"]);
}

#[tokio::test]
async fn test_file_without_imports_renders_alone() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "solo.ts", "export const solo = true;");
    write(root, "other.ts", "export const other = true;");

    let assembler = ContextAssembler::new(root, ContextConfig::default()).unwrap();
    let output = assembler
        .generate(&SelectionRequest::OpenFile("solo.ts".into()))
        .await
        .unwrap();

    let expected = TemplateFormatter::default().format(&ContextFragment::new(
        "solo.ts",
        "ts",
        "export const solo = true;",
    ));
    assert_eq!(output.fragment_count, 1);
    assert_eq!(output.document, format!("{expected}\n\n"));
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_assembly_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "*.log\n");
    write(root, "src/a.ts", "import './b';");
    write(root, "src/b.ts", "b");
    write(root, "src/nested/c.md", "c");
    write(root, "debug.log", "log");

    let assembler = ContextAssembler::new(root, ContextConfig::default()).unwrap();
    for request in [
        SelectionRequest::WholeTree,
        SelectionRequest::OpenFile("src/a.ts".into()),
    ] {
        let first = assembler.generate(&request).await.unwrap();
        let second = assembler.generate(&request).await.unwrap();
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_config_file_is_honoured() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "ctxgen.toml",
        r#"
ignore_files = [".contextignore"]
detected_extensions = ["py"]
include_manifest = true
manifest_file = "pyproject.toml"
"#,
    );
    write(root, ".contextignore", "tests/\n");
    write(root, ".gitignore", "app.py\n");
    write(root, "app.py", "print('hi')");
    write(root, "tests/test_app.py", "assert True");
    write(root, "pyproject.toml", "[project]");

    let config = ContextConfig::discover(root).unwrap();
    let assembler = ContextAssembler::new(root, config).unwrap();
    let output = assembler.generate(&SelectionRequest::WholeTree).await.unwrap();

    assert_eq!(output.fragment_count, 2);
    assert!(output.document.starts_with("app.py\n```python\nprint('hi')\n```\n\n"));
    assert!(output.document.ends_with("pyproject.toml\n```toml\n[project]\n```\n\n"));
}
