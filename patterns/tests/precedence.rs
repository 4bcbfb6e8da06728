//! Precedence and negation across nested ignore scopes.

use std::fs;
use std::path::Path;

use ctxgen_patterns::{PatternStore, PatternStoreConfig};
use tempfile::TempDir;

const DIALECTS: [&str; 3] = [".gitignore", ".dockerignore", ".contextignore"];

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_root_exclusion_wins_over_child_scopes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "secrets/\n*.env\n");
    write(root, "app/.gitignore", "!*.env\n!secrets/\n");
    write(root, "app/config/.dockerignore", "!local.env\n");

    let config = PatternStoreConfig::new(DIALECTS);
    let store = PatternStore::build(root, &config).unwrap();

    for path in [
        "prod.env",
        "app/prod.env",
        "app/config/local.env",
        "secrets/key.pem",
        "app/secrets/key.pem",
    ] {
        assert!(store.is_excluded(path, false), "{path} should be excluded");
    }
    assert!(store.is_excluded("app/secrets", true));
}

#[test]
fn test_negation_reincludes_within_scope_for_every_dialect() {
    for dialect in DIALECTS {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, &format!("pkg/{dialect}"), "*.json\n!package.json\n");

        let store = PatternStore::build(root, &PatternStoreConfig::new([dialect])).unwrap();

        assert!(
            store.is_excluded("pkg/tsconfig.json", false),
            "{dialect}: broad pattern should exclude"
        );
        assert!(
            !store.is_excluded("pkg/package.json", false),
            "{dialect}: negation should re-include"
        );
        assert!(
            !store.is_excluded("tsconfig.json", false),
            "{dialect}: scope must not leak above its directory"
        );
    }
}

#[test]
fn test_child_scope_adds_narrower_exclusions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "dist/\n");
    write(root, "web/.gitignore", "*.map\n");

    let store = PatternStore::build(root, &PatternStoreConfig::new(DIALECTS)).unwrap();

    assert!(store.is_excluded("web/app.js.map", false));
    assert!(store.is_excluded("web/dist/app.js", false));
    assert!(!store.is_excluded("web/app.js", false));
    assert!(!store.is_excluded("app.js.map", false));
}

#[test]
fn test_windows_separators_are_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".gitignore", "build/\n");

    let store = PatternStore::build(root, &PatternStoreConfig::new(DIALECTS)).unwrap();
    assert!(store.is_excluded("build\\out\\main.js", false));
}
