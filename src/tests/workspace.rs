use super::Workspace;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_relativize_uses_forward_slashes() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src").join("engine")).unwrap();
    let file = dir.path().join("src").join("engine").join("lib.rs");
    fs::write(&file, "fn main() {}\n").unwrap();

    let workspace = Workspace::open(dir.path());

    assert_eq!(workspace.relativize(&file), "src/engine/lib.rs");
    assert_eq!(
        workspace.resolve("src/engine/lib.rs"),
        workspace.root().join("src/engine/lib.rs")
    );
}

#[test]
fn test_file_outside_workspace_keeps_absolute_key() {
    let workspace_dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let file = elsewhere.path().join("notes.txt");
    fs::write(&file, "x\n").unwrap();

    let workspace = Workspace::open(workspace_dir.path());
    let key = workspace.relativize(&file);

    assert!(key.ends_with("/notes.txt"), "{key}");
    assert!(std::path::Path::new(&key).is_absolute());
}

#[test]
fn test_discover_finds_marker_in_ancestor() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("auditmark.toml"), "").unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let workspace = Workspace::discover(&nested).unwrap();

    assert_eq!(workspace.root(), dir.path().canonicalize().unwrap());
}

#[test]
fn test_storage_path_defaults_under_root() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::open(dir.path());
    assert_eq!(
        workspace.storage_path(),
        workspace.root().join(".auditmark/marks.json")
    );
}
