use super::{Config, CONFIG_FILE};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::load(dir.path());

    assert_eq!(cfg.storage_file, ".auditmark/marks.json");
    assert_eq!(cfg.scroll_margin, 3);
    assert_eq!(
        cfg.storage_path(dir.path()),
        dir.path().join(".auditmark").join("marks.json")
    );
}

#[test]
fn test_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "storage_file = \"review/state.json\"\nhighlight_color = \"blue\"\nscroll_margin = 1\n",
    )
    .unwrap();

    let cfg = Config::load(dir.path());

    assert_eq!(cfg.storage_file, "review/state.json");
    assert_eq!(cfg.highlight_color, "blue");
    assert_eq!(cfg.scroll_margin, 1);
}

#[test]
fn test_absolute_storage_file() {
    let cfg = Config {
        storage_file: "/var/tmp/marks.json".to_string(),
        ..Config::default()
    };
    assert_eq!(
        cfg.storage_path(Path::new("/work")),
        Path::new("/var/tmp/marks.json")
    );
}
