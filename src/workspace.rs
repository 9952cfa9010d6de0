//! Workspace roots and the file keys marks are stored under.
//!
//! Marks are keyed by path relative to the workspace root with forward slashes, so the state
//! file stays valid when the workspace is moved or opened on another platform.

use crate::config::{Config, CONFIG_FILE};
use std::path::{Component, Path, PathBuf};

/// Directory names and files whose presence marks a workspace root.
const ROOT_MARKERS: [&str; 3] = [CONFIG_FILE, ".auditmark", ".git"];

#[derive(Clone, Debug)]
/// An opened workspace: its root directory and its configuration.
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    #[must_use]
    /// Opens the workspace rooted at `root`, reading its configuration.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        let config = Config::load(&root);
        Self { root, config }
    }

    #[must_use]
    /// Walks up from `start` to the first directory holding a root marker.
    pub fn discover(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .find(|dir| ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()))
            .map(Self::open)
    }

    #[must_use]
    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    /// Loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    /// Where this workspace's mark state lives.
    pub fn storage_path(&self) -> PathBuf {
        self.config.storage_path(&self.root)
    }

    #[must_use]
    /// Stable key for `path`: relative to the root with `/` separators.
    ///
    /// Files outside the workspace are keyed by their absolute path.
    pub fn relativize(&self, path: &Path) -> String {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        let absolute = absolute.canonicalize().unwrap_or(absolute);

        match absolute.strip_prefix(&self.root) {
            Ok(relative) => join_components(relative),
            Err(_) => absolute.to_string_lossy().replace('\\', "/"),
        }
    }

    #[must_use]
    /// Inverse of `relativize` for keys inside the workspace.
    pub fn resolve(&self, key: &str) -> PathBuf {
        let path = Path::new(key);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn join_components(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "tests/workspace.rs"]
mod tests;
