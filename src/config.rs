//! Configuration to acknowledge reviewer preferences as well as set defaults.
//!
//! Specifically, we try to find an auditmark.toml at the workspace root, and if present we load
//! settings from there. This provides the state file location and highlight styling.

use facet::Facet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the optional per-workspace configuration file.
pub const CONFIG_FILE: &str = "auditmark.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from auditmark.toml or falling back to defaults.
pub struct Config {
    #[facet(default = ".auditmark/marks.json".to_string())]
    /// State file location, relative to the workspace root unless absolute.
    pub storage_file: String,
    #[facet(default = "#1f4d1f".to_string())]
    /// Background colour for marked lines, as a name or `#rrggbb`.
    pub highlight_color: String,
    #[facet(default = 3)]
    /// Lines kept visible above and below the cursor when scrolling.
    pub scroll_margin: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_file: ".auditmark/marks.json".to_string(),
            highlight_color: "#1f4d1f".to_string(),
            scroll_margin: 3,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from `<root>/auditmark.toml` if present.
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE);
        if let Ok(contents) = fs::read_to_string(&path) {
            match facet_toml::from_str::<Self>(&contents) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    #[must_use]
    /// Absolute state file path for a workspace rooted at `root`.
    pub fn storage_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage_file)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
