//! Saved user preferences: the last input directory and target language.
//!
//! Stored as TOML under the platform config directory
//! (`<config>/mclang/prefs.toml`), or at `$MCLANG_PREFS_PATH` when set. Only
//! the CLI reads and writes this file; the library never sees it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PREFS_PATH_ENV: &str = "MCLANG_PREFS_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_target_lang: Option<String>,
}

/// Location of the preferences file, if one can be determined.
pub fn prefs_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(PREFS_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|base| base.join("mclang").join("prefs.toml"))
}

impl Preferences {
    /// Loads preferences from `path`. A missing file yields defaults; an
    /// unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Loads preferences from the default location, falling back to defaults
    /// (with a warning) when the file cannot be used.
    pub fn load() -> Self {
        let Some(path) = prefs_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(event = "prefs_ignored", "{}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize preferences: {}", e))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    pub fn save(&self) -> Result<(), String> {
        let path = prefs_path().ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Deletes the preferences file. Returns whether a file was removed.
    pub fn clear() -> Result<bool, String> {
        let Some(path) = prefs_path() else {
            return Ok(false);
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(format!("Failed to remove {}: {}", path.display(), e)),
        }
    }
}
