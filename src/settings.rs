//! Persisted user preferences.
//!
//! Settings live in `settings.json` next to the task database and are written with
//! the same temp-file-and-rename approach as any other on-disk state.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

pub const SETTINGS_FILE: &str = "settings.json";

/// User preferences editable from the settings dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hide to the tray instead of exiting when the main view is closed.
    #[serde(default = "default_close_to_tray")]
    pub close_to_tray: bool,
}

fn default_close_to_tray() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            close_to_tray: default_close_to_tray(),
        }
    }
}

impl Settings {
    /// Settings file location inside a data directory.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Load settings, falling back to defaults if the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unparsable settings, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Save settings as pretty JSON (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&Settings::path_in(dir.path()));
        assert!(settings.close_to_tray);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(&dir.path().join("nested"));
        let settings = Settings { close_to_tray: false };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_missing_key_uses_default() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());
        fs::write(&path, "{}").unwrap();
        assert!(Settings::load(&path).close_to_tray);
    }
}
