use crate::host::PreferenceStore;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const TRACK_HIERARCHY_KEY: &str = "TrackHierarchy";
pub const TRACK_PROJECT_KEY: &str = "TrackProject";

/// Boolean preferences persisted as a flat JSON object. Every write goes
/// straight to disk.
#[derive(Debug)]
pub struct JsonPreferences {
    path: PathBuf,
    values: BTreeMap<String, bool>,
}

impl JsonPreferences {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let values = if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read preferences {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse preferences {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path: path.to_path_buf(), values })
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(err) => {
                log::warn!(target: "prefs", "{err:?}. Falling back to defaults.");
                Self { path: path.to_path_buf(), values: BTreeMap::new() }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create preferences dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, format!("{json}\n"))
            .with_context(|| format!("Failed to write preferences {}", self.path.display()))
    }
}

impl PreferenceStore for JsonPreferences {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.save() {
            log::warn!(target: "prefs", "failed to persist {key}: {err:?}");
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, bool>,
}

impl PreferenceStore for MemoryPreferences {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().expect("tempdir");
        let prefs = JsonPreferences::load(dir.path().join("editor_prefs.json")).expect("load");
        assert!(prefs.get_bool(TRACK_HIERARCHY_KEY, true));
        assert!(!prefs.get_bool(TRACK_PROJECT_KEY, false));
    }

    #[test]
    fn writes_persist_across_loads() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/editor_prefs.json");
        let mut prefs = JsonPreferences::load(&path).expect("load");
        prefs.set_bool(TRACK_PROJECT_KEY, false);
        let reloaded = JsonPreferences::load(&path).expect("reload");
        assert!(!reloaded.get_bool(TRACK_PROJECT_KEY, true));
        assert!(reloaded.get_bool(TRACK_HIERARCHY_KEY, true));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("editor_prefs.json");
        fs::write(&path, "not json").expect("write");
        assert!(JsonPreferences::load(&path).is_err());
        let prefs = JsonPreferences::load_or_default(&path);
        assert!(prefs.get_bool(TRACK_HIERARCHY_KEY, true));
    }
}
