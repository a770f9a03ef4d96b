use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "ProjectConfig::default_assets_root")]
    pub assets_root: PathBuf,
    #[serde(default = "ProjectConfig::default_watch_assets")]
    pub watch_assets: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_prefs_path")]
    pub prefs_path: PathBuf,
    #[serde(default = "HistoryConfig::default_theme_path")]
    pub theme_path: PathBuf,
    #[serde(default = "HistoryConfig::default_open_on_start")]
    pub open_on_start: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
    pub assets_root: Option<PathBuf>,
    pub prefs_path: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Kestrel Selection History".to_string(), width: 1280, height: 720, vsync: true }
    }
}

impl ProjectConfig {
    fn default_assets_root() -> PathBuf {
        PathBuf::from("assets")
    }

    const fn default_watch_assets() -> bool {
        true
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { assets_root: Self::default_assets_root(), watch_assets: Self::default_watch_assets() }
    }
}

impl HistoryConfig {
    fn default_prefs_path() -> PathBuf {
        PathBuf::from("config/editor_prefs.json")
    }

    fn default_theme_path() -> PathBuf {
        PathBuf::from("config/history_theme.json")
    }

    const fn default_open_on_start() -> bool {
        true
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            prefs_path: Self::default_prefs_path(),
            theme_path: Self::default_theme_path(),
            open_on_start: Self::default_open_on_start(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!(target: "config", "Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        if let Some(root) = overrides.assets_root.as_ref() {
            self.project.assets_root = root.clone();
        }
        if let Some(prefs) = overrides.prefs_path.as_ref() {
            self.history.prefs_path = prefs.clone();
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.vsync.is_some() {
            fields.push("vsync");
        }
        if self.assets_root.is_some() {
            fields.push("assets");
        }
        if self.prefs_path.is_some() {
            fields.push("prefs");
        }
        fields
    }
}
