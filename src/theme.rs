use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Visual settings of the history panel, optionally read from a JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanelTheme {
    #[serde(default = "PanelTheme::default_row_height")]
    pub row_height: f32,
    #[serde(default = "PanelTheme::default_even_row")]
    pub even_row: [u8; 4],
    #[serde(default = "PanelTheme::default_odd_row")]
    pub odd_row: [u8; 4],
    #[serde(default = "PanelTheme::default_path_color")]
    pub path_color: [u8; 4],
    #[serde(default = "PanelTheme::default_name_size")]
    pub name_size: f32,
    #[serde(default = "PanelTheme::default_path_size")]
    pub path_size: f32,
}

impl PanelTheme {
    const fn default_row_height() -> f32 {
        22.0
    }

    const fn default_even_row() -> [u8; 4] {
        [38, 38, 42, 255]
    }

    const fn default_odd_row() -> [u8; 4] {
        [46, 46, 52, 255]
    }

    const fn default_path_color() -> [u8; 4] {
        [150, 150, 160, 255]
    }

    const fn default_name_size() -> f32 {
        13.0
    }

    const fn default_path_size() -> f32 {
        11.0
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read panel theme {}", path.display()))?;
        let theme = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse panel theme {}", path.display()))?;
        Ok(theme)
    }

    /// Missing or broken theme files are not reported to the user.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(theme) => theme,
            Err(err) => {
                log::debug!(target: "history", "panel theme unavailable: {err:?}");
                Self::default()
            }
        }
    }

    pub fn row_fill(&self, index: usize) -> egui::Color32 {
        let [r, g, b, a] = if index % 2 == 0 { self.even_row } else { self.odd_row };
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn path_color(&self) -> egui::Color32 {
        let [r, g, b, a] = self.path_color;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self {
            row_height: Self::default_row_height(),
            even_row: Self::default_even_row(),
            odd_row: Self::default_odd_row(),
            path_color: Self::default_path_color(),
            name_size: Self::default_name_size(),
            path_size: Self::default_path_size(),
        }
    }
}
