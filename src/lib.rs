//! Selection history for the Kestrel editor: an MRU list of recently
//! selected scene objects and project assets, plus the egui panel and
//! studio shell that present it.

#[cfg(feature = "studio")]
pub mod app;
pub mod asset_watch;
pub mod assets;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod history;
pub mod host;
pub mod panel;
pub mod prefs;
#[cfg(feature = "studio")]
pub mod renderer;
pub mod scene;
pub mod selection;
pub mod theme;

#[cfg(feature = "studio")]
pub use app::{run, run_with_overrides, App};
pub use editor::EditorHost;
pub use history::{FilterState, HistoryTracker, HISTORY_LIMIT};
pub use host::{AssetGuid, ObjectInspector, ObjectRef};
pub use panel::{HistoryPanel, PanelAction};
