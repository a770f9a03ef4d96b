//! Dockable "Selection History" panel.
//!
//! The panel owns its [`HistoryTracker`] and a [`SelectionSubscription`]; both
//! go away when the panel is dropped. Drawing returns [`PanelAction`]s for the
//! host to carry out, except `Remove`, which only touches the history.

use crate::history::{FilterState, HistoryChange, HistoryTracker, ViewRow};
use crate::host::{Clipboard, ObjectInspector, ObjectRef, PreferenceStore};
use crate::prefs::{TRACK_HIERARCHY_KEY, TRACK_PROJECT_KEY};
use crate::selection::{SelectionBus, SelectionSubscription};
use crate::theme::PanelTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Make the object the active selection and reveal it in its browser.
    Select(ObjectRef),
    Open(ObjectRef),
    ShowInFileSystem(ObjectRef),
    CopyGuid(ObjectRef),
    CopyName(ObjectRef),
    CopyPath(ObjectRef),
    Remove(ObjectRef),
}

impl PanelAction {
    pub fn object(self) -> ObjectRef {
        match self {
            PanelAction::Select(object)
            | PanelAction::Open(object)
            | PanelAction::ShowInFileSystem(object)
            | PanelAction::CopyGuid(object)
            | PanelAction::CopyName(object)
            | PanelAction::CopyPath(object)
            | PanelAction::Remove(object) => object,
        }
    }

    /// Entries of the row context menu, in display order.
    pub fn context_menu(row: &ViewRow) -> Vec<(&'static str, PanelAction)> {
        let object = row.entry.object();
        let mut entries = Vec::with_capacity(6);
        if row.is_asset {
            entries.push(("Open", PanelAction::Open(object)));
            entries.push(("Show in File System", PanelAction::ShowInFileSystem(object)));
        }
        entries.push(("Copy GUID", PanelAction::CopyGuid(object)));
        entries.push(("Copy Name", PanelAction::CopyName(object)));
        entries.push(("Copy Path", PanelAction::CopyPath(object)));
        entries.push(("Remove from History", PanelAction::Remove(object)));
        entries
    }
}

pub struct HistoryPanel {
    tracker: HistoryTracker,
    subscription: SelectionSubscription,
    theme: PanelTheme,
    search_input: String,
}

impl HistoryPanel {
    pub fn open(bus: &SelectionBus, prefs: &dyn PreferenceStore, theme: PanelTheme) -> Self {
        let filter = FilterState {
            include_scene_objects: prefs.get_bool(TRACK_HIERARCHY_KEY, true),
            include_project_assets: prefs.get_bool(TRACK_PROJECT_KEY, true),
            search_query: String::new(),
        };
        log::debug!(
            target: "history",
            "panel opened (hierarchy={}, project={})",
            filter.include_scene_objects,
            filter.include_project_assets
        );
        Self {
            tracker: HistoryTracker::with_filter(filter),
            subscription: bus.subscribe(),
            theme,
            search_input: String::new(),
        }
    }

    pub fn tracker(&self) -> &HistoryTracker {
        &self.tracker
    }

    /// Feeds pending selection notifications into the history.
    pub fn sync(&mut self, inspector: &impl ObjectInspector) -> bool {
        let mut changed = false;
        for selection in self.subscription.drain() {
            if let Some(change) = self.tracker.on_selection_changed(selection, inspector) {
                self.note(change);
                changed = true;
            }
        }
        changed
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.search_input = query.clone();
        let change = self.tracker.set_search_query(query);
        self.note(change);
    }

    pub fn set_include_scene_objects(&mut self, include: bool, prefs: &mut dyn PreferenceStore) {
        prefs.set_bool(TRACK_HIERARCHY_KEY, include);
        let change = self.tracker.set_include_scene_objects(include);
        self.note(change);
    }

    pub fn set_include_project_assets(&mut self, include: bool, prefs: &mut dyn PreferenceStore) {
        prefs.set_bool(TRACK_PROJECT_KEY, include);
        let change = self.tracker.set_include_project_assets(include);
        self.note(change);
    }

    pub fn remove(&mut self, object: ObjectRef) {
        let change = self.tracker.remove(object);
        self.note(change);
    }

    pub fn clear(&mut self) {
        let change = self.tracker.clear();
        self.note(change);
    }

    fn note(&self, change: HistoryChange) {
        log::trace!(target: "history", "{change:?} changed ({} entries)", self.tracker.len());
    }

    /// Draws the panel body. `active` is the host's current selection and is
    /// highlighted when listed.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        inspector: &impl ObjectInspector,
        prefs: &mut dyn PreferenceStore,
        active: Option<ObjectRef>,
    ) -> Vec<PanelAction> {
        self.sync(inspector);
        let mut actions = Vec::new();
        self.show_toolbar(ui, prefs);
        ui.separator();

        let rows: Vec<ViewRow> = self.tracker.visible_view(inspector).collect();
        let theme = &self.theme;
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            if rows.is_empty() {
                let hint = if self.tracker.filter().search_query.is_empty() {
                    "Select something in the hierarchy or project to start a history."
                } else {
                    "No entries match the search."
                };
                ui.weak(hint);
                return;
            }
            for (index, row) in rows.iter().enumerate() {
                draw_row(ui, theme, index, row, active == Some(row.entry.object()), &mut actions);
            }
        });

        for action in &actions {
            if let PanelAction::Remove(object) = action {
                self.remove(*object);
            }
        }
        actions.retain(|action| !matches!(action, PanelAction::Remove(_)));
        actions
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui, prefs: &mut dyn PreferenceStore) {
        ui.horizontal(|ui| {
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search name or path")
                    .desired_width(160.0),
            );
            if search.changed() {
                let query = self.search_input.clone();
                self.set_search_query(query);
            }
            let mut include_scene = self.tracker.filter().include_scene_objects;
            if ui.checkbox(&mut include_scene, "Hierarchy").on_hover_text("Track scene objects").changed() {
                self.set_include_scene_objects(include_scene, prefs);
            }
            let mut include_assets = self.tracker.filter().include_project_assets;
            if ui.checkbox(&mut include_assets, "Project").on_hover_text("Track project assets").changed() {
                self.set_include_project_assets(include_assets, prefs);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!self.tracker.is_empty(), egui::Button::new("Clear")).clicked() {
                    self.clear();
                }
            });
        });
    }
}

impl Drop for HistoryPanel {
    fn drop(&mut self) {
        log::debug!(target: "history", "panel closed, discarding {} entries", self.tracker.len());
    }
}

fn draw_row(
    ui: &mut egui::Ui,
    theme: &PanelTheme,
    index: usize,
    row: &ViewRow,
    highlighted: bool,
    actions: &mut Vec<PanelAction>,
) {
    let fill = if highlighted { ui.visuals().selection.bg_fill } else { theme.row_fill(index) };
    let frame = egui::Frame::new().fill(fill).inner_margin(egui::Margin::symmetric(6, 2));
    let inner = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.set_min_height(theme.row_height);
        ui.horizontal(|ui| {
            ui.add(egui::Label::new(row.icon.glyph()).selectable(false));
            ui.add(
                egui::Label::new(egui::RichText::new(&row.display_name).strong().size(theme.name_size))
                    .selectable(false)
                    .truncate(),
            );
            ui.add(
                egui::Label::new(
                    egui::RichText::new(&row.display_path)
                        .italics()
                        .size(theme.path_size)
                        .color(theme.path_color()),
                )
                .selectable(false)
                .truncate(),
            );
        });
    });
    let object = row.entry.object();
    let id = ui.id().with(("history_row", index, object));
    let response = ui.interact(inner.response.rect, id, egui::Sense::click());
    if response.clicked() {
        actions.push(PanelAction::Select(object));
    }
    response.context_menu(|ui| {
        for (label, action) in PanelAction::context_menu(row) {
            if ui.button(label).clicked() {
                actions.push(action);
                ui.close();
            }
        }
    });
    response.on_hover_text(format!("{} ({})", row.display_path, row.icon.label()));
}

/// Text a copy action puts on the clipboard. Scene objects copy their
/// hierarchy path for "Copy Path".
pub fn copy_text(action: PanelAction, inspector: &impl ObjectInspector) -> Option<String> {
    let object = action.object();
    match action {
        PanelAction::CopyGuid(_) => inspector.object_guid(object),
        PanelAction::CopyName(_) => {
            let path = inspector.asset_path(object).filter(|path| !path.is_empty());
            match path {
                Some(path) => path.rsplit('/').next().map(str::to_string),
                None => inspector.object_name(object),
            }
        }
        PanelAction::CopyPath(_) => inspector
            .asset_path(object)
            .filter(|path| !path.is_empty())
            .or_else(|| inspector.hierarchy_path(object)),
        _ => None,
    }
}

/// Writes the text of a copy action to `clipboard`. Returns false when the
/// action is not a copy or nothing could be resolved.
pub fn apply_copy(action: PanelAction, inspector: &impl ObjectInspector, clipboard: &mut dyn Clipboard) -> bool {
    let Some(text) = copy_text(action, inspector) else {
        return false;
    };
    match clipboard.set_text(&text) {
        Ok(()) => true,
        Err(err) => {
            log::warn!(target: "history", "clipboard copy failed: {err:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::editor::EditorHost;
    use crate::history::{HistoryEntry, SCENE_OBJECT_PLACEHOLDER};
    use crate::host::{AssetGuid, ObjectIcon};
    use crate::prefs::MemoryPreferences;
    use tempfile::tempdir;

    fn asset_row() -> ViewRow {
        ViewRow {
            entry: HistoryEntry::new(ObjectRef::Asset(AssetGuid::new_v4())),
            display_name: "atlas.png".into(),
            display_path: "images/atlas.png".into(),
            is_asset: true,
            icon: ObjectIcon::Texture,
        }
    }

    #[test]
    fn context_menu_hides_asset_actions_for_scene_objects() {
        let mut row = asset_row();
        let labels: Vec<&str> = PanelAction::context_menu(&row).into_iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec!["Open", "Show in File System", "Copy GUID", "Copy Name", "Copy Path", "Remove from History"]
        );
        row.is_asset = false;
        row.display_path = SCENE_OBJECT_PLACEHOLDER.into();
        let labels: Vec<&str> = PanelAction::context_menu(&row).into_iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Copy GUID", "Copy Name", "Copy Path", "Remove from History"]);
    }

    #[test]
    fn open_reads_toggles_and_close_unsubscribes() {
        let mut host = EditorHost::new("assets");
        let mut prefs = MemoryPreferences::default();
        prefs.set_bool(TRACK_HIERARCHY_KEY, false);
        let panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
        assert!(!panel.tracker().filter().include_scene_objects);
        assert!(panel.tracker().filter().include_project_assets);
        assert_eq!(host.selection.subscriber_count(), 1);
        drop(panel);
        assert_eq!(host.selection.subscriber_count(), 0);
        let entity = host.scene.spawn_named("After close");
        host.select(Some(ObjectRef::Entity(entity)));
    }

    #[test]
    fn sync_tracks_selection_changes() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("hero.png"), b"png").expect("write asset");
        let mut host = EditorHost::new(dir.path());
        host.assets.scan().expect("scan");
        let prefs = MemoryPreferences::default();
        let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());

        let entity = ObjectRef::Entity(host.scene.spawn_named("Hero"));
        let asset = ObjectRef::Asset(host.assets.guid_for_path("hero.png").expect("asset"));
        host.select(Some(entity));
        host.select(Some(asset));
        host.select(None);
        assert!(panel.sync(&host));
        assert!(!panel.sync(&host), "notifications are drained once");
        let order: Vec<ObjectRef> = panel.tracker().entries().iter().map(|e| e.object()).collect();
        assert_eq!(order, vec![asset, entity]);
    }

    #[test]
    fn toggles_write_preferences() {
        let host = EditorHost::new("assets");
        let mut prefs = MemoryPreferences::default();
        let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
        panel.set_include_project_assets(false, &mut prefs);
        assert!(!prefs.get_bool(TRACK_PROJECT_KEY, true));
        assert!(!panel.tracker().filter().include_project_assets);
        panel.set_include_scene_objects(false, &mut prefs);
        assert!(!prefs.get_bool(TRACK_HIERARCHY_KEY, true));
    }

    #[test]
    fn copy_actions_resolve_text() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("prefabs")).expect("mkdir");
        std::fs::write(dir.path().join("prefabs/crate.prefab.json"), b"{}").expect("write asset");
        let mut host = EditorHost::new(dir.path());
        host.assets.scan().expect("scan");
        let guid = host.assets.guid_for_path("prefabs/crate.prefab.json").expect("asset");
        let asset = ObjectRef::Asset(guid);
        let root = host.scene.spawn_named("Level");
        let child = ObjectRef::Entity(host.scene.spawn_child(root, "Crate").expect("child"));

        let mut clipboard = MemoryClipboard::default();
        assert!(apply_copy(PanelAction::CopyPath(asset), &host, &mut clipboard));
        assert_eq!(clipboard.contents.as_deref(), Some("prefabs/crate.prefab.json"));
        assert!(apply_copy(PanelAction::CopyName(asset), &host, &mut clipboard));
        assert_eq!(clipboard.contents.as_deref(), Some("crate.prefab.json"));
        assert!(apply_copy(PanelAction::CopyGuid(asset), &host, &mut clipboard));
        assert_eq!(clipboard.contents, Some(guid.simple()));
        assert!(apply_copy(PanelAction::CopyPath(child), &host, &mut clipboard));
        assert_eq!(clipboard.contents.as_deref(), Some("Level/Crate"));
        assert!(apply_copy(PanelAction::CopyName(child), &host, &mut clipboard));
        assert_eq!(clipboard.contents.as_deref(), Some("Crate"));

        assert!(!apply_copy(PanelAction::Open(asset), &host, &mut clipboard));
        let gone = ObjectRef::Asset(AssetGuid::new_v4());
        assert!(!apply_copy(PanelAction::CopyGuid(gone), &host, &mut clipboard));
    }

    /// Headless egui frame driver for `HistoryPanel::show`.
    struct Frames {
        ctx: egui::Context,
    }

    struct Frame {
        actions: Vec<PanelAction>,
        texts: Vec<(String, egui::Rect)>,
    }

    impl Frames {
        fn new() -> Self {
            Self { ctx: egui::Context::default() }
        }

        fn run(
            &self,
            panel: &mut HistoryPanel,
            host: &EditorHost,
            prefs: &mut MemoryPreferences,
            events: Vec<egui::Event>,
        ) -> Frame {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))),
                events,
                ..Default::default()
            };
            let mut actions = Vec::new();
            let output = self.ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    actions = panel.show(ui, host, &mut *prefs, None);
                });
            });
            let mut texts = Vec::new();
            for clipped in &output.shapes {
                collect_texts(&clipped.shape, &mut texts);
            }
            Frame { actions, texts }
        }

        /// Presses and releases `button` over the text `label` drawn in `frame`.
        fn click(
            &self,
            frame: &Frame,
            label: &str,
            button: egui::PointerButton,
            panel: &mut HistoryPanel,
            host: &EditorHost,
            prefs: &mut MemoryPreferences,
        ) -> Frame {
            let pos = frame.rect_of(label).center();
            let press = vec![
                egui::Event::PointerMoved(pos),
                egui::Event::PointerButton { pos, button, pressed: true, modifiers: egui::Modifiers::default() },
            ];
            self.run(panel, host, prefs, press);
            let release =
                vec![egui::Event::PointerButton { pos, button, pressed: false, modifiers: egui::Modifiers::default() }];
            self.run(panel, host, prefs, release)
        }
    }

    impl Frame {
        fn has_text(&self, needle: &str) -> bool {
            self.texts.iter().any(|(text, _)| text == needle)
        }

        fn rect_of(&self, needle: &str) -> egui::Rect {
            self.texts
                .iter()
                .find(|(text, _)| text == needle)
                .map(|(_, rect)| *rect)
                .unwrap_or_else(|| panic!("'{needle}' not drawn; saw {:?}", self.texts))
        }
    }

    fn collect_texts(shape: &egui::Shape, out: &mut Vec<(String, egui::Rect)>) {
        match shape {
            egui::Shape::Text(text) => out.push((text.galley.text().to_string(), text.visual_bounding_rect())),
            egui::Shape::Vec(shapes) => {
                for shape in shapes {
                    collect_texts(shape, out);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn show_explains_empty_history_and_search_misses() {
        let mut host = EditorHost::new("assets");
        let mut prefs = MemoryPreferences::default();
        let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
        let frames = Frames::new();
        frames.run(&mut panel, &host, &mut prefs, Vec::new());
        let frame = frames.run(&mut panel, &host, &mut prefs, Vec::new());
        assert!(frame.actions.is_empty());
        assert!(frame.has_text("Select something in the hierarchy or project to start a history."));

        let entity = ObjectRef::Entity(host.scene.spawn_named("Lantern"));
        host.select(Some(entity));
        let frame = frames.run(&mut panel, &host, &mut prefs, Vec::new());
        assert!(frame.has_text("Lantern"));
        assert!(frame.has_text(SCENE_OBJECT_PLACEHOLDER));

        panel.set_search_query("zzz");
        let frame = frames.run(&mut panel, &host, &mut prefs, Vec::new());
        assert!(frame.has_text("No entries match the search."));
        assert!(!frame.has_text("Lantern"));
        assert_eq!(panel.tracker().len(), 1);
    }

    #[test]
    fn clicking_a_row_returns_select() {
        let mut host = EditorHost::new("assets");
        let mut prefs = MemoryPreferences::default();
        let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
        let first = ObjectRef::Entity(host.scene.spawn_named("First"));
        let second = ObjectRef::Entity(host.scene.spawn_named("Second"));
        host.select(Some(first));
        host.select(Some(second));

        let frames = Frames::new();
        frames.run(&mut panel, &host, &mut prefs, Vec::new());
        let frame = frames.run(&mut panel, &host, &mut prefs, Vec::new());
        let frame = frames.click(&frame, "First", egui::PointerButton::Primary, &mut panel, &host, &mut prefs);
        assert_eq!(frame.actions, vec![PanelAction::Select(first)]);
        assert_eq!(panel.tracker().len(), 2, "selecting from the panel does not edit the history");
    }

    #[test]
    fn context_menu_remove_is_applied_by_show() {
        let mut host = EditorHost::new("assets");
        let mut prefs = MemoryPreferences::default();
        let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
        let keep = ObjectRef::Entity(host.scene.spawn_named("Keeper"));
        let temp = ObjectRef::Entity(host.scene.spawn_named("Temp"));
        host.select(Some(keep));
        host.select(Some(temp));

        let frames = Frames::new();
        frames.run(&mut panel, &host, &mut prefs, Vec::new());
        let frame = frames.run(&mut panel, &host, &mut prefs, Vec::new());
        let frame = frames.click(&frame, "Temp", egui::PointerButton::Secondary, &mut panel, &host, &mut prefs);
        let frame = if frame.has_text("Remove from History") {
            frame
        } else {
            frames.run(&mut panel, &host, &mut prefs, Vec::new())
        };
        assert!(frame.has_text("Copy GUID"));
        assert!(!frame.has_text("Open"), "scene objects have no file actions");

        let frame =
            frames.click(&frame, "Remove from History", egui::PointerButton::Primary, &mut panel, &host, &mut prefs);
        assert!(frame.actions.iter().all(|action| !matches!(action, PanelAction::Remove(_))));
        assert!(!panel.tracker().contains(temp));
        assert!(panel.tracker().contains(keep));
    }
}
