use crate::host::{ObjectIcon, ObjectInspector, ObjectRef};
use std::path::Path;

pub const HISTORY_LIMIT: usize = 50;
pub const SCENE_OBJECT_PLACEHOLDER: &str = "(scene object)";

/// How a selected object relates to the history toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectClass {
    SceneObject,
    ProjectAsset(String),
    Excluded,
}

impl ObjectClass {
    pub fn of(inspector: &impl ObjectInspector, object: ObjectRef) -> Self {
        match inspector.asset_path(object) {
            Some(path) if !path.is_empty() => ObjectClass::ProjectAsset(path),
            _ if inspector.is_scene_object(object) => ObjectClass::SceneObject,
            _ => ObjectClass::Excluded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub include_scene_objects: bool,
    pub include_project_assets: bool,
    pub search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self { include_scene_objects: true, include_project_assets: true, search_query: String::new() }
    }
}

/// What a tracker operation invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChange {
    /// Entries were added, moved or removed.
    History,
    /// Only the filter changed; stored entries are untouched.
    View,
}

/// Weak handle to a previously selected object. Liveness is checked when the
/// view is computed, never at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryEntry(ObjectRef);

impl HistoryEntry {
    pub fn new(object: ObjectRef) -> Self {
        Self(object)
    }

    pub fn object(self) -> ObjectRef {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub entry: HistoryEntry,
    pub display_name: String,
    pub display_path: String,
    pub is_asset: bool,
    pub icon: ObjectIcon,
}

#[derive(Debug, Default)]
pub struct HistoryTracker {
    entries: Vec<HistoryEntry>,
    filter: FilterState,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterState) -> Self {
        Self { entries: Vec::new(), filter }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        self.entries.iter().any(|entry| entry.0 == object)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn on_selection_changed(
        &mut self,
        selection: Option<ObjectRef>,
        inspector: &impl ObjectInspector,
    ) -> Option<HistoryChange> {
        let object = selection?;
        let tracked = match ObjectClass::of(inspector, object) {
            ObjectClass::SceneObject => self.filter.include_scene_objects,
            ObjectClass::ProjectAsset(_) => self.filter.include_project_assets,
            ObjectClass::Excluded => false,
        };
        if !tracked {
            return None;
        }
        if self.entries.first().is_some_and(|front| front.0 == object) {
            return None;
        }
        self.entries.retain(|entry| entry.0 != object);
        self.entries.insert(0, HistoryEntry(object));
        self.entries.truncate(HISTORY_LIMIT);
        Some(HistoryChange::History)
    }

    pub fn remove(&mut self, object: ObjectRef) -> HistoryChange {
        self.entries.retain(|entry| entry.0 != object);
        HistoryChange::History
    }

    pub fn clear(&mut self) -> HistoryChange {
        self.entries.clear();
        HistoryChange::History
    }

    pub fn set_filter(&mut self, filter: FilterState) -> HistoryChange {
        self.filter = filter;
        HistoryChange::View
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> HistoryChange {
        let filter = FilterState { search_query: query.into(), ..self.filter.clone() };
        self.set_filter(filter)
    }

    pub fn set_include_scene_objects(&mut self, include: bool) -> HistoryChange {
        let filter = FilterState { include_scene_objects: include, ..self.filter.clone() };
        self.set_filter(filter)
    }

    pub fn set_include_project_assets(&mut self, include: bool) -> HistoryChange {
        let filter = FilterState { include_project_assets: include, ..self.filter.clone() };
        self.set_filter(filter)
    }

    /// Rows to display, in stored order. Dead objects are skipped and the
    /// search query applied; nothing is cached between calls.
    pub fn visible_view<'a, I>(&'a self, inspector: &'a I) -> impl Iterator<Item = ViewRow> + 'a
    where
        I: ObjectInspector + ?Sized,
    {
        let needle = self.filter.search_query.to_lowercase();
        self.entries.iter().filter_map(move |entry| {
            let row = view_row(inspector, *entry)?;
            if needle.is_empty() || matches_query(&row, &needle) {
                Some(row)
            } else {
                None
            }
        })
    }
}

fn view_row<I: ObjectInspector + ?Sized>(inspector: &I, entry: HistoryEntry) -> Option<ViewRow> {
    let object = entry.object();
    if !inspector.is_alive(object) {
        return None;
    }
    let icon = inspector.object_icon(object);
    match inspector.asset_path(object).filter(|path| !path.is_empty()) {
        Some(path) => {
            let display_name = Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.clone());
            Some(ViewRow { entry, display_name, display_path: path, is_asset: true, icon })
        }
        None => {
            let display_name = inspector.object_name(object).unwrap_or_default();
            Some(ViewRow {
                entry,
                display_name,
                display_path: SCENE_OBJECT_PLACEHOLDER.to_string(),
                is_asset: false,
                icon,
            })
        }
    }
}

fn matches_query(row: &ViewRow, needle: &str) -> bool {
    row.display_name.to_lowercase().contains(needle) || row.display_path.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Entity;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct FakeHost {
        names: HashMap<ObjectRef, String>,
        paths: HashMap<ObjectRef, String>,
        dead: Vec<ObjectRef>,
    }

    impl FakeHost {
        fn scene(&mut self, index: u32, name: &str) -> ObjectRef {
            let object = ObjectRef::Entity(Entity::from_raw(index));
            self.names.insert(object, name.to_string());
            object
        }

        fn asset(&mut self, path: &str) -> ObjectRef {
            let object = ObjectRef::Asset(crate::host::AssetGuid::new_v4());
            self.paths.insert(object, path.to_string());
            object
        }
    }

    impl ObjectInspector for FakeHost {
        fn is_alive(&self, object: ObjectRef) -> bool {
            !self.dead.contains(&object)
        }

        fn asset_path(&self, object: ObjectRef) -> Option<String> {
            self.paths.get(&object).cloned()
        }

        fn is_scene_object(&self, object: ObjectRef) -> bool {
            object.entity().is_some() && self.names.contains_key(&object)
        }

        fn object_name(&self, object: ObjectRef) -> Option<String> {
            self.names.get(&object).cloned()
        }

        fn object_icon(&self, object: ObjectRef) -> ObjectIcon {
            if object.entity().is_some() {
                ObjectIcon::Entity
            } else {
                ObjectIcon::Other
            }
        }

        fn object_guid(&self, object: ObjectRef) -> Option<String> {
            object.asset().map(|guid| guid.to_string())
        }

        fn hierarchy_path(&self, object: ObjectRef) -> Option<String> {
            self.names.get(&object).cloned()
        }
    }

    fn order(tracker: &HistoryTracker) -> Vec<ObjectRef> {
        tracker.entries().iter().map(|entry| entry.object()).collect()
    }

    #[test]
    fn absent_selection_is_ignored() {
        let host = FakeHost::default();
        let mut tracker = HistoryTracker::new();
        assert_eq!(tracker.on_selection_changed(None, &host), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn reselecting_moves_to_front_without_duplicates() {
        let mut host = FakeHost::default();
        let x = host.scene(1, "X");
        let y = host.scene(2, "Y");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(x), &host);
        tracker.on_selection_changed(Some(y), &host);
        assert_eq!(tracker.on_selection_changed(Some(x), &host), Some(HistoryChange::History));
        assert_eq!(order(&tracker), vec![x, y]);
    }

    #[test]
    fn reselecting_front_entry_is_noop() {
        let mut host = FakeHost::default();
        let x = host.scene(1, "X");
        let y = host.asset("textures/y.png");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(y), &host);
        tracker.on_selection_changed(Some(x), &host);
        let before = order(&tracker);
        assert_eq!(tracker.on_selection_changed(Some(x), &host), None);
        assert_eq!(order(&tracker), before);
    }

    #[test]
    fn overflow_evicts_only_the_oldest() {
        let mut host = FakeHost::default();
        let objects: Vec<ObjectRef> =
            (0..=HISTORY_LIMIT as u32).map(|i| host.scene(i, &format!("Entity {i}"))).collect();
        let mut tracker = HistoryTracker::new();
        for object in &objects[..HISTORY_LIMIT] {
            tracker.on_selection_changed(Some(*object), &host);
        }
        assert_eq!(tracker.len(), HISTORY_LIMIT);
        let before = order(&tracker);
        tracker.on_selection_changed(Some(objects[HISTORY_LIMIT]), &host);
        assert_eq!(tracker.len(), HISTORY_LIMIT);
        assert_eq!(tracker.entries()[0].object(), objects[HISTORY_LIMIT]);
        assert!(!tracker.contains(objects[0]), "oldest entry should be evicted");
        assert_eq!(&order(&tracker)[1..], &before[..HISTORY_LIMIT - 1]);
    }

    #[test]
    fn long_mixed_sequences_stay_bounded_and_unique() {
        let mut host = FakeHost::default();
        let objects: Vec<ObjectRef> = (0..80u32)
            .map(|i| if i % 3 == 0 { host.asset(&format!("a/{i}.png")) } else { host.scene(i, "e") })
            .collect();
        let mut tracker = HistoryTracker::new();
        for step in 0..1_000usize {
            let object = objects[(step * 37 + step / 7) % objects.len()];
            tracker.on_selection_changed(Some(object), &host);
            assert!(tracker.len() <= HISTORY_LIMIT);
            let unique: HashSet<ObjectRef> = order(&tracker).into_iter().collect();
            assert_eq!(unique.len(), tracker.len(), "history contains duplicates");
            assert_eq!(tracker.entries()[0].object(), object);
        }
    }

    #[test]
    fn toggles_gate_future_insertions_only() {
        let mut host = FakeHost::default();
        let scene = host.scene(1, "Player");
        let other_scene = host.scene(2, "Camera");
        let asset = host.asset("prefabs/crate.prefab.json");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(scene), &host);
        assert_eq!(tracker.set_include_scene_objects(false), HistoryChange::View);
        assert!(tracker.contains(scene), "existing scene entries are kept");
        assert_eq!(tracker.on_selection_changed(Some(other_scene), &host), None);
        assert!(!tracker.contains(other_scene));

        tracker.set_include_project_assets(false);
        assert_eq!(tracker.on_selection_changed(Some(asset), &host), None);
        tracker.set_include_project_assets(true);
        tracker.on_selection_changed(Some(asset), &host);
        assert_eq!(order(&tracker), vec![asset, scene]);
    }

    #[test]
    fn unclassified_objects_are_dropped() {
        let mut host = FakeHost::default();
        let transient = ObjectRef::Asset(crate::host::AssetGuid::new_v4());
        host.paths.insert(transient, String::new());
        let mut tracker = HistoryTracker::new();
        assert_eq!(ObjectClass::of(&host, transient), ObjectClass::Excluded);
        assert_eq!(tracker.on_selection_changed(Some(transient), &host), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut host = FakeHost::default();
        let x = host.scene(1, "X");
        let y = host.scene(2, "Y");
        let absent = host.scene(3, "Z");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(x), &host);
        tracker.on_selection_changed(Some(y), &host);
        tracker.remove(absent);
        assert_eq!(order(&tracker), vec![y, x]);
        tracker.remove(y);
        assert_eq!(order(&tracker), vec![x]);
        assert_eq!(tracker.clear(), HistoryChange::History);
        assert!(tracker.is_empty());
        tracker.clear();
        assert!(tracker.is_empty());
    }

    #[test]
    fn view_uses_file_name_and_placeholder() {
        let mut host = FakeHost::default();
        let scene = host.scene(1, "Main Camera");
        let asset = host.asset("textures/ui/Button.png");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(scene), &host);
        tracker.on_selection_changed(Some(asset), &host);
        let rows: Vec<ViewRow> = tracker.visible_view(&host).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].display_name, "Button.png");
        assert_eq!(rows[0].display_path, "textures/ui/Button.png");
        assert!(rows[0].is_asset);
        assert_eq!(rows[1].display_name, "Main Camera");
        assert_eq!(rows[1].display_path, SCENE_OBJECT_PLACEHOLDER);
        assert!(!rows[1].is_asset);
    }

    #[test]
    fn view_skips_dead_objects_without_mutating_history() {
        let mut host = FakeHost::default();
        let x = host.scene(1, "X");
        let y = host.scene(2, "Y");
        let mut tracker = HistoryTracker::new();
        tracker.on_selection_changed(Some(x), &host);
        tracker.on_selection_changed(Some(y), &host);
        host.dead.push(y);
        let names: Vec<String> = tracker.visible_view(&host).map(|row| row.display_name).collect();
        assert_eq!(names, vec!["X".to_string()]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_and_keeps_order() {
        let mut host = FakeHost::default();
        let a = host.asset("audio/FootStep.wav");
        let b = host.scene(1, "Boss");
        let c = host.asset("foo/readme.txt");
        let d = host.scene(2, "BigFOOt");
        let mut tracker = HistoryTracker::new();
        for object in [a, b, c, d] {
            tracker.on_selection_changed(Some(object), &host);
        }
        tracker.set_search_query("foo");
        let shown: Vec<ObjectRef> = tracker.visible_view(&host).map(|row| row.entry.object()).collect();
        assert_eq!(shown, vec![d, c, a]);
        let again: Vec<ObjectRef> = tracker.visible_view(&host).map(|row| row.entry.object()).collect();
        assert_eq!(shown, again, "view should be restartable");

        tracker.set_search_query("SCENE OBJ");
        let shown: Vec<ObjectRef> = tracker.visible_view(&host).map(|row| row.entry.object()).collect();
        assert_eq!(shown, vec![d, b], "placeholder path participates in matching");

        tracker.set_search_query("");
        assert_eq!(tracker.visible_view(&host).count(), 4);
    }
}
