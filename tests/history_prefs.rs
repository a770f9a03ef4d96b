use kestrel_selection_history::host::PreferenceStore;
use kestrel_selection_history::panel::HistoryPanel;
use kestrel_selection_history::prefs::{JsonPreferences, TRACK_HIERARCHY_KEY, TRACK_PROJECT_KEY};
use kestrel_selection_history::theme::PanelTheme;
use kestrel_selection_history::{EditorHost, ObjectRef};

#[test]
fn toggles_default_on_and_persist_across_sessions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let prefs_path = dir.path().join("config/editor_prefs.json");
    let host = EditorHost::new(dir.path());

    let mut prefs = JsonPreferences::load(&prefs_path).expect("missing prefs load as empty");
    let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
    assert!(panel.tracker().filter().include_scene_objects);
    assert!(panel.tracker().filter().include_project_assets);

    panel.set_include_scene_objects(false, &mut prefs);
    drop(panel);
    assert!(prefs_path.exists(), "toggle writes through to disk");

    let reloaded = JsonPreferences::load(&prefs_path).expect("reload prefs");
    assert!(!reloaded.get_bool(TRACK_HIERARCHY_KEY, true));
    assert!(reloaded.get_bool(TRACK_PROJECT_KEY, true));
    let panel = HistoryPanel::open(&host.selection, &reloaded, PanelTheme::default());
    assert!(!panel.tracker().filter().include_scene_objects);
    assert!(panel.tracker().filter().include_project_assets);
}

#[test]
fn disabled_hierarchy_tracking_skips_scene_objects() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut host = EditorHost::new(dir.path());
    let mut prefs = JsonPreferences::load_or_default(dir.path().join("prefs.json"));
    let mut panel = HistoryPanel::open(&host.selection, &prefs, PanelTheme::default());
    panel.set_include_scene_objects(false, &mut prefs);

    let player = ObjectRef::Entity(host.scene.spawn_named("Player"));
    host.select(Some(player));
    assert!(!panel.sync(&host));
    assert!(panel.tracker().is_empty());

    panel.set_include_scene_objects(true, &mut prefs);
    host.select(None);
    host.select(Some(player));
    assert!(panel.sync(&host));
    assert_eq!(panel.tracker().len(), 1);
}

#[test]
fn corrupt_preferences_fall_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{ not json").expect("write prefs");
    assert!(JsonPreferences::load(&path).is_err());
    let prefs = JsonPreferences::load_or_default(&path);
    assert!(prefs.get_bool(TRACK_HIERARCHY_KEY, true));
    assert!(prefs.get_bool(TRACK_PROJECT_KEY, true));
}
