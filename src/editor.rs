use crate::asset_watch::{AssetChange, AssetWatcher};
use crate::assets::AssetDatabase;
use crate::host::{ObjectIcon, ObjectInspector, ObjectRef};
use crate::scene::EditorScene;
use crate::selection::SelectionBus;
use anyhow::Result;
use bevy_ecs::prelude::Entity;
use std::path::{Path, PathBuf};

/// The editor state the history panel observes: scene, project assets and
/// the active selection.
pub struct EditorHost {
    pub scene: EditorScene,
    pub assets: AssetDatabase,
    pub selection: SelectionBus,
    watcher: Option<AssetWatcher>,
}

impl EditorHost {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            scene: EditorScene::new(),
            assets: AssetDatabase::new(assets_root),
            selection: SelectionBus::new(),
            watcher: None,
        }
    }

    /// Starts watching the assets root so deleted files drop their records.
    pub fn watch_assets(&mut self) -> Result<()> {
        let watcher = AssetWatcher::new(self.assets.root())?;
        self.watcher = Some(watcher);
        Ok(())
    }

    pub fn select(&mut self, selection: Option<ObjectRef>) -> bool {
        let selection = selection.filter(|object| self.is_alive(*object));
        self.selection.select(selection)
    }

    pub fn despawn_entity(&mut self, entity: Entity) -> bool {
        let removed = self.scene.despawn_entity(entity);
        self.drop_dead_selection();
        removed
    }

    pub fn delete_asset(&mut self, object: ObjectRef) -> bool {
        let Some(guid) = object.asset() else {
            return false;
        };
        let removed = self.assets.delete(guid).is_some();
        self.drop_dead_selection();
        removed
    }

    /// Applies pending filesystem changes. Returns true when the catalogue changed.
    pub fn poll_asset_changes(&mut self) -> bool {
        let Some(watcher) = self.watcher.as_mut() else {
            return false;
        };
        let changes = watcher.drain_changes();
        if changes.is_empty() {
            return false;
        }
        let watch_root = watcher.root().to_path_buf();
        let mut changed = false;
        for change in changes {
            changed |= self.apply_asset_change(&watch_root, change);
        }
        self.drop_dead_selection();
        changed
    }

    fn apply_asset_change(&mut self, watch_root: &Path, change: AssetChange) -> bool {
        match change {
            AssetChange::Moved { from, to } => self.apply_asset_move(watch_root, &from, &to),
            AssetChange::Created(path) | AssetChange::Removed(path) | AssetChange::Renamed(path) => {
                self.sync_asset_path(watch_root, &path)
            }
        }
    }

    /// Re-paths the record at `from`, keeping its GUID. Falls back to a plain
    /// sync of both paths when the old path was never registered.
    fn apply_asset_move(&mut self, watch_root: &Path, from: &Path, to: &Path) -> bool {
        let from_rel = self.watched_relative(watch_root, from);
        let to_rel = self.watched_relative(watch_root, to);
        let (Some(from_rel), Some(to_rel)) = (from_rel, to_rel) else {
            return self.sync_asset_path(watch_root, from) | self.sync_asset_path(watch_root, to);
        };
        let Some(guid) = self.assets.guid_for_path(&from_rel) else {
            return self.sync_asset_path(watch_root, to);
        };
        match self.assets.rename(guid, &to_rel) {
            Ok(()) => {
                log::info!(target: "assets", "{from_rel} moved to {to_rel}");
                true
            }
            Err(err) => {
                log::warn!(target: "assets", "failed to move {from_rel} to {to_rel}: {err:?}");
                self.sync_asset_path(watch_root, from) | self.sync_asset_path(watch_root, to)
            }
        }
    }

    /// Imports `path` when it exists and drops its records when it does not.
    fn sync_asset_path(&mut self, watch_root: &Path, path: &Path) -> bool {
        let Some(relative) = self.watched_relative(watch_root, path) else {
            return false;
        };
        if path.exists() {
            if self.assets.guid_for_path(&relative).is_some() {
                return false;
            }
            match self.assets.import(&relative) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!(target: "assets", "failed to import {relative}: {err:?}");
                    false
                }
            }
        } else {
            let removed = self.assets.remove_path(&relative);
            if !removed.is_empty() {
                log::info!(target: "assets", "{relative} removed ({} records)", removed.len());
            }
            !removed.is_empty()
        }
    }

    /// Root-relative path of a watched file, or `None` for paths outside the
    /// root and hidden files.
    fn watched_relative(&self, watch_root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(watch_root).ok()?;
        let relative = self.assets.relative_path(relative).ok()?;
        if relative.is_empty() || relative.rsplit('/').next().is_some_and(|name| name.starts_with('.')) {
            return None;
        }
        Some(relative)
    }

    fn drop_dead_selection(&mut self) {
        if let Some(current) = self.selection.current() {
            if !self.is_alive(current) {
                self.selection.select(None);
            }
        }
    }
}

impl ObjectInspector for EditorHost {
    fn is_alive(&self, object: ObjectRef) -> bool {
        match object {
            ObjectRef::Entity(entity) => self.scene.entity_exists(entity),
            ObjectRef::Asset(guid) => self.assets.contains(guid),
        }
    }

    fn asset_path(&self, object: ObjectRef) -> Option<String> {
        let guid = object.asset()?;
        self.assets.get(guid).map(|record| record.path.clone())
    }

    fn is_scene_object(&self, object: ObjectRef) -> bool {
        object.entity().is_some_and(|entity| self.scene.entity_exists(entity))
    }

    fn object_name(&self, object: ObjectRef) -> Option<String> {
        match object {
            ObjectRef::Entity(entity) => self.scene.name(entity).map(str::to_string),
            ObjectRef::Asset(guid) => self.assets.get(guid).map(|record| record.name.clone()),
        }
    }

    fn object_icon(&self, object: ObjectRef) -> ObjectIcon {
        match object {
            ObjectRef::Entity(_) => ObjectIcon::Entity,
            ObjectRef::Asset(guid) => {
                self.assets.get(guid).map(|record| record.kind.icon()).unwrap_or(ObjectIcon::Other)
            }
        }
    }

    fn object_guid(&self, object: ObjectRef) -> Option<String> {
        match object {
            ObjectRef::Entity(entity) => self.scene.scene_id(entity).map(|id| id.simple().to_string()),
            ObjectRef::Asset(guid) => self.assets.contains(guid).then(|| guid.simple()),
        }
    }

    fn hierarchy_path(&self, object: ObjectRef) -> Option<String> {
        self.scene.hierarchy_path(object.entity()?)
    }
}
