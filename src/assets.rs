use crate::host::{AssetGuid, ObjectIcon};
use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Scene,
    Prefab,
    Texture,
    Mesh,
    Material,
    Script,
    Audio,
    Folder,
    Other,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_ascii_lowercase();
        if file_name.ends_with(".prefab.json") || file_name.ends_with(".prefab.bin") {
            return AssetKind::Prefab;
        }
        if file_name.ends_with(".scene.json") || file_name.ends_with(".kscene") {
            return AssetKind::Scene;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "hdr" | "ktx2" | "tga" => AssetKind::Texture,
            "gltf" | "glb" | "obj" => AssetKind::Mesh,
            "mat" | "material" => AssetKind::Material,
            "rhai" | "lua" | "wgsl" => AssetKind::Script,
            "wav" | "ogg" | "mp3" | "flac" => AssetKind::Audio,
            _ => AssetKind::Other,
        }
    }

    pub fn icon(self) -> ObjectIcon {
        match self {
            AssetKind::Scene => ObjectIcon::Scene,
            AssetKind::Prefab => ObjectIcon::Prefab,
            AssetKind::Texture => ObjectIcon::Texture,
            AssetKind::Mesh => ObjectIcon::Mesh,
            AssetKind::Material => ObjectIcon::Material,
            AssetKind::Script => ObjectIcon::Script,
            AssetKind::Audio => ObjectIcon::Audio,
            AssetKind::Folder => ObjectIcon::Folder,
            AssetKind::Other => ObjectIcon::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub guid: AssetGuid,
    /// Relative to the assets root, `/` separated. Empty for transient assets.
    pub path: String,
    pub kind: AssetKind,
    pub name: String,
}

impl AssetRecord {
    pub fn is_transient(&self) -> bool {
        self.path.is_empty()
    }
}

/// GUID keyed catalogue of the project's assets.
#[derive(Debug)]
pub struct AssetDatabase {
    root: PathBuf,
    records: HashMap<AssetGuid, AssetRecord>,
    by_path: BTreeMap<String, AssetGuid>,
}

impl AssetDatabase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), records: HashMap::new(), by_path: BTreeMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walks the assets root and imports every visible file and folder.
    /// Records whose files disappeared are dropped. Returns the number of new records.
    pub fn scan(&mut self) -> Result<usize> {
        if !self.root.is_dir() {
            bail!("assets root '{}' is not a directory", self.root.display());
        }
        let mut found = Vec::new();
        collect_entries(&self.root, &self.root, &mut found)?;
        let before = self.records.len();
        let present: HashSet<&str> = found.iter().map(|(relative, _)| relative.as_str()).collect();
        let stale: Vec<String> =
            self.by_path.keys().filter(|path| !present.contains(path.as_str())).cloned().collect();
        for path in stale {
            self.remove_path(&path);
        }
        let survivors = self.records.len();
        for (relative, is_dir) in found {
            let kind = if is_dir { AssetKind::Folder } else { AssetKind::from_path(Path::new(&relative)) };
            self.insert_path(relative, kind);
        }
        log::debug!(
            target: "assets",
            "scanned {}: {} records ({} before)",
            self.root.display(),
            self.records.len(),
            before
        );
        Ok(self.records.len() - survivors)
    }

    /// Registers `path` (absolute under the root, or root-relative). Returns
    /// the existing GUID when the path is already known.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<AssetGuid> {
        let relative = self.relative_path(path.as_ref())?;
        if relative.is_empty() {
            bail!("cannot import the assets root itself");
        }
        let kind = if self.root.join(&relative).is_dir() {
            AssetKind::Folder
        } else {
            AssetKind::from_path(Path::new(&relative))
        };
        Ok(self.insert_path(relative, kind))
    }

    /// In-memory asset that has no file yet.
    pub fn create_transient(&mut self, name: impl Into<String>, kind: AssetKind) -> AssetGuid {
        let guid = AssetGuid::new_v4();
        self.records.insert(guid, AssetRecord { guid, path: String::new(), kind, name: name.into() });
        guid
    }

    pub fn delete(&mut self, guid: AssetGuid) -> Option<AssetRecord> {
        let record = self.records.remove(&guid)?;
        if !record.path.is_empty() {
            self.by_path.remove(&record.path);
        }
        Some(record)
    }

    /// Drops the record at `path` and everything below it.
    pub fn remove_path(&mut self, path: &str) -> Vec<AssetGuid> {
        let prefix = format!("{path}/");
        let doomed: Vec<(String, AssetGuid)> = self
            .by_path
            .iter()
            .filter(|(candidate, _)| candidate.as_str() == path || candidate.starts_with(&prefix))
            .map(|(candidate, guid)| (candidate.clone(), *guid))
            .collect();
        for (candidate, guid) in &doomed {
            self.by_path.remove(candidate);
            self.records.remove(guid);
        }
        doomed.into_iter().map(|(_, guid)| guid).collect()
    }

    /// Moves a record to a new path, keeping its GUID. Records below a moved
    /// folder follow it. Records already registered at a target path are
    /// dropped, as the move replaced their files.
    pub fn rename(&mut self, guid: AssetGuid, new_path: impl AsRef<Path>) -> Result<()> {
        let relative = self.relative_path(new_path.as_ref())?;
        if relative.is_empty() {
            bail!("cannot move asset {guid} onto the assets root");
        }
        let old_path = self.records.get(&guid).with_context(|| format!("unknown asset {guid}"))?.path.clone();
        if old_path == relative {
            return Ok(());
        }
        let mut moves = vec![(guid, relative.clone())];
        if !old_path.is_empty() {
            let prefix = format!("{old_path}/");
            moves.extend(self.by_path.iter().filter_map(|(candidate, child)| {
                candidate.strip_prefix(&prefix).map(|rest| (*child, format!("{relative}/{rest}")))
            }));
        }
        let moving: HashSet<AssetGuid> = moves.iter().map(|(moved, _)| *moved).collect();
        for (moved, target) in &moves {
            if let Some(path) = self.records.get(moved).map(|record| record.path.clone()) {
                if self.by_path.get(&path) == Some(moved) {
                    self.by_path.remove(&path);
                }
            }
            if let Some(displaced) = self.by_path.get(target).copied().filter(|other| !moving.contains(other)) {
                self.by_path.remove(target);
                self.records.remove(&displaced);
            }
        }
        for (moved, target) in moves {
            if let Some(record) = self.records.get_mut(&moved) {
                record.name = file_name_of(&target);
                if record.kind != AssetKind::Folder {
                    record.kind = AssetKind::from_path(Path::new(&target));
                }
                record.path = target.clone();
                self.by_path.insert(target, moved);
            }
        }
        Ok(())
    }

    pub fn get(&self, guid: AssetGuid) -> Option<&AssetRecord> {
        self.records.get(&guid)
    }

    pub fn contains(&self, guid: AssetGuid) -> bool {
        self.records.contains_key(&guid)
    }

    pub fn guid_for_path(&self, path: &str) -> Option<AssetGuid> {
        self.by_path.get(path).copied()
    }

    pub fn absolute_path(&self, guid: AssetGuid) -> Option<PathBuf> {
        let record = self.records.get(&guid)?;
        if record.path.is_empty() {
            return None;
        }
        Some(self.root.join(&record.path))
    }

    /// Records with a path, sorted by path. Transient assets come last.
    pub fn records(&self) -> Vec<&AssetRecord> {
        let mut list: Vec<&AssetRecord> = self.by_path.values().filter_map(|guid| self.records.get(guid)).collect();
        let mut transient: Vec<&AssetRecord> = self.records.values().filter(|r| r.is_transient()).collect();
        transient.sort_by(|a, b| a.name.cmp(&b.name));
        list.extend(transient);
        list
    }

    fn insert_path(&mut self, relative: String, kind: AssetKind) -> AssetGuid {
        if let Some(guid) = self.by_path.get(&relative) {
            return *guid;
        }
        let guid = AssetGuid::new_v4();
        let name = file_name_of(&relative);
        self.records.insert(guid, AssetRecord { guid, path: relative.clone(), kind, name });
        self.by_path.insert(relative, guid);
        guid
    }

    pub fn relative_path(&self, path: &Path) -> Result<String> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root)
                .with_context(|| format!("'{}' is outside {}", path.display(), self.root.display()))?
        } else {
            path
        };
        Ok(normalize_relative(relative))
    }
}

fn collect_entries(root: &Path, dir: &Path, out: &mut Vec<(String, bool)>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let relative = match path.strip_prefix(root) {
            Ok(relative) => normalize_relative(relative),
            Err(_) => continue,
        };
        let ty = entry.file_type()?;
        if ty.is_dir() {
            out.push((relative, true));
            collect_entries(root, &path, out)?;
        } else if ty.is_file() {
            out.push((relative, false));
        }
    }
    Ok(())
}

fn normalize_relative(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name_of(relative: &str) -> String {
    relative.rsplit('/').next().unwrap_or(relative).to_string()
}
