//! Contract between the selection history and the editor that hosts it.
//!
//! The history never owns the objects it lists. Everything it needs to know
//! about an object (is it still alive, is it an asset, what is it called) is
//! asked of an [`ObjectInspector`] at the moment it is needed.

use anyhow::Result;
use bevy_ecs::prelude::Entity;
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a project asset. Survives renames and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetGuid(pub Uuid);

impl AssetGuid {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Compact form used for clipboard copies (32 hex digits, no dashes).
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for AssetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Identity of an object the editor can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Entity(Entity),
    Asset(AssetGuid),
}

impl ObjectRef {
    pub fn entity(self) -> Option<Entity> {
        match self {
            ObjectRef::Entity(entity) => Some(entity),
            ObjectRef::Asset(_) => None,
        }
    }

    pub fn asset(self) -> Option<AssetGuid> {
        match self {
            ObjectRef::Asset(guid) => Some(guid),
            ObjectRef::Entity(_) => None,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Entity(entity) => write!(f, "entity={}v{}", entity.index(), entity.generation()),
            ObjectRef::Asset(guid) => write!(f, "asset={guid}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectIcon {
    Entity,
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

impl ObjectIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            ObjectIcon::Entity => "◆",
            ObjectIcon::Scene => "🎬",
            ObjectIcon::Prefab => "📦",
            ObjectIcon::Texture => "🖼",
            ObjectIcon::Mesh => "△",
            ObjectIcon::Material => "●",
            ObjectIcon::Script => "📜",
            ObjectIcon::Audio => "🔊",
            ObjectIcon::Folder => "📁",
            ObjectIcon::Other => "📄",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectIcon::Entity => "entity",
            ObjectIcon::Scene => "scene",
            ObjectIcon::Prefab => "prefab",
            ObjectIcon::Texture => "texture",
            ObjectIcon::Mesh => "mesh",
            ObjectIcon::Material => "material",
            ObjectIcon::Script => "script",
            ObjectIcon::Audio => "audio",
            ObjectIcon::Folder => "folder",
            ObjectIcon::Other => "file",
        }
    }
}

/// Read-only view of host objects.
pub trait ObjectInspector {
    /// False once the host destroyed the object.
    fn is_alive(&self, object: ObjectRef) -> bool;

    /// Project-relative path when the object is backed by a file. Transient
    /// assets resolve to `None` (or an empty string).
    fn asset_path(&self, object: ObjectRef) -> Option<String>;

    /// True for live entities of the scene hierarchy.
    fn is_scene_object(&self, object: ObjectRef) -> bool;

    fn object_name(&self, object: ObjectRef) -> Option<String>;

    fn object_icon(&self, object: ObjectRef) -> ObjectIcon;

    /// Stable identifier as text: asset GUID, or the scene id of an entity.
    fn object_guid(&self, object: ObjectRef) -> Option<String>;

    /// `Parent/Child` style path of a scene object.
    fn hierarchy_path(&self, object: ObjectRef) -> Option<String>;
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

pub trait PreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn set_bool(&mut self, key: &str, value: bool);
}

impl<T: ObjectInspector + ?Sized> ObjectInspector for &T {
    fn is_alive(&self, object: ObjectRef) -> bool {
        (**self).is_alive(object)
    }

    fn asset_path(&self, object: ObjectRef) -> Option<String> {
        (**self).asset_path(object)
    }

    fn is_scene_object(&self, object: ObjectRef) -> bool {
        (**self).is_scene_object(object)
    }

    fn object_name(&self, object: ObjectRef) -> Option<String> {
        (**self).object_name(object)
    }

    fn object_icon(&self, object: ObjectRef) -> ObjectIcon {
        (**self).object_icon(object)
    }

    fn object_guid(&self, object: ObjectRef) -> Option<String> {
        (**self).object_guid(object)
    }

    fn hierarchy_path(&self, object: ObjectRef) -> Option<String> {
        (**self).hierarchy_path(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ref_accessors_split_variants() {
        let guid = AssetGuid::new_v4();
        let asset = ObjectRef::Asset(guid);
        assert_eq!(asset.asset(), Some(guid));
        assert_eq!(asset.entity(), None);
        let entity = ObjectRef::Entity(Entity::from_raw(7));
        assert_eq!(entity.entity(), Some(Entity::from_raw(7)));
        assert_eq!(entity.asset(), None);
    }

    #[test]
    fn guid_display_is_simple_hex() {
        let guid = AssetGuid::new_v4();
        let text = guid.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(text, guid.simple());
    }
}
