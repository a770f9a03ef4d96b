use bevy_ecs::prelude::*;
use uuid::Uuid;

#[derive(Component, Clone, Debug)]
pub struct EntityName(pub String);

#[derive(Component, Clone, Copy, Debug)]
pub struct SceneEntityTag {
    pub id: Uuid,
}

#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);

#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);

/// Spawn sequence number; keeps hierarchy listing stable across frames.
#[derive(Component, Clone, Copy)]
struct SpawnOrder(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub entity: Entity,
    pub name: String,
    pub depth: usize,
}

/// Scene hierarchy edited by the studio.
pub struct EditorScene {
    pub world: World,
    next_order: u64,
}

impl Default for EditorScene {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorScene {
    pub fn new() -> Self {
        Self { world: World::new(), next_order: 0 }
    }

    pub fn spawn_named(&mut self, name: impl Into<String>) -> Entity {
        let order = self.bump_order();
        self.world
            .spawn((EntityName(name.into()), SceneEntityTag { id: Uuid::new_v4() }, SpawnOrder(order)))
            .id()
    }

    pub fn spawn_child(&mut self, parent: Entity, name: impl Into<String>) -> Option<Entity> {
        if !self.entity_exists(parent) {
            return None;
        }
        let child = self.spawn_named(name);
        self.world.entity_mut(child).insert(Parent(parent));
        match self.world.get_mut::<Children>(parent) {
            Some(mut children) => children.0.push(child),
            None => {
                self.world.entity_mut(parent).insert(Children(vec![child]));
            }
        }
        Some(child)
    }

    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_ok()
    }

    pub fn entity_count(&self) -> usize {
        self.world.iter_entities().count()
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.world.get::<EntityName>(entity).map(|name| name.0.as_str())
    }

    pub fn rename(&mut self, entity: Entity, name: impl Into<String>) -> bool {
        match self.world.get_mut::<EntityName>(entity) {
            Some(mut current) => {
                current.0 = name.into();
                true
            }
            None => false,
        }
    }

    pub fn scene_id(&self, entity: Entity) -> Option<Uuid> {
        self.world.get::<SceneEntityTag>(entity).map(|tag| tag.id)
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<Parent>(entity).map(|parent| parent.0)
    }

    /// Names from the root down to `entity`, joined with `/`.
    pub fn hierarchy_path(&self, entity: Entity) -> Option<String> {
        let mut segments = vec![self.name(entity)?.to_string()];
        let mut cursor = self.parent(entity);
        while let Some(parent) = cursor {
            segments.push(self.name(parent).unwrap_or_default().to_string());
            cursor = self.parent(parent);
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Despawns `entity` and all of its descendants.
    pub fn despawn_entity(&mut self, entity: Entity) -> bool {
        if let Some(parent) = self.parent(entity) {
            if let Some(mut siblings) = self.world.get_mut::<Children>(parent) {
                siblings.0.retain(|&child| child != entity);
            }
        }
        let child_ids = self.world.get::<Children>(entity).map(|c| c.0.clone()).unwrap_or_default();
        let mut removed = false;
        for child in child_ids {
            removed |= self.despawn_entity(child);
        }
        removed |= self.world.despawn(entity);
        removed
    }

    /// Depth-first listing of the hierarchy, roots and siblings in spawn order.
    pub fn hierarchy(&mut self) -> Vec<HierarchyRow> {
        let mut query = self.world.query_filtered::<(Entity, &SpawnOrder), Without<Parent>>();
        let mut roots: Vec<(u64, Entity)> =
            query.iter(&self.world).map(|(entity, order)| (order.0, entity)).collect();
        roots.sort_unstable();
        let mut rows = Vec::new();
        for (_, root) in roots {
            self.push_rows(root, 0, &mut rows);
        }
        rows
    }

    fn push_rows(&self, entity: Entity, depth: usize, rows: &mut Vec<HierarchyRow>) {
        let name = self.name(entity).unwrap_or_default().to_string();
        rows.push(HierarchyRow { entity, name, depth });
        if let Some(children) = self.world.get::<Children>(entity) {
            for &child in &children.0 {
                self.push_rows(child, depth + 1, rows);
            }
        }
    }

    fn bump_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}
