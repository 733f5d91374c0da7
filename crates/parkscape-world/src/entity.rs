//! Entities (vehicles, peeps, floating text, litter) and their spatial index.
//!
//! Entities are bucketed into 32-unit world quadrants for the renderer's
//! per-quadrant walk. Each quadrant's occupants form a singly-linked chain
//! threaded through the entities themselves; links are `Option<EntityId>`
//! rather than a reserved sentinel index, but traversal order is the same
//! as the original index-linked storage: chains are rebuilt by ascending
//! entity id with head insertion, so higher ids come first.

use std::collections::HashMap;

use parkscape_types::geometry::{CoordsXYZ, TILE_SIZE};
use parkscape_types::image::ImageId;
use parkscape_types::rotation::{Rotation, project};

/// Index of an entity in the world's entity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u16);

/// What an entity is, which decides the paint handler it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Vehicle,
    Guest,
    Staff,
    FloatingText { text: String },
    Litter,
}

impl EntityKind {
    /// Small incidental entities disappear past zoom level 2; vehicles and
    /// peeps are always considered.
    pub const fn hidden_at_far_zoom(&self) -> bool {
        matches!(self, EntityKind::FloatingText { .. } | EntityKind::Litter)
    }
}

/// Projected view-space extents of an entity's sprite, used for culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// One world entity as the renderer sees it.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: CoordsXYZ,
    pub image: ImageId,
    /// Half-width of the sprite in view pixels.
    pub sprite_half_width: i32,
    /// Sprite extent above the anchor point in view pixels.
    pub sprite_height_above: i32,
    /// Sprite extent below the anchor point in view pixels.
    pub sprite_height_below: i32,
    /// View-space bounds under the rotation of the last index rebuild.
    pub bounds: SpriteBounds,
    pub next_in_quadrant: Option<EntityId>,
}

impl Entity {
    fn project_bounds(&self, rotation: Rotation) -> SpriteBounds {
        let anchor = project(self.pos, rotation);
        SpriteBounds {
            left: anchor.x - self.sprite_half_width,
            right: anchor.x + self.sprite_half_width,
            top: anchor.y - self.sprite_height_above,
            bottom: anchor.y + self.sprite_height_below,
        }
    }
}

/// All entities plus the quadrant spatial index over them.
#[derive(Debug, Clone, Default)]
pub struct EntityList {
    entities: Vec<Entity>,
    quadrant_heads: HashMap<(i32, i32), EntityId>,
}

fn quadrant_key(x: i32, y: i32) -> (i32, i32) {
    (
        x.div_euclid(TILE_SIZE),
        y.div_euclid(TILE_SIZE),
    )
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        kind: EntityKind,
        pos: CoordsXYZ,
        image: ImageId,
        sprite_half_width: i32,
        sprite_height_above: i32,
        sprite_height_below: i32,
    ) -> EntityId {
        let id = EntityId(self.entities.len() as u16);
        self.entities.push(Entity {
            id,
            kind,
            pos,
            image,
            sprite_half_width,
            sprite_height_above,
            sprite_height_below,
            bounds: SpriteBounds::default(),
            next_in_quadrant: None,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    pub fn move_entity(&mut self, id: EntityId, pos: CoordsXYZ) {
        if let Some(e) = self.entities.get_mut(id.0 as usize) {
            e.pos = pos;
        }
    }

    /// Rebuild quadrant chains and projected sprite bounds for `rotation`.
    ///
    /// Called by the world layer after entity movement or a camera
    /// rotation; the renderer only ever reads the result.
    pub fn rebuild_spatial_index(&mut self, rotation: Rotation) {
        self.quadrant_heads.clear();
        for i in 0..self.entities.len() {
            let key = quadrant_key(self.entities[i].pos.x, self.entities[i].pos.y);
            let bounds = self.entities[i].project_bounds(rotation);
            let previous_head = self.quadrant_heads.insert(key, EntityId(i as u16));
            let e = &mut self.entities[i];
            e.bounds = bounds;
            e.next_in_quadrant = previous_head;
        }
    }

    pub fn first_in_quadrant(&self, x: i32, y: i32) -> Option<EntityId> {
        self.quadrant_heads.get(&quadrant_key(x, y)).copied()
    }

    /// Walk one quadrant's chain in stored order.
    pub fn quadrant_entities(&self, x: i32, y: i32) -> impl Iterator<Item = &Entity> {
        let mut next = self.first_in_quadrant(x, y);
        std::iter::from_fn(move || {
            let entity = self.get(next?)?;
            next = entity.next_in_quadrant;
            Some(entity)
        })
    }
}
