//! Read-only world state for the Parkscape renderer.
//!
//! The renderer walks tile element chains and entity quadrant lists but
//! never mutates them; all mutation belongs to the simulation layer. The
//! structures here are the renderer-facing view of that state: per-tile
//! element runs terminated by a last-for-tile flag, and per-quadrant entity
//! chains linked by `Option<EntityId>` indices.

pub mod entity;
pub mod map;
pub mod tile;

pub use entity::{Entity, EntityId, EntityKind, EntityList, SpriteBounds};
pub use map::WorldMap;
pub use tile::{TileElement, TileElementKind, TrackKind};
