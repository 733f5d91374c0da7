//! The tile map: per-tile element chains and surface height lookup.

use parkscape_types::geometry::{CoordsXY, TILE_SIZE};

use crate::tile::{TileElement, TileElementKind};

/// Square tile map holding each tile's element chain.
///
/// Chains are stored contiguously per tile; iteration stops at the element
/// flagged `last_for_tile`. The renderer treats this structure as read-only.
#[derive(Debug, Clone)]
pub struct WorldMap {
    size_tiles: i32,
    tiles: Vec<Vec<TileElement>>,
}

impl WorldMap {
    /// Create a flat map of `size_tiles` x `size_tiles`, every tile holding
    /// a single surface element at `surface_height` height steps.
    pub fn new_flat(size_tiles: i32, surface_height: u8) -> Self {
        let surface = || {
            let mut e = TileElement::new(
                TileElementKind::Surface {
                    slope: 0,
                    water_height: 0,
                    owned: false,
                    construction_rights: false,
                },
                surface_height,
                surface_height,
            );
            e.last_for_tile = true;
            e
        };
        let count = (size_tiles * size_tiles) as usize;
        Self {
            size_tiles,
            tiles: (0..count).map(|_| vec![surface()]).collect(),
        }
    }

    pub const fn size_tiles(&self) -> i32 {
        self.size_tiles
    }

    /// Largest in-bounds world coordinate on either axis, two tiles in from
    /// the true edge (the outermost ring is unplayable border).
    pub const fn maximum_x_y(&self) -> i32 {
        (self.size_tiles - 2) * TILE_SIZE
    }

    pub fn in_bounds(&self, coords: CoordsXY) -> bool {
        coords.x >= 0
            && coords.y >= 0
            && coords.x < self.size_tiles * TILE_SIZE
            && coords.y < self.size_tiles * TILE_SIZE
    }

    fn tile_index(&self, coords: CoordsXY) -> Option<usize> {
        if !self.in_bounds(coords) {
            return None;
        }
        let tx = coords.x / TILE_SIZE;
        let ty = coords.y / TILE_SIZE;
        Some((ty * self.size_tiles + tx) as usize)
    }

    /// The element chain for the tile containing `coords`, up to and
    /// including the last-for-tile element. Empty for off-map coordinates.
    pub fn elements_at(&self, coords: CoordsXY) -> &[TileElement] {
        let Some(index) = self.tile_index(coords) else {
            return &[];
        };
        let chain = &self.tiles[index];
        let end = chain
            .iter()
            .position(|e| e.last_for_tile)
            .map(|i| i + 1)
            .unwrap_or(chain.len());
        &chain[..end]
    }

    /// Surface height in world z units at `coords`; 16 (two height steps)
    /// for off-map coordinates, matching the border height.
    pub fn surface_height(&self, coords: CoordsXY) -> i32 {
        self.elements_at(coords)
            .iter()
            .find(|e| e.is_surface())
            .map(|e| e.base_z())
            .unwrap_or(16)
    }

    /// Replace the element chain of one tile (world-building helper for
    /// scenarios and tests). The final element's `last_for_tile` flag is
    /// forced on so a malformed chain cannot run into the next tile.
    pub fn set_tile_elements(&mut self, coords: CoordsXY, mut elements: Vec<TileElement>) {
        let Some(index) = self.tile_index(coords) else {
            log::warn!("set_tile_elements: {coords:?} is off the map");
            return;
        };
        if let Some(last) = elements.last_mut() {
            last.last_for_tile = true;
        }
        self.tiles[index] = elements;
    }
}
