//! Tile elements: the vertically-stacked contents of one map tile.

use parkscape_types::image::ImageId;

/// Height of one tile-element height step in world z units.
pub const COORDS_Z_STEP: i32 = 8;

/// Track piece families the paint dispatcher can encounter.
///
/// The renderer does not enumerate every ride type; it dispatches through a
/// painter registry keyed by this value, so the set only needs to be open
/// enough for the registry's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Flat,
    Station,
    Slope25,
    Slope60,
    QuarterTurn5,
    QuarterTurn3,
    Brakes,
    /// Anything the registry has no painter for.
    Other(u16),
}

/// The contents of one element slot within a tile's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileElementKind {
    Surface {
        /// Slope corner bits (0 = flat).
        slope: u8,
        /// Water surface height in height steps, 0 for dry land.
        water_height: u8,
        /// Tile is owned parkland (land-rights overlay).
        owned: bool,
        /// Construction rights are held over the tile.
        construction_rights: bool,
    },
    Path {
        image: ImageId,
    },
    Track {
        kind: TrackKind,
        /// Index within a multi-tile track piece.
        sequence: u8,
        ride_index: u8,
    },
    SmallScenery {
        image: ImageId,
    },
    Entrance {
        image: ImageId,
    },
    Wall {
        image: ImageId,
    },
    LargeScenery {
        image: ImageId,
    },
    Banner {
        image: ImageId,
    },
}

/// One element in a tile's chain. Chains are stored contiguously and
/// terminated by `last_for_tile`, not by length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileElement {
    pub kind: TileElementKind,
    /// Base height in height steps ([`COORDS_Z_STEP`] world units each).
    pub base_height: u8,
    /// Top of the element in height steps.
    pub clearance_height: u8,
    /// Element facing, 0-3.
    pub direction: u8,
    /// Terminates the tile's chain.
    pub last_for_tile: bool,
}

impl TileElement {
    pub fn new(kind: TileElementKind, base_height: u8, clearance_height: u8) -> Self {
        Self {
            kind,
            base_height,
            clearance_height,
            direction: 0,
            last_for_tile: false,
        }
    }

    pub const fn base_z(&self) -> i32 {
        self.base_height as i32 * COORDS_Z_STEP
    }

    pub const fn clearance_z(&self) -> i32 {
        self.clearance_height as i32 * COORDS_Z_STEP
    }

    pub const fn is_surface(&self) -> bool {
        matches!(self.kind, TileElementKind::Surface { .. })
    }
}
