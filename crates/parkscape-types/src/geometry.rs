//! World and screen coordinate primitives.
//!
//! World coordinates are in map units: one tile is [`TILE_SIZE`] units on a
//! side. Screen coordinates are in view/device pixels. Both are plain `i32`
//! pairs; all the projection math lives in [`crate::rotation`].

/// World units per map tile edge.
pub const TILE_SIZE: i32 = 32;

/// Smallest world coordinate a viewport focus may take on either axis.
///
/// One tile in from the true map origin, matching the playable area.
pub const MAP_MINIMUM_X_Y: i32 = TILE_SIZE;

/// A 2D world position in map units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordsXY {
    pub x: i32,
    pub y: i32,
}

impl CoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Snap both axes down to the enclosing tile origin.
    pub const fn tile_floor(self) -> Self {
        Self {
            x: self.x & !(TILE_SIZE - 1),
            y: self.y & !(TILE_SIZE - 1),
        }
    }

    pub const fn with_z(self, z: i32) -> CoordsXYZ {
        CoordsXYZ {
            x: self.x,
            y: self.y,
            z,
        }
    }
}

/// A 3D world position in map units; `z` is height above the map base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordsXYZ {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CoordsXYZ {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(self) -> CoordsXY {
        CoordsXY {
            x: self.x,
            y: self.y,
        }
    }
}

/// A position in projected view/screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenCoords {
    pub x: i32,
    pub y: i32,
}

impl ScreenCoords {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned screen rectangle (position + size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, p: ScreenCoords) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True if the two rectangles share any area.
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        other.right() > self.x
            && other.bottom() > self.y
            && other.x < self.right()
            && other.y < self.bottom()
    }
}

/// Snap `value` down to a multiple of `alignment` (power of two).
pub const fn floor2(value: i32, alignment: i32) -> i32 {
    value & !(alignment - 1)
}
