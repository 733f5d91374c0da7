//! Camera rotation and the isometric world-to-screen projection.
//!
//! The camera faces one of four fixed directions around the vertical axis.
//! Each rotation uses its own hand-written sign/swap formula rather than a
//! generic rotation matrix; the four branches are not symmetric (rotation 0
//! and rotation 2 differ in more than sign) and are preserved exactly, since
//! every other part of the pipeline -- quadrant walk order, position hashes,
//! bounding-box comparisons -- is derived from the same formulas.

use crate::geometry::{CoordsXY, CoordsXYZ, ScreenCoords};

/// One of the four camera-facing directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    R0,
    R1,
    R2,
    R3,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R1, Rotation::R2, Rotation::R3];

    /// Masks to the low two bits, so out-of-range values wrap like the
    /// original's `rotation & 3`.
    pub const fn from_u8(value: u8) -> Self {
        match value & 3 {
            0 => Rotation::R0,
            1 => Rotation::R1,
            2 => Rotation::R2,
            _ => Rotation::R3,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R1 => 1,
            Rotation::R2 => 2,
            Rotation::R3 => 3,
        }
    }

    pub const fn next_clockwise(self) -> Self {
        Self::from_u8(self.as_u8().wrapping_add(1))
    }
}

impl CoordsXY {
    /// Rotate a world offset by a map direction (quarter turns).
    ///
    /// Direction 1 maps `(x, y)` to `(y, -x)`; direction 3 is the inverse.
    pub const fn rotated(self, direction: u8) -> Self {
        match direction & 3 {
            0 => self,
            1 => Self {
                x: self.y,
                y: -self.x,
            },
            2 => Self {
                x: -self.x,
                y: -self.y,
            },
            _ => Self {
                x: -self.y,
                y: self.x,
            },
        }
    }
}

/// Project a 3D world position to 2D view space under `rotation`.
///
/// The `>> 1` is an arithmetic shift, not a division; for negative sums the
/// two differ by one and the shift is the behavior everything downstream
/// expects.
pub const fn project(coords: CoordsXYZ, rotation: Rotation) -> ScreenCoords {
    let CoordsXYZ { x, y, z } = coords;
    match rotation {
        Rotation::R0 => ScreenCoords {
            x: y - x,
            y: ((y + x) >> 1) - z,
        },
        Rotation::R1 => ScreenCoords {
            x: -y - x,
            y: ((y - x) >> 1) - z,
        },
        Rotation::R2 => ScreenCoords {
            x: -y + x,
            y: ((-y - x) >> 1) - z,
        },
        Rotation::R3 => ScreenCoords {
            x: y + x,
            y: ((-y + x) >> 1) - z,
        },
    }
}

/// Invert the projection: map a view-space point back to world XY, assuming
/// the world surface sits at height `z`.
pub const fn view_to_map(view: ScreenCoords, z: i32, rotation: Rotation) -> CoordsXY {
    let ScreenCoords { x, y } = view;
    match rotation {
        Rotation::R0 => CoordsXY {
            x: -x / 2 + y + z,
            y: x / 2 + y + z,
        },
        Rotation::R1 => CoordsXY {
            x: -x / 2 - y - z,
            y: -x / 2 + y + z,
        },
        Rotation::R2 => CoordsXY {
            x: x / 2 - y - z,
            y: -x / 2 - y - z,
        },
        Rotation::R3 => CoordsXY {
            x: x / 2 + y + z,
            y: x / 2 - y - z,
        },
    }
}

/// Project a world position and offset it so the point lands at the center
/// of a view of the given extents. This is the view origin a viewport uses
/// to look straight at `coords`.
pub const fn center_coordinates(
    coords: CoordsXYZ,
    rotation: Rotation,
    view_width: i32,
    view_height: i32,
) -> ScreenCoords {
    let projected = project(coords, rotation);
    ScreenCoords {
        x: projected.x - view_width / 2,
        y: projected.y - view_height / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Literal fixtures for each rotation branch. x=100, y=200, z=0.
    #[test]
    fn project_rotation_fixtures() {
        let c = CoordsXYZ::new(100, 200, 0);
        assert_eq!(project(c, Rotation::R0), ScreenCoords::new(100, 150));
        assert_eq!(project(c, Rotation::R1), ScreenCoords::new(-300, 50));
        assert_eq!(project(c, Rotation::R2), ScreenCoords::new(-100, -150));
        assert_eq!(project(c, Rotation::R3), ScreenCoords::new(300, -50));
    }

    #[test]
    fn project_folds_z_vertically() {
        let flat = project(CoordsXYZ::new(64, 64, 0), Rotation::R0);
        let high = project(CoordsXYZ::new(64, 64, 48), Rotation::R0);
        assert_eq!(high.x, flat.x);
        assert_eq!(high.y, flat.y - 48);
    }

    // The asymmetry between rotation 0 and rotation 2: for odd sums the
    // arithmetic shift rounds toward negative infinity, so the two are not
    // mirror images of each other.
    #[test]
    fn project_arithmetic_shift_asymmetry() {
        let c = CoordsXYZ::new(1, 2, 0);
        assert_eq!(project(c, Rotation::R0).y, 1); // (2+1)>>1 == 1
        assert_eq!(project(c, Rotation::R2).y, -2); // (-2-1)>>1 == -2, not -1
    }

    #[test]
    fn rotated_quarter_turns_compose() {
        let c = CoordsXY::new(5, 9);
        assert_eq!(c.rotated(1), CoordsXY::new(9, -5));
        assert_eq!(c.rotated(2), CoordsXY::new(-5, -9));
        assert_eq!(c.rotated(3), CoordsXY::new(-9, 5));
        assert_eq!(c.rotated(1).rotated(3), c);
    }

    #[test]
    fn view_to_map_inverts_projection_on_even_grid() {
        // Tile-aligned points survive the /2 round trip at any rotation.
        for rotation in Rotation::ALL {
            let world = CoordsXY::new(320, 128);
            let view = project(world.with_z(0), rotation);
            assert_eq!(view_to_map(view, 0, rotation), world);
        }
    }

    #[test]
    fn center_coordinates_subtracts_half_view() {
        let view = center_coordinates(CoordsXYZ::new(100, 200, 0), Rotation::R0, 640, 480);
        assert_eq!(view, ScreenCoords::new(100 - 320, 150 - 240));
    }

    #[test]
    fn from_u8_masks() {
        assert_eq!(Rotation::from_u8(5), Rotation::R1);
        assert_eq!(Rotation::from_u8(255), Rotation::R3);
    }

    proptest! {
        // Projection is a pure function: identical inputs, identical outputs.
        #[test]
        fn project_is_deterministic(x in -10_000i32..10_000, y in -10_000i32..10_000,
                                    z in -256i32..256, r in 0u8..4) {
            let c = CoordsXYZ::new(x, y, z);
            let rotation = Rotation::from_u8(r);
            prop_assert_eq!(project(c, rotation), project(c, rotation));
        }

        // All four rotations agree on the z contribution.
        #[test]
        fn project_z_is_rotation_independent(x in -10_000i32..10_000, y in -10_000i32..10_000,
                                             z in 0i32..256, r in 0u8..4) {
            let rotation = Rotation::from_u8(r);
            let flat = project(CoordsXYZ::new(x, y, 0), rotation);
            let high = project(CoordsXYZ::new(x, y, z), rotation);
            prop_assert_eq!(high.x, flat.x);
            prop_assert_eq!(high.y, flat.y - z);
        }
    }
}
