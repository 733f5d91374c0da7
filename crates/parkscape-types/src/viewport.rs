//! The viewport data type: a screen rectangle bound to a world-projected view.
//!
//! A viewport maps a rectangle of the screen onto a rectangle of projected
//! view space. The view rectangle is always the screen rectangle left-shifted
//! by the zoom level; `Viewport` maintains that invariant through every
//! mutation, and pan/scroll never changes zoom.

use bitflags::bitflags;

use crate::geometry::{ScreenCoords, ScreenRect};

/// Discrete zoom. Level 0 is the finest (one view pixel per screen pixel);
/// each level doubles the world area covered per screen pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ZoomLevel(u8);

/// Highest supported zoom level.
pub const MAX_ZOOM: u8 = 3;

impl ZoomLevel {
    pub const MIN: Self = Self(0);

    pub fn new(level: u8) -> Self {
        Self(level.min(MAX_ZOOM))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Screen-to-view scale: `value << zoom`.
    pub const fn scale_up(self, value: i32) -> i32 {
        value << self.0
    }

    /// View-to-screen scale: arithmetic shift down.
    pub const fn scale_down(self, value: i32) -> i32 {
        value >> self.0
    }

    /// Bitmask that aligns view coordinates down to whole screen pixels.
    /// Sign-extended so negative view coordinates align correctly.
    pub const fn alignment_mask(self) -> i32 {
        !((1 << self.0) - 1)
    }
}

bitflags! {
    /// Per-viewport render option flags.
    ///
    /// The bit layout is preserved from the original save-compatible
    /// encoding; toggle them only through the named constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewportFlags: u32 {
        const UNDERGROUND_INSIDE   = 1 << 0;
        const SEETHROUGH_RIDES     = 1 << 1;
        const SEETHROUGH_SCENERY   = 1 << 2;
        const INVISIBLE_SUPPORTS   = 1 << 3;
        const LAND_HEIGHTS         = 1 << 4;
        const TRACK_HEIGHTS        = 1 << 5;
        const PATH_HEIGHTS         = 1 << 6;
        const GRIDLINES            = 1 << 7;
        const LAND_OWNERSHIP       = 1 << 8;
        const CONSTRUCTION_RIGHTS  = 1 << 9;
        const SOUND_ON             = 1 << 10;
        const INVISIBLE_PEEPS      = 1 << 11;
        const HIDE_BASE            = 1 << 12;
        const HIDE_VERTICAL        = 1 << 13;
        const INVISIBLE_SPRITES    = 1 << 14;
        const SEETHROUGH_PATHS     = 1 << 16;
    }
}

/// A screen rectangle looking into projected view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Screen-space position and size. `width == 0` marks a free slot.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// View-space origin (projected world coordinates of the top-left).
    pub view_x: i32,
    pub view_y: i32,
    /// View-space size; always the screen size shifted by `zoom`.
    pub view_width: i32,
    pub view_height: i32,
    pub zoom: ZoomLevel,
    pub flags: ViewportFlags,
}

impl Viewport {
    pub fn new(rect: ScreenRect, zoom: ZoomLevel) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            view_x: 0,
            view_y: 0,
            view_width: zoom.scale_up(rect.width),
            view_height: zoom.scale_up(rect.height),
            zoom,
            flags: ViewportFlags::empty(),
        }
    }

    pub const fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(self.x, self.y, self.width, self.height)
    }

    pub const fn is_active(&self) -> bool {
        self.width != 0
    }

    /// Convert a screen point inside this viewport to view space.
    pub const fn screen_to_view(&self, screen: ScreenCoords) -> ScreenCoords {
        ScreenCoords {
            x: self.zoom.scale_up(screen.x - self.x) + self.view_x,
            y: self.zoom.scale_up(screen.y - self.y) + self.view_y,
        }
    }

    pub fn contains_screen_point(&self, screen: ScreenCoords) -> bool {
        self.screen_rect().contains(screen)
    }

    /// Center the view on a view-space point (e.g. a projected focus).
    pub fn view_center(&self) -> ScreenCoords {
        ScreenCoords {
            x: self.view_x + self.view_width / 2,
            y: self.view_y + self.view_height / 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zoom_clamps_to_max() {
        assert_eq!(ZoomLevel::new(7).get(), MAX_ZOOM);
        assert_eq!(ZoomLevel::new(2).get(), 2);
    }

    #[test]
    fn new_establishes_view_size_invariant() {
        for level in 0..=MAX_ZOOM {
            let zoom = ZoomLevel::new(level);
            let vp = Viewport::new(ScreenRect::new(10, 20, 640, 480), zoom);
            assert_eq!(vp.view_width, 640 << level);
            assert_eq!(vp.view_height, 480 << level);
        }
    }

    #[test]
    fn screen_to_view_scales_and_offsets() {
        let mut vp = Viewport::new(ScreenRect::new(100, 50, 320, 240), ZoomLevel::new(1));
        vp.view_x = 1000;
        vp.view_y = 2000;
        let v = vp.screen_to_view(ScreenCoords::new(110, 60));
        assert_eq!(v, ScreenCoords::new(1000 + 20, 2000 + 20));
    }

    #[test]
    fn alignment_mask_aligns_both_signs() {
        assert_eq!(33 & ZoomLevel::new(0).alignment_mask(), 33);
        assert_eq!(33 & ZoomLevel::new(1).alignment_mask(), 32);
        assert_eq!(33 & ZoomLevel::new(3).alignment_mask(), 32);
        assert_eq!(-33 & ZoomLevel::new(3).alignment_mask(), -40);
    }

    proptest! {
        #[test]
        fn view_size_invariant_for_any_geometry(w in 1i32..2000, h in 1i32..2000,
                                                level in 0u8..=MAX_ZOOM) {
            let zoom = ZoomLevel::new(level);
            let vp = Viewport::new(ScreenRect::new(0, 0, w, h), zoom);
            prop_assert_eq!(vp.view_width, zoom.scale_up(w));
            prop_assert_eq!(vp.view_height, zoom.scale_up(h));
        }
    }
}
