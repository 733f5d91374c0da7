//! Draw target descriptor and the backend trait the compositor draws through.
//!
//! A [`Dpi`] describes a window onto the destination pixel buffer the way the
//! original descriptor did: a view-space origin, extents, and a trailing
//! per-row pitch. The stride of a row is always `width + pitch`; column
//! splitting works by shrinking `width` and growing `pitch` so the stride
//! stays constant.

use parkscape_types::Result;
use parkscape_types::geometry::ScreenRect;
use parkscape_types::image::ImageId;
use parkscape_types::viewport::ZoomLevel;

/// Colour used when a column is cleared before a cut-away or underground
/// paint (a dark void grey).
pub const VOID_COLOUR: u8 = 10;

/// Void colour when sprites are hidden (pure black).
pub const VOID_COLOUR_INVISIBLE: u8 = 0;

/// Translucency palette per weather gloom level; `None` means no overlay.
pub const WEATHER_GLOOM_PALETTES: [Option<u8>; 4] = [None, Some(49), Some(50), Some(47)];

/// A rectangular window onto a destination pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dpi {
    /// View-space origin of this window.
    pub x: i32,
    pub y: i32,
    /// Drawable extents in view pixels.
    pub width: i32,
    pub height: i32,
    /// Extra pixels after each row; row stride is `width + pitch`.
    pub pitch: i32,
    pub zoom: ZoomLevel,
    /// Linear offset of the first drawable pixel in the destination buffer.
    pub bits_offset: i32,
}

impl Dpi {
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn rect(&self) -> ScreenRect {
        ScreenRect::new(self.x, self.y, self.width, self.height)
    }

    /// Collapse the zoom level into the extents, for overlays that draw in
    /// unzoomed units on an already zoom-scaled surface.
    pub fn cropped_by_zoom(&self) -> Dpi {
        let zoom = self.zoom;
        Dpi {
            x: zoom.scale_down(self.x),
            y: zoom.scale_down(self.y),
            width: zoom.scale_down(self.width),
            height: zoom.scale_down(self.height),
            pitch: self.pitch,
            zoom: ZoomLevel::MIN,
            bits_offset: self.bits_offset,
        }
    }
}

/// Metrics of one sprite in the atlas: anchor offset and pixel extents.
///
/// The session needs these to reject primitives that cannot touch the
/// current column and to hit-test sprites under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteExtent {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: i32,
    pub height: i32,
}

impl SpriteExtent {
    pub const fn new(x_offset: i32, y_offset: i32, width: i32, height: i32) -> Self {
        Self {
            x_offset,
            y_offset,
            width,
            height,
        }
    }
}

/// Source of per-sprite metrics, indexed by the low image-id bits.
pub trait SpriteAtlas {
    fn extent(&self, index: u32) -> SpriteExtent;
}

/// An atlas where every sprite shares one extent. Enough for tests and for
/// worlds built from uniformly-sized placeholder art.
#[derive(Debug, Clone, Copy)]
pub struct UniformAtlas {
    pub extent: SpriteExtent,
}

impl UniformAtlas {
    /// One isometric tile diamond: 64 wide, anchored at its center.
    pub const fn tile() -> Self {
        Self {
            extent: SpriteExtent::new(-32, -16, 64, 48),
        }
    }
}

impl Default for UniformAtlas {
    fn default() -> Self {
        Self::tile()
    }
}

impl SpriteAtlas for UniformAtlas {
    fn extent(&self, _index: u32) -> SpriteExtent {
        self.extent
    }
}

/// Rendering backend the paint pipeline draws through.
///
/// All coordinates are in the view space of the [`Dpi`] passed alongside
/// each call; the backend owns the mapping to actual buffer memory.
pub trait PaintBackend {
    /// Blit a sprite with its anchor at the given view position.
    fn draw_sprite(&mut self, dpi: &Dpi, image: ImageId, x: i32, y: i32) -> Result<()>;

    /// Fill the whole dpi window with a solid palette colour.
    fn clear(&mut self, dpi: &Dpi, colour: u8) -> Result<()>;

    /// Apply a translucency palette filter over a view-space rectangle.
    fn filter_rect(&mut self, dpi: &Dpi, rect: ScreenRect, palette: u8) -> Result<()>;

    /// Draw a text label with its origin at the given view position.
    fn draw_text(&mut self, dpi: &Dpi, text: &str, x: i32, y: i32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cropped_by_zoom_scales_extents() {
        let dpi = Dpi {
            x: 64,
            y: 32,
            width: 128,
            height: 96,
            pitch: 4,
            zoom: ZoomLevel::new(2),
            bits_offset: 0,
        };
        let cropped = dpi.cropped_by_zoom();
        assert_eq!(cropped.x, 16);
        assert_eq!(cropped.y, 8);
        assert_eq!(cropped.width, 32);
        assert_eq!(cropped.height, 24);
        assert_eq!(cropped.zoom, ZoomLevel::MIN);
    }

    #[test]
    fn uniform_atlas_is_index_independent() {
        let atlas = UniformAtlas::tile();
        assert_eq!(atlas.extent(0), atlas.extent(0x7FFFF));
    }
}
