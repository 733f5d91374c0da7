//! Render entry point: from screen-space damage to column paint calls.

use parkscape_paint::backend::{Dpi, PaintBackend, SpriteAtlas};
use parkscape_paint::column::viewport_paint;
use parkscape_paint::dispatch::PaintContext;
use parkscape_types::geometry::ScreenRect;
use parkscape_types::{FrameState, Result, Viewport};

/// Maximum rows painted per call, in view pixels. Taller damage is fed to
/// the column renderer in slices.
const MAX_ROWS_PER_PAINT: i32 = 384;

/// Paint the part of `damage` (screen space) that overlaps `viewport`.
#[allow(clippy::too_many_arguments)]
pub fn viewport_render(
    viewport: &Viewport,
    target: &Dpi,
    damage: ScreenRect,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
    backend: &mut dyn PaintBackend,
) -> Result<()> {
    if !damage.intersects(&viewport.screen_rect()) {
        return Ok(());
    }
    let left = (damage.x - viewport.x).max(0);
    let right = (damage.right() - viewport.x).min(viewport.width);
    let top = (damage.y - viewport.y).max(0);
    let bottom = (damage.bottom() - viewport.y).min(viewport.height);

    let zoom = viewport.zoom;
    let left = zoom.scale_up(left) + viewport.view_x;
    let right = zoom.scale_up(right) + viewport.view_x;
    let top = zoom.scale_up(top) + viewport.view_y;
    let bottom = zoom.scale_up(bottom) + viewport.view_y;

    for (slice_top, slice_bottom) in split_rows(top, bottom) {
        viewport_paint(
            viewport,
            target,
            left,
            slice_top,
            right,
            slice_bottom,
            frame,
            ctx,
            atlas,
            backend,
        )?;
    }
    Ok(())
}

/// Convert a view-space rectangle (e.g. around a changed tile's projected
/// sprites) into the screen rectangle of `viewport` needing a repaint.
/// Returns nothing when the rectangle lies outside the view.
pub fn invalidate_view_rect(
    viewport: &Viewport,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> Option<ScreenRect> {
    let left = left.max(viewport.view_x);
    let right = right.min(viewport.view_x + viewport.view_width);
    let top = top.max(viewport.view_y);
    let bottom = bottom.min(viewport.view_y + viewport.view_height);
    if left >= right || top >= bottom {
        return None;
    }
    let zoom = viewport.zoom;
    let x = viewport.x + zoom.scale_down(left - viewport.view_x);
    let y = viewport.y + zoom.scale_down(top - viewport.view_y);
    Some(ScreenRect::new(
        x,
        y,
        zoom.scale_down(right - left),
        zoom.scale_down(bottom - top),
    ))
}

/// Cut `top..bottom` into contiguous slices of at most
/// [`MAX_ROWS_PER_PAINT`] rows.
fn split_rows(top: i32, bottom: i32) -> impl Iterator<Item = (i32, i32)> {
    let mut slice_top = top;
    std::iter::from_fn(move || {
        if slice_top >= bottom {
            return None;
        }
        let slice_bottom = (slice_top + MAX_ROWS_PER_PAINT).min(bottom);
        let slice = (slice_top, slice_bottom);
        slice_top = slice_bottom;
        Some(slice)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkscape_paint::backend::UniformAtlas;
    use parkscape_paint::track::TrackPainterRegistry;
    use parkscape_types::config::RenderConfig;
    use parkscape_types::image::ImageId;
    use parkscape_types::viewport::ZoomLevel;
    use parkscape_world::{EntityList, WorldMap};

    #[test]
    fn rows_split_at_the_slice_limit() {
        let slices: Vec<_> = split_rows(0, 500).collect();
        assert_eq!(slices, vec![(0, 384), (384, 500)]);

        let slices: Vec<_> = split_rows(-100, 100).collect();
        assert_eq!(slices, vec![(-100, 100)]);

        let slices: Vec<_> = split_rows(0, 384 * 2).collect();
        assert_eq!(slices, vec![(0, 384), (384, 768)]);
    }

    /// Backend counting sprites, for end-to-end coverage checks.
    struct CountingBackend {
        sprites: usize,
    }

    impl PaintBackend for CountingBackend {
        fn draw_sprite(&mut self, _dpi: &Dpi, _image: ImageId, _x: i32, _y: i32) -> Result<()> {
            self.sprites += 1;
            Ok(())
        }
        fn clear(&mut self, _dpi: &Dpi, _colour: u8) -> Result<()> {
            Ok(())
        }
        fn filter_rect(&mut self, _dpi: &Dpi, _rect: ScreenRect, _palette: u8) -> Result<()> {
            Ok(())
        }
        fn draw_text(&mut self, _dpi: &Dpi, _text: &str, _x: i32, _y: i32) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn invalidate_clips_and_scales_to_screen() {
        let mut viewport = Viewport::new(ScreenRect::new(10, 20, 320, 240), ZoomLevel::new(1));
        viewport.view_x = -64;
        viewport.view_y = 100;

        // Fully outside the view.
        assert_eq!(invalidate_view_rect(&viewport, -500, 0, -400, 50), None);

        // Partially overlapping: clipped to the view, halved by zoom.
        let rect = invalidate_view_rect(&viewport, -128, 80, 0, 180).unwrap();
        assert_eq!(rect, ScreenRect::new(10, 20, 32, 40));
    }

    #[test]
    fn disjoint_damage_paints_nothing() {
        let map = WorldMap::new_flat(8, 2);
        let entities = EntityList::new();
        let registry = TrackPainterRegistry::with_standard_painters();
        let config = RenderConfig::default();
        let ctx = PaintContext {
            map: &map,
            entities: &entities,
            registry: &registry,
            config: &config,
        };
        let viewport = Viewport::new(ScreenRect::new(0, 0, 64, 512), ZoomLevel::MIN);
        let target = Dpi {
            x: 0,
            y: 0,
            width: 64,
            height: 512,
            pitch: 0,
            zoom: ZoomLevel::MIN,
            bits_offset: 0,
        };

        let mut backend = CountingBackend { sprites: 0 };
        viewport_render(
            &viewport,
            &target,
            ScreenRect::new(200, 0, 64, 64),
            FrameState::default(),
            &ctx,
            &UniformAtlas::tile(),
            &mut backend,
        )
        .unwrap();
        assert_eq!(backend.sprites, 0);
    }

    #[test]
    fn overlapping_damage_reaches_the_column_renderer() {
        let map = WorldMap::new_flat(8, 2);
        let entities = EntityList::new();
        let registry = TrackPainterRegistry::with_standard_painters();
        let config = RenderConfig::default();
        let ctx = PaintContext {
            map: &map,
            entities: &entities,
            registry: &registry,
            config: &config,
        };
        let mut viewport = Viewport::new(ScreenRect::new(0, 0, 64, 512), ZoomLevel::MIN);
        viewport.view_x = -32;
        viewport.view_y = -256;
        let target = Dpi {
            x: 0,
            y: 0,
            width: 64,
            height: 512,
            pitch: 0,
            zoom: ZoomLevel::MIN,
            bits_offset: 0,
        };

        let mut backend = CountingBackend { sprites: 0 };
        // Damage taller than one slice: the render is split but seamless.
        viewport_render(
            &viewport,
            &target,
            ScreenRect::new(0, 0, 64, 500),
            FrameState::default(),
            &ctx,
            &UniformAtlas::tile(),
            &mut backend,
        )
        .unwrap();
        assert!(backend.sprites > 0);
    }
}
