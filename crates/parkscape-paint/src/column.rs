//! Column compositing: slice a viewport's dirty region into 32-pixel
//! columns and paint each through its own session.
//!
//! Splitting works on the dpi alone. A column narrows `width` and widens
//! `pitch` by the same (zoom-scaled) amount, so the row stride
//! `width + pitch` of the destination buffer never changes; the first and
//! last columns absorb the unaligned edges of the region.

use parkscape_types::geometry::floor2;
use parkscape_types::viewport::{Viewport, ViewportFlags};
use parkscape_types::{FrameState, Result};

use crate::backend::{
    Dpi, PaintBackend, SpriteAtlas, VOID_COLOUR, VOID_COLOUR_INVISIBLE, WEATHER_GLOOM_PALETTES,
};
use crate::dispatch::{PaintContext, generate};
use crate::session::PaintSession;

/// Paint the view-space region `left..right` x `top..bottom` of `viewport`
/// into `target`, one 32-pixel column at a time.
///
/// The region is expected to be clamped to the viewport's view rectangle;
/// coordinates are aligned down to whole screen pixels for the viewport's
/// zoom before any window math.
#[allow(clippy::too_many_arguments)]
pub fn viewport_paint(
    viewport: &Viewport,
    target: &Dpi,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
    backend: &mut dyn PaintBackend,
) -> Result<()> {
    let zoom = viewport.zoom;
    let bitmask = zoom.alignment_mask();

    let width = (right - left) & bitmask;
    let height = (bottom - top) & bitmask;
    let left = left & bitmask;
    let top = top & bitmask;

    // Where the region lands on the target, in the target's screen space.
    let screen_x = zoom.scale_down(left - (viewport.view_x & bitmask)) + viewport.x;
    let screen_y = zoom.scale_down(top - (viewport.view_y & bitmask)) + viewport.y;

    let stride = target.width + target.pitch;
    let region = Dpi {
        x: left,
        y: top,
        width,
        height,
        pitch: stride - zoom.scale_down(width),
        zoom,
        bits_offset: target.bits_offset + (screen_x - target.x) + (screen_y - target.y) * stride,
    };

    let columns = split_into_columns(&region);
    log::trace!(
        "painting {} column(s) of view region {}x{} at ({left}, {top})",
        columns.len(),
        width,
        height
    );
    for column in columns {
        paint_column(column, viewport.flags, frame, ctx, atlas, backend)?;
    }
    Ok(())
}

/// Slice a region dpi into 32-view-pixel columns, adjusting width, pitch and
/// bits offset so each column addresses the same destination rows.
fn split_into_columns(region: &Dpi) -> Vec<Dpi> {
    let zoom = region.zoom;
    let right = region.right();
    let mut columns = Vec::new();
    let mut x = floor2(region.x, 32);
    while x < right {
        let mut column = *region;
        if x >= column.x {
            let left_pitch = x - column.x;
            column.width -= left_pitch;
            column.bits_offset += zoom.scale_down(left_pitch);
            column.pitch += zoom.scale_down(left_pitch);
            column.x = x;
        }
        let mut column_right = column.x + column.width;
        if column_right >= x + 32 {
            let right_pitch = column_right - x - 32;
            column_right -= right_pitch;
            column.pitch += zoom.scale_down(right_pitch);
        }
        column.width = column_right - column.x;
        columns.push(column);
        x += 32;
    }
    columns
}

/// Paint one column: optional void clear, generate/arrange/draw, the weather
/// gloom filter, then floating text on top.
pub fn paint_column(
    dpi: Dpi,
    flags: ViewportFlags,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
    backend: &mut dyn PaintBackend,
) -> Result<()> {
    if flags.intersects(
        ViewportFlags::UNDERGROUND_INSIDE | ViewportFlags::HIDE_BASE | ViewportFlags::HIDE_VERTICAL,
    ) {
        let colour = if flags.contains(ViewportFlags::INVISIBLE_SPRITES) {
            VOID_COLOUR_INVISIBLE
        } else {
            VOID_COLOUR
        };
        backend.clear(&dpi, colour)?;
    }

    let mut session = PaintSession::new(dpi, atlas, frame, flags);
    generate(&mut session, ctx);
    session.arrange();
    session.draw(backend)?;

    if !flags.contains(ViewportFlags::INVISIBLE_SPRITES) {
        if let Some(palette) = WEATHER_GLOOM_PALETTES[frame.gloom as usize] {
            backend.filter_rect(&dpi, dpi.rect(), palette)?;
        }
    }

    session.draw_floating_text(backend)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::UniformAtlas;
    use crate::test_utils::{DrawCall, RecordingBackend};
    use crate::track::TrackPainterRegistry;
    use parkscape_types::config::RenderConfig;
    use parkscape_types::frame::WeatherGloom;
    use parkscape_types::geometry::ScreenRect;
    use parkscape_types::viewport::ZoomLevel;
    use parkscape_world::{EntityList, WorldMap};

    fn region(x: i32, width: i32, pitch: i32, zoom: u8) -> Dpi {
        Dpi {
            x,
            y: 0,
            width,
            height: 64,
            pitch,
            zoom: ZoomLevel::new(zoom),
            bits_offset: 0,
        }
    }

    #[test]
    fn split_preserves_row_stride() {
        let r = region(10, 50, 14, 0);
        let stride = r.width + r.pitch;
        let columns = split_into_columns(&r);
        assert_eq!(columns.len(), 2);
        for column in &columns {
            assert_eq!(column.width + column.pitch, stride);
        }
        assert_eq!(columns.iter().map(|c| c.width).sum::<i32>(), r.width);
    }

    #[test]
    fn split_clips_first_and_last_columns() {
        let r = region(10, 50, 14, 0);
        let columns = split_into_columns(&r);
        // First column runs from the unaligned left edge to the boundary.
        assert_eq!(columns[0].x, 10);
        assert_eq!(columns[0].width, 22);
        assert_eq!(columns[0].bits_offset, 0);
        // Second column starts aligned and absorbs the left clip in its
        // pitch and bits offset.
        assert_eq!(columns[1].x, 32);
        assert_eq!(columns[1].width, 28);
        assert_eq!(columns[1].bits_offset, 22);
        assert_eq!(columns[1].pitch, 14 + 22);
    }

    #[test]
    fn split_scales_offsets_by_zoom() {
        let r = region(0, 64, 0, 1);
        let columns = split_into_columns(&r);
        assert_eq!(columns.len(), 2);
        // 32 view pixels are 16 destination pixels at zoom 1.
        assert_eq!(columns[1].bits_offset, 16);
        assert_eq!(columns[1].pitch, 16);
    }

    fn flat_ctx<'a>(
        map: &'a WorldMap,
        entities: &'a EntityList,
        registry: &'a TrackPainterRegistry,
        config: &'a RenderConfig,
    ) -> PaintContext<'a> {
        PaintContext {
            map,
            entities,
            registry,
            config,
        }
    }

    fn column_dpi() -> Dpi {
        Dpi {
            x: 0,
            y: -256,
            width: 32,
            height: 512,
            pitch: 0,
            zoom: ZoomLevel::MIN,
            bits_offset: 0,
        }
    }

    #[test]
    fn hidden_base_clears_void_first() {
        let map = WorldMap::new_flat(8, 2);
        let entities = EntityList::new();
        let registry = TrackPainterRegistry::with_standard_painters();
        let config = RenderConfig::default();
        let ctx = flat_ctx(&map, &entities, &registry, &config);
        let atlas = UniformAtlas::tile();

        let mut backend = RecordingBackend::new();
        paint_column(
            column_dpi(),
            ViewportFlags::HIDE_BASE,
            FrameState::default(),
            &ctx,
            &atlas,
            &mut backend,
        )
        .unwrap();
        assert_eq!(backend.calls[0], DrawCall::Clear { colour: VOID_COLOUR });

        let mut backend = RecordingBackend::new();
        paint_column(
            column_dpi(),
            ViewportFlags::HIDE_BASE | ViewportFlags::INVISIBLE_SPRITES,
            FrameState::default(),
            &ctx,
            &atlas,
            &mut backend,
        )
        .unwrap();
        assert_eq!(
            backend.calls[0],
            DrawCall::Clear {
                colour: VOID_COLOUR_INVISIBLE
            }
        );
    }

    #[test]
    fn gloom_filters_after_sprites() {
        let map = WorldMap::new_flat(8, 2);
        let entities = EntityList::new();
        let registry = TrackPainterRegistry::with_standard_painters();
        let config = RenderConfig::default();
        let ctx = flat_ctx(&map, &entities, &registry, &config);
        let atlas = UniformAtlas::tile();

        let mut backend = RecordingBackend::new();
        paint_column(
            column_dpi(),
            ViewportFlags::empty(),
            FrameState::default().with_gloom(WeatherGloom::Dimmed),
            &ctx,
            &atlas,
            &mut backend,
        )
        .unwrap();

        let filter_at = backend
            .calls
            .iter()
            .position(|c| matches!(c, DrawCall::FilterRect { palette: 49, .. }))
            .expect("gloom filter missing");
        let last_sprite = backend
            .calls
            .iter()
            .rposition(|c| matches!(c, DrawCall::Sprite { .. }))
            .expect("no sprites painted");
        assert!(filter_at > last_sprite);

        // Hiding sprites also suppresses the gloom pass.
        let mut backend = RecordingBackend::new();
        paint_column(
            column_dpi(),
            ViewportFlags::INVISIBLE_SPRITES,
            FrameState::default().with_gloom(WeatherGloom::Dimmed),
            &ctx,
            &atlas,
            &mut backend,
        )
        .unwrap();
        assert!(
            !backend
                .calls
                .iter()
                .any(|c| matches!(c, DrawCall::FilterRect { .. }))
        );
    }

    #[test]
    fn viewport_paint_covers_the_region_in_columns() {
        let map = WorldMap::new_flat(8, 2);
        let entities = EntityList::new();
        let registry = TrackPainterRegistry::with_standard_painters();
        let config = RenderConfig::default();
        let ctx = flat_ctx(&map, &entities, &registry, &config);
        let atlas = UniformAtlas::tile();

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
        let mut backend = RecordingBackend::new();
        viewport_paint(
            &viewport,
            &target,
            -32,
            -256,
            32,
            256,
            FrameState::default(),
            &ctx,
            &atlas,
            &mut backend,
        )
        .unwrap();
        assert!(backend.sprite_count() > 0);
    }
}
