//! Cursor hit-testing: from a screen point back to world coordinates.
//!
//! The forward projection flattens height, so the inverse is iterative:
//! assume a height, unproject, sample the surface there, and feed the
//! sampled height back in. Both the walking-surface snap and the tile
//! refinement below converge in a handful of fixed iterations.
//!
//! Picking what is *under* the cursor reuses the paint pipeline: a 1x1-pixel
//! paint session is generated at the cursor's view position and the arranged
//! composite is walked front-to-back with an interaction mask.

use parkscape_paint::backend::{Dpi, SpriteAtlas};
use parkscape_paint::dispatch::{PaintContext, generate};
use parkscape_paint::session::{PaintSession, PaintTarget};
use parkscape_types::geometry::{CoordsXY, ScreenCoords, TILE_SIZE};
use parkscape_types::interaction::{InteractionItem, InteractionMask};
use parkscape_types::rotation::view_to_map;
use parkscape_types::{FrameState, Rotation};
use parkscape_world::WorldMap;

use crate::manager::{ViewportId, ViewportManager};

/// Result of a pick pass. `item == None` with a viewport is a valid
/// outcome: the cursor is over the viewport but over nothing pickable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionInfo {
    pub item: InteractionItem,
    pub map_pos: CoordsXY,
    pub target: PaintTarget,
    pub viewport: Option<ViewportId>,
}

/// Iteratively unproject a view point onto the walking surface.
///
/// Returns the world position and the surface height there. When the
/// estimate overshoots past the far map corner on both axes, it is pulled
/// back toward the map by the sampled height before the next round.
pub fn snap_to_surface(map: &WorldMap, view: ScreenCoords, rotation: Rotation) -> (CoordsXY, i32) {
    const X_CORR: [i32; 4] = [-1, 1, 1, -1];
    const Y_CORR: [i32; 4] = [-1, -1, 1, 1];

    let mut height = 0;
    let mut pos = CoordsXY::default();
    for _ in 0..6 {
        pos = view_to_map(view, height, rotation);
        height = map.surface_height(pos);
        let maximum = map.maximum_x_y();
        if pos.x > maximum && pos.y > maximum {
            let r = rotation.as_u8() as usize;
            pos.x += X_CORR[r] * height;
            pos.y += Y_CORR[r] * height;
        }
    }
    (pos, height)
}

/// Run a pick pass under a screen point.
pub fn get_map_coordinates_from_pos(
    manager: &ViewportManager,
    screen: ScreenCoords,
    mask: InteractionMask,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
) -> InteractionInfo {
    let Some(id) = manager.find_from_point(screen) else {
        return InteractionInfo::default();
    };
    let viewport = manager.get(id);
    let view = viewport.screen_to_view(screen);
    let bitmask = viewport.zoom.alignment_mask();
    let dpi = Dpi {
        x: view.x & bitmask,
        y: view.y & bitmask,
        width: 1,
        height: 1,
        pitch: 0,
        zoom: viewport.zoom,
        bits_offset: 0,
    };

    let mut session = PaintSession::new(dpi, atlas, frame, viewport.flags);
    generate(&mut session, ctx);
    session.arrange();
    let picked = session.pick(mask);
    InteractionInfo {
        item: picked.item,
        map_pos: picked.map_pos,
        target: picked.target,
        viewport: Some(id),
    }
}

/// World position of the terrain under a screen point, refined to sub-tile
/// precision, along with the viewport that was hit.
pub fn screen_get_map_xy(
    manager: &ViewportManager,
    screen: ScreenCoords,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
) -> Option<(CoordsXY, ViewportId)> {
    let info = get_map_coordinates_from_pos(
        manager,
        screen,
        InteractionMask::allowing(&[InteractionItem::Terrain]),
        frame,
        ctx,
        atlas,
    );
    if info.item == InteractionItem::None {
        return None;
    }
    let id = info.viewport?;
    let start_view = manager.get(id).screen_to_view(screen);
    let tile = info.map_pos;

    // Start in the middle of the picked tile and let the height feedback
    // walk the point across it, never leaving the tile.
    let mut pos = CoordsXY::new(tile.x + 16, tile.y + 16);
    for _ in 0..5 {
        let z = ctx.map.surface_height(pos);
        pos = view_to_map(start_view, z, frame.rotation);
        pos.x = pos.x.clamp(tile.x, tile.x + TILE_SIZE - 1);
        pos.y = pos.y.clamp(tile.y, tile.y + TILE_SIZE - 1);
    }
    Some((pos, id))
}

/// World position under a screen point assuming a known height `z`, without
/// consulting the terrain.
pub fn screen_get_map_xy_with_z(
    manager: &ViewportManager,
    screen: ScreenCoords,
    z: i32,
    rotation: Rotation,
    map: &WorldMap,
) -> Option<CoordsXY> {
    let id = manager.find_from_point(screen)?;
    let view = manager.get(id).screen_to_view(screen);
    let pos = view_to_map(ScreenCoords::new(view.x, view.y + z), 0, rotation);
    map.in_bounds(pos).then_some(pos)
}

/// Tile corner quadrant of a world position (0..3).
pub fn tile_quadrant(pos: CoordsXY) -> u8 {
    let sub_x = pos.x & (TILE_SIZE - 1);
    let sub_y = pos.y & (TILE_SIZE - 1);
    if sub_x > 16 {
        if sub_y < 16 { 1 } else { 0 }
    } else if sub_y < 16 {
        2
    } else {
        3
    }
}

/// Tile edge a world position is nearest to (0..3).
pub fn tile_side(pos: CoordsXY) -> u8 {
    let sub_x = pos.x & (TILE_SIZE - 1);
    let sub_y = pos.y & (TILE_SIZE - 1);
    if sub_x < sub_y {
        if sub_x + sub_y < TILE_SIZE { 0 } else { 1 }
    } else if sub_x + sub_y < TILE_SIZE {
        3
    } else {
        2
    }
}

/// Terrain hit plus the tile corner quadrant under the cursor.
pub fn screen_get_map_xy_quadrant(
    manager: &ViewportManager,
    screen: ScreenCoords,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
) -> Option<(CoordsXY, u8)> {
    let (pos, _) = screen_get_map_xy(manager, screen, frame, ctx, atlas)?;
    Some((pos.tile_floor(), tile_quadrant(pos)))
}

/// Terrain hit plus the nearest tile edge.
pub fn screen_get_map_xy_side(
    manager: &ViewportManager,
    screen: ScreenCoords,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
) -> Option<(CoordsXY, u8)> {
    let (pos, _) = screen_get_map_xy(manager, screen, frame, ctx, atlas)?;
    Some((pos.tile_floor(), tile_side(pos)))
}

/// Fixed-height variant of [`screen_get_map_xy_quadrant`].
pub fn screen_get_map_xy_quadrant_with_z(
    manager: &ViewportManager,
    screen: ScreenCoords,
    z: i32,
    rotation: Rotation,
    map: &WorldMap,
) -> Option<(CoordsXY, u8)> {
    let pos = screen_get_map_xy_with_z(manager, screen, z, rotation, map)?;
    Some((pos.tile_floor(), tile_quadrant(pos)))
}

/// Fixed-height variant of [`screen_get_map_xy_side`].
pub fn screen_get_map_xy_side_with_z(
    manager: &ViewportManager,
    screen: ScreenCoords,
    z: i32,
    rotation: Rotation,
    map: &WorldMap,
) -> Option<(CoordsXY, u8)> {
    let pos = screen_get_map_xy_with_z(manager, screen, z, rotation, map)?;
    Some((pos.tile_floor(), tile_side(pos)))
}

/// Tile under the cursor plus a placement direction: 4 in the middle of the
/// tile, otherwise a 2-bit corner code.
pub fn screen_pos_to_map_pos(
    manager: &ViewportManager,
    screen: ScreenCoords,
    frame: FrameState,
    ctx: &PaintContext<'_>,
    atlas: &dyn SpriteAtlas,
) -> Option<(CoordsXY, u8)> {
    let (pos, _) = screen_get_map_xy(manager, screen, frame, ctx, atlas)?;

    let centre_x = (pos.x % TILE_SIZE).abs();
    let centre_y = (pos.y % TILE_SIZE).abs();
    let direction = if centre_x > 8 && centre_x < 24 && centre_y > 8 && centre_y < 24 {
        4
    } else {
        let mod_x = pos.x & (TILE_SIZE - 1);
        let mod_y = pos.y & (TILE_SIZE - 1);
        if mod_x <= 16 {
            if mod_y < 16 { 2 } else { 3 }
        } else if mod_y < 16 {
            1
        } else {
            0
        }
    };
    Some((pos.tile_floor(), direction))
}
