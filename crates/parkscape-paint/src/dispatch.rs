//! Tile and entity paint dispatch: the per-column quadrant walk that feeds
//! the paint session.
//!
//! The walk order is rotation-specific and hand-specialized: four zig-zag
//! loops that visit tile and entity quadrants in exactly the sequence the
//! depth arrangement depends on. The start-tile derivation and the step
//! pattern are load-bearing and kept verbatim; do not re-derive them from
//! the projection.

use parkscape_types::config::RenderConfig;
use parkscape_types::geometry::{CoordsXY, CoordsXYZ};
use parkscape_types::image::ImageId;
use parkscape_types::interaction::InteractionItem;
use parkscape_types::rotation::{Rotation, project};
use parkscape_types::viewport::ViewportFlags;
use parkscape_world::{EntityKind, EntityList, TileElement, TileElementKind, WorldMap};

use crate::session::{PaintSession, PaintTarget};
use crate::support::Segments;
use crate::track::{TrackPaintCtx, TrackPainterRegistry};

/// Everything the dispatcher reads while filling a session.
pub struct PaintContext<'a> {
    pub map: &'a WorldMap,
    pub entities: &'a EntityList,
    pub registry: &'a TrackPainterRegistry,
    pub config: &'a RenderConfig,
}

/// Default sprite numbering for world geometry the dispatcher paints
/// itself (surfaces and their overlays).
pub mod sprites {
    /// Flat surface, plus the slope index.
    pub const SURFACE_BASE: u32 = 1000;
    pub const GRIDLINE_OVERLAY: u32 = 1100;
    pub const OWNERSHIP_OVERLAY: u32 = 1101;
    pub const CONSTRUCTION_OVERLAY: u32 = 1102;
    /// Height marker, plus the unit offset and the height step.
    pub const HEIGHT_MARKER_BASE: u32 = 1200;
    pub const WATER_OVERLAY: u32 = 1300;
}

/// Visit every tile and entity quadrant that can touch the session's
/// column, in back-to-front zig-zag order for the current rotation.
pub fn generate(session: &mut PaintSession<'_>, ctx: &PaintContext<'_>) {
    let dpi = *session.dpi();
    let aligned_x = dpi.x & !0x1F;
    let aligned_y = (dpi.y - 16) & !0x1F;
    let half_x = aligned_x >> 1;
    let mut rows = (dpi.height + 2128) >> 5;

    match session.rotation() {
        Rotation::R0 => {
            let mut x = (aligned_y - half_x) & !0x1F;
            let mut y = (aligned_y + half_x) & !0x1F;
            while rows > 0 {
                tile_paint_setup(session, ctx, x, y);
                entity_paint_setup(session, ctx, x, y);

                entity_paint_setup(session, ctx, x - 32, y + 32);

                tile_paint_setup(session, ctx, x, y + 32);
                entity_paint_setup(session, ctx, x, y + 32);

                x += 32;
                entity_paint_setup(session, ctx, x, y);

                y += 32;
                rows -= 1;
            }
        }
        Rotation::R1 => {
            let mut x = (-aligned_y - half_x) & !0x1F;
            let mut y = (aligned_y - half_x - 16) & !0x1F;
            while rows > 0 {
                tile_paint_setup(session, ctx, x, y);
                entity_paint_setup(session, ctx, x, y);

                entity_paint_setup(session, ctx, x - 32, y - 32);

                tile_paint_setup(session, ctx, x - 32, y);
                entity_paint_setup(session, ctx, x - 32, y);

                y += 32;
                entity_paint_setup(session, ctx, x, y);

                x -= 32;
                rows -= 1;
            }
        }
        Rotation::R2 => {
            let mut x = (-aligned_y + half_x) & !0x1F;
            let mut y = (-aligned_y - half_x) & !0x1F;
            while rows > 0 {
                tile_paint_setup(session, ctx, x, y);
                entity_paint_setup(session, ctx, x, y);

                entity_paint_setup(session, ctx, x + 32, y - 32);

                tile_paint_setup(session, ctx, x, y - 32);
                entity_paint_setup(session, ctx, x, y - 32);

                x -= 32;
                entity_paint_setup(session, ctx, x, y);

                y -= 32;
                rows -= 1;
            }
        }
        Rotation::R3 => {
            let mut x = (aligned_y + half_x) & !0x1F;
            let mut y = (-aligned_y + half_x - 16) & !0x1F;
            while rows > 0 {
                tile_paint_setup(session, ctx, x, y);
                entity_paint_setup(session, ctx, x, y);

                entity_paint_setup(session, ctx, x + 32, y + 32);

                tile_paint_setup(session, ctx, x + 32, y);
                entity_paint_setup(session, ctx, x + 32, y);

                y -= 32;
                entity_paint_setup(session, ctx, x, y);

                x += 32;
                rows -= 1;
            }
        }
    }
}

// ---- Tile elements ----

fn tile_paint_setup(session: &mut PaintSession<'_>, ctx: &PaintContext<'_>, x: i32, y: i32) {
    let coords = CoordsXY::new(x, y);
    if !ctx.map.in_bounds(coords) {
        return;
    }
    let chain = ctx.map.elements_at(coords);
    if chain.is_empty() {
        return;
    }

    session.map_position = coords;
    session.sprite_position = coords;
    session.supports.reset_tile();

    // Cull tiles whose whole column is below the window.
    let rotation = session.rotation();
    let max_clearance = chain.iter().map(TileElement::clearance_z).max().unwrap_or(0);
    let anchor_y = project(CoordsXYZ::new(x + 16, y + 16, 0), rotation).y;
    if anchor_y - (max_clearance + 32) >= session.dpi().bottom() {
        return;
    }

    let flags = session.flags();
    for (index, element) in chain.iter().enumerate() {
        session.current_target = PaintTarget::Tile {
            coords,
            element: index,
        };
        let height = element.base_z();
        match &element.kind {
            TileElementKind::Surface {
                slope,
                water_height,
                owned,
                construction_rights,
            } => {
                if !flags.contains(ViewportFlags::HIDE_BASE) {
                    surface_paint(
                        session,
                        ctx.config,
                        *slope,
                        *water_height,
                        *owned,
                        *construction_rights,
                        height,
                    );
                }
            }
            TileElementKind::Path { image } => {
                session.interaction_item = InteractionItem::Footpath;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(0, 0, height),
                    CoordsXYZ::new(32, 32, 0),
                    CoordsXYZ::new(0, 0, height + 2),
                );
            }
            TileElementKind::Track {
                kind,
                sequence,
                ride_index,
            } => {
                session.interaction_item = InteractionItem::Ride;
                let track_ctx = TrackPaintCtx {
                    kind: *kind,
                    direction: (element.direction + rotation.as_u8()) & 3,
                    sequence: *sequence,
                    ride_index: *ride_index,
                    height,
                };
                ctx.registry.painter(*kind).paint(session, &track_ctx);
            }
            TileElementKind::SmallScenery { image } => {
                if flags.contains(ViewportFlags::HIDE_VERTICAL) {
                    continue;
                }
                session.interaction_item = InteractionItem::Scenery;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(16, 16, height),
                    CoordsXYZ::new(14, 14, element.clearance_z() - height - 1),
                    CoordsXYZ::new(9, 9, height),
                );
            }
            TileElementKind::Entrance { image } => {
                if flags.contains(ViewportFlags::HIDE_VERTICAL) {
                    continue;
                }
                session.interaction_item = InteractionItem::ParkEntrance;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(0, 0, height),
                    CoordsXYZ::new(32, 28, 31),
                    CoordsXYZ::new(0, 2, height),
                );
            }
            TileElementKind::Wall { image } => {
                if flags.contains(ViewportFlags::HIDE_VERTICAL) {
                    continue;
                }
                session.interaction_item = InteractionItem::Wall;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(0, 0, height),
                    CoordsXYZ::new(1, 28, element.clearance_z() - height),
                    CoordsXYZ::new(1, 1, height + 1),
                );
            }
            TileElementKind::LargeScenery { image } => {
                if flags.contains(ViewportFlags::HIDE_VERTICAL) {
                    continue;
                }
                session.interaction_item = InteractionItem::LargeScenery;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(0, 0, height),
                    CoordsXYZ::new(26, 26, element.clearance_z() - height - 3),
                    CoordsXYZ::new(3, 3, height),
                );
            }
            TileElementKind::Banner { image } => {
                if flags.contains(ViewportFlags::HIDE_VERTICAL) {
                    continue;
                }
                session.interaction_item = InteractionItem::Banner;
                session.add_primitive_with_bounds(
                    *image,
                    CoordsXYZ::new(16, 16, height),
                    CoordsXYZ::new(1, 1, 21),
                    CoordsXYZ::new(16, 16, height + 2),
                );
            }
        }
    }
    session.current_target = PaintTarget::None;
    session.interaction_item = InteractionItem::None;
}

fn surface_paint(
    session: &mut PaintSession<'_>,
    config: &RenderConfig,
    slope: u8,
    water_height: u8,
    owned: bool,
    construction_rights: bool,
    height: i32,
) {
    let flags = session.flags();
    session.interaction_item = InteractionItem::Terrain;
    session.add_primitive(
        ImageId::new(sprites::SURFACE_BASE + slope as u32),
        CoordsXYZ::new(0, 0, height),
        CoordsXYZ::new(32, 32, -1),
    );

    if flags.contains(ViewportFlags::GRIDLINES) || config.always_show_gridlines {
        session.attach_to_previous_primitive(ImageId::new(sprites::GRIDLINE_OVERLAY), 0, 0);
    }
    if flags.contains(ViewportFlags::LAND_OWNERSHIP) && owned {
        session.attach_to_previous_primitive(ImageId::new(sprites::OWNERSHIP_OVERLAY), 0, 0);
    }
    if flags.contains(ViewportFlags::CONSTRUCTION_RIGHTS) && construction_rights {
        session.attach_to_previous_primitive(ImageId::new(sprites::CONSTRUCTION_OVERLAY), 0, 0);
    }
    if flags.contains(ViewportFlags::LAND_HEIGHTS) {
        let marker =
            sprites::HEIGHT_MARKER_BASE + config.height_marker_offset() + (height / 16) as u32;
        session.attach_to_previous_primitive(ImageId::new(marker), 16, -8);
    }

    if water_height > 0 {
        let water_z = water_height as i32 * 16;
        session.interaction_item = InteractionItem::Water;
        session.add_primitive(
            ImageId::new(sprites::WATER_OVERLAY),
            CoordsXYZ::new(0, 0, water_z),
            CoordsXYZ::new(32, 32, -1),
        );
    }

    session
        .supports
        .set_segment_height(Segments::all(), height as u16, 0x20);
    session.supports.force_general_height(height as u16, slope);
}

// ---- Entities ----

fn entity_paint_setup(session: &mut PaintSession<'_>, ctx: &PaintContext<'_>, x: i32, y: i32) {
    // Quadrants outside the 0x2000-unit world cannot hold entities.
    if (x & 0xE000) != 0 || (y & 0xE000) != 0 {
        return;
    }
    let flags = session.flags();
    if flags.contains(ViewportFlags::INVISIBLE_SPRITES) {
        return;
    }
    let zoom = session.dpi().zoom.get();
    if zoom > 2 {
        return;
    }

    // The quadrant walk borrows the entity list while the session is
    // mutated, so collect the chain ids first.
    let ids: Vec<_> = ctx.entities.quadrant_entities(x, y).map(|e| e.id).collect();
    for id in ids {
        let Some(entity) = ctx.entities.get(id) else {
            continue;
        };
        if zoom >= 2 && entity.kind.hidden_at_far_zoom() {
            continue;
        }
        if flags.contains(ViewportFlags::INVISIBLE_PEEPS)
            && matches!(entity.kind, EntityKind::Guest | EntityKind::Staff)
        {
            continue;
        }

        let dpi = session.dpi();
        if dpi.bottom() <= entity.bounds.top
            || entity.bounds.bottom <= dpi.y
            || dpi.right() <= entity.bounds.left
            || entity.bounds.right <= dpi.x
        {
            continue;
        }

        session.sprite_position = entity.pos.xy();
        session.interaction_item = InteractionItem::Entity;
        session.current_target = PaintTarget::Entity(id);

        let z = entity.pos.z;
        match &entity.kind {
            EntityKind::Vehicle => {
                session.add_primitive_with_bounds(
                    entity.image,
                    CoordsXYZ::new(0, 0, z),
                    CoordsXYZ::new(16, 16, entity.sprite_height_above),
                    CoordsXYZ::new(-8, -8, z),
                );
            }
            EntityKind::Guest | EntityKind::Staff => {
                session.add_primitive_with_bounds(
                    entity.image,
                    CoordsXYZ::new(0, 0, z),
                    CoordsXYZ::new(1, 1, 11),
                    CoordsXYZ::new(0, 0, z + 3),
                );
            }
            EntityKind::FloatingText { text } => {
                session.add_floating_text(text.clone(), z, 0);
            }
            EntityKind::Litter => {
                session.add_primitive_with_bounds(
                    entity.image,
                    CoordsXYZ::new(0, 0, z),
                    CoordsXYZ::new(4, 4, -1),
                    CoordsXYZ::new(-4, -4, z + 2),
                );
            }
        }
    }
    session.current_target = PaintTarget::None;
    session.interaction_item = InteractionItem::None;
}
