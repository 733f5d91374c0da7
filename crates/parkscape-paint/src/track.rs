//! Track paint callbacks: the painter trait, its registry, and the two
//! reference painters (flat track and station platform).
//!
//! The dispatcher never knows how a track piece looks; it resolves a painter
//! by track kind and hands it the session. Unknown kinds resolve to a no-op
//! painter, so an incomplete registry degrades to invisible track rather
//! than an error.

use std::collections::HashMap;
use std::sync::Arc;

use parkscape_types::geometry::CoordsXYZ;
use parkscape_types::image::ImageId;
use parkscape_world::TrackKind;

use crate::session::PaintSession;
use crate::support::{SEGMENT_HEIGHT_NONE, Segments};

/// Tunnel portal style for flat track.
pub const TUNNEL_FLAT: u8 = 6;

/// Everything a painter needs to know about the piece being painted.
#[derive(Debug, Clone, Copy)]
pub struct TrackPaintCtx {
    pub kind: TrackKind,
    /// Piece facing combined with the camera rotation, 0-3.
    pub direction: u8,
    /// Index within a multi-tile piece.
    pub sequence: u8,
    pub ride_index: u8,
    /// Track base height in world z units.
    pub height: i32,
}

/// A paint callback for one family of track pieces.
pub trait TrackPainter: Send + Sync {
    fn paint(&self, session: &mut PaintSession<'_>, ctx: &TrackPaintCtx);
}

/// Submit a track sprite with its extents swapped for odd directions, so
/// painters can describe pieces in direction-0 terms only.
pub fn add_track_primitive(
    session: &mut PaintSession<'_>,
    image: ImageId,
    direction: u8,
    offset: CoordsXYZ,
    bound_size: CoordsXYZ,
    bound_offset: CoordsXYZ,
) {
    if direction & 1 != 0 {
        session.add_primitive_with_bounds(
            image,
            CoordsXYZ::new(offset.y, offset.x, offset.z),
            CoordsXYZ::new(bound_size.y, bound_size.x, bound_size.z),
            CoordsXYZ::new(bound_offset.y, bound_offset.x, bound_offset.z),
        );
    } else {
        session.add_primitive_with_bounds(image, offset, bound_size, bound_offset);
    }
}

/// Record the flat-track tunnel portal on the column edge the piece exits.
pub fn push_tunnel_rotated(session: &mut PaintSession<'_>, direction: u8, height: i32, kind: u8) {
    if direction & 1 == 0 {
        session.supports.push_tunnel_left(height, kind);
    } else {
        session.supports.push_tunnel_right(height, kind);
    }
}

/// Painter that draws nothing. Default for unregistered track kinds.
#[derive(Debug, Default)]
pub struct NoOpPainter;

impl TrackPainter for NoOpPainter {
    fn paint(&self, _session: &mut PaintSession<'_>, _ctx: &TrackPaintCtx) {}
}

/// Straight flat track: one sprite per direction, rail segments blocked for
/// supports, a flat tunnel portal on the exit edge.
#[derive(Debug)]
pub struct FlatTrackPainter {
    pub images: [u32; 4],
}

impl TrackPainter for FlatTrackPainter {
    fn paint(&self, session: &mut PaintSession<'_>, ctx: &TrackPaintCtx) {
        let image = ImageId::new(self.images[(ctx.direction & 3) as usize]);
        add_track_primitive(
            session,
            image,
            ctx.direction,
            CoordsXYZ::new(0, 0, ctx.height),
            CoordsXYZ::new(32, 20, 1),
            CoordsXYZ::new(0, 6, ctx.height),
        );
        push_tunnel_rotated(session, ctx.direction, ctx.height, TUNNEL_FLAT);
        session.supports.set_segment_height(
            (Segments::SW_EDGE | Segments::CENTER | Segments::NE_EDGE).rotated(ctx.direction),
            SEGMENT_HEIGHT_NONE,
            0,
        );
        session
            .supports
            .set_general_height((ctx.height + 32) as u16, 0x20);
    }
}

/// Station platform: a full-width base with a platform edge attachment.
#[derive(Debug)]
pub struct StationPainter {
    pub track_images: [u32; 4],
    pub platform_images: [u32; 4],
}

impl TrackPainter for StationPainter {
    fn paint(&self, session: &mut PaintSession<'_>, ctx: &TrackPaintCtx) {
        let direction = (ctx.direction & 3) as usize;
        add_track_primitive(
            session,
            ImageId::new(self.track_images[direction]),
            ctx.direction,
            CoordsXYZ::new(0, 0, ctx.height - 2),
            CoordsXYZ::new(32, 28, 2),
            CoordsXYZ::new(0, 2, ctx.height),
        );
        session.attach_to_previous_primitive(ImageId::new(self.platform_images[direction]), 0, -2);
        push_tunnel_rotated(session, ctx.direction, ctx.height, TUNNEL_FLAT);
        session
            .supports
            .set_segment_height(Segments::all(), SEGMENT_HEIGHT_NONE, 0);
        session
            .supports
            .set_general_height((ctx.height + 32) as u16, 0x20);
    }
}

/// Kind-indexed painter lookup with a no-op fallback.
pub struct TrackPainterRegistry {
    painters: HashMap<TrackKind, Arc<dyn TrackPainter>>,
    fallback: Arc<dyn TrackPainter>,
}

impl TrackPainterRegistry {
    pub fn new() -> Self {
        Self {
            painters: HashMap::new(),
            fallback: Arc::new(NoOpPainter),
        }
    }

    /// A registry preloaded with the reference painters, using the default
    /// sprite numbering.
    pub fn with_standard_painters() -> Self {
        let mut registry = Self::new();
        registry.register(
            TrackKind::Flat,
            Arc::new(FlatTrackPainter {
                images: [
                    sprites::TRACK_FLAT_SW_NE,
                    sprites::TRACK_FLAT_NW_SE,
                    sprites::TRACK_FLAT_SW_NE,
                    sprites::TRACK_FLAT_NW_SE,
                ],
            }),
        );
        registry.register(
            TrackKind::Station,
            Arc::new(StationPainter {
                track_images: [
                    sprites::TRACK_STATION_SW_NE,
                    sprites::TRACK_STATION_NW_SE,
                    sprites::TRACK_STATION_SW_NE,
                    sprites::TRACK_STATION_NW_SE,
                ],
                platform_images: [
                    sprites::STATION_PLATFORM_SW_NE,
                    sprites::STATION_PLATFORM_NW_SE,
                    sprites::STATION_PLATFORM_SW_NE,
                    sprites::STATION_PLATFORM_NW_SE,
                ],
            }),
        );
        registry
    }

    pub fn register(&mut self, kind: TrackKind, painter: Arc<dyn TrackPainter>) {
        self.painters.insert(kind, painter);
    }

    pub fn painter(&self, kind: TrackKind) -> &dyn TrackPainter {
        self.painters
            .get(&kind)
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for TrackPainterRegistry {
    fn default() -> Self {
        Self::with_standard_painters()
    }
}

/// Default sprite numbering for the reference painters.
pub mod sprites {
    pub const TRACK_FLAT_SW_NE: u32 = 1400;
    pub const TRACK_FLAT_NW_SE: u32 = 1401;
    pub const TRACK_STATION_SW_NE: u32 = 1410;
    pub const TRACK_STATION_NW_SE: u32 = 1411;
    pub const STATION_PLATFORM_SW_NE: u32 = 1420;
    pub const STATION_PLATFORM_NW_SE: u32 = 1421;
}
