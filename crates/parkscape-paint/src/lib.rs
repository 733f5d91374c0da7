//! parkscape-paint: the isometric paint pipeline.
//!
//! One frame of a viewport is painted in 32-pixel columns. For each column a
//! [`session::PaintSession`] collects paint structs from the tile/entity
//! dispatcher, buckets them into depth quadrants, arranges them
//! back-to-front, and draws the result through a [`backend::PaintBackend`].
//! The same arranged composite answers cursor hit-tests via
//! [`session::PaintSession::pick`].

pub mod backend;
pub mod column;
pub mod dispatch;
pub mod session;
pub mod support;
pub mod track;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backend::{Dpi, PaintBackend, SpriteAtlas, SpriteExtent, UniformAtlas};
pub use column::{paint_column, viewport_paint};
pub use dispatch::PaintContext;
pub use session::{PaintSession, PickResult};
pub use track::{TrackPaintCtx, TrackPainter, TrackPainterRegistry};
