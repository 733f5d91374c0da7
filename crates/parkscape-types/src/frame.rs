//! Per-frame shared render state.
//!
//! The original kept the camera rotation and weather gloom in process-wide
//! globals read by every stage of the pipeline. Here they travel in an
//! explicit [`FrameState`] passed into each entry point, which makes the
//! "one rotation value for the whole frame" rule a property of the call
//! graph instead of a convention.

use crate::rotation::Rotation;

/// Ambient weather darkening level, indexing the overlay tint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WeatherGloom {
    #[default]
    None = 0,
    Dimmed = 1,
    Dark = 2,
    StormDark = 3,
}

/// Snapshot of the frame-wide inputs the render pipeline reads.
///
/// Constructed once per paint request and shared immutably by the
/// projector, dispatcher, session, and compositor for that frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState {
    pub rotation: Rotation,
    pub gloom: WeatherGloom,
}

impl FrameState {
    pub fn new(rotation: Rotation) -> Self {
        Self {
            rotation,
            gloom: WeatherGloom::None,
        }
    }

    pub fn with_gloom(mut self, gloom: WeatherGloom) -> Self {
        self.gloom = gloom;
        self
    }
}
