//! Foundation types for Parkscape.
//!
//! This crate contains the platform-agnostic core types shared by all
//! Parkscape crates: world/screen coordinates, the four-way camera rotation
//! and its isometric projection, image identifiers, the viewport data type
//! and its flag set, interaction item categories, the per-frame render
//! context, configuration, and error types.

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod image;
pub mod interaction;
pub mod rotation;
pub mod viewport;

pub use error::{ParkscapeError, Result};
pub use frame::FrameState;
pub use geometry::{CoordsXY, CoordsXYZ, ScreenCoords, ScreenRect};
pub use rotation::Rotation;
pub use viewport::{Viewport, ViewportFlags, ZoomLevel};
