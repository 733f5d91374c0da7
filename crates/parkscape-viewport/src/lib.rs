//! parkscape-viewport: viewports and the windows that drive them.
//!
//! A viewport is a screen rectangle looking into projected view space;
//! this crate owns their allocation ([`manager::ViewportManager`]), the
//! window-side focus/pan/scroll logic ([`window::ViewportWindow`]), the
//! render entry point that feeds damage to the paint pipeline
//! ([`render::viewport_render`]), cursor hit-testing back into world
//! coordinates ([`interaction`]), overlay toggles ([`overlays`]) and
//! positional sound parameters ([`sound`]).

pub mod interaction;
pub mod manager;
pub mod overlays;
pub mod render;
pub mod sound;
pub mod window;

pub use interaction::{
    InteractionInfo, get_map_coordinates_from_pos, screen_get_map_xy, screen_get_map_xy_with_z,
    screen_pos_to_map_pos, snap_to_surface,
};
pub use manager::{MAX_VIEWPORT_COUNT, ViewportId, ViewportManager};
pub use overlays::{OverlayCounters, set_visibility};
pub use render::{invalidate_view_rect, viewport_render};
pub use sound::{SoundParams, find_tracking_viewport, sound_params_at};
pub use window::{Focus, SavedView, ScreenSize, ScrollHint, ViewportWindow, WindowFlags};
