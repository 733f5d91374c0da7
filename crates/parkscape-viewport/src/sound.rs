//! Positional sound parameters derived from the tracking viewport.
//!
//! Pure calculation: given a world position and the sound-enabled viewport,
//! produce a stereo pan and an attenuated volume for the mixer, or nothing
//! when the source is too far outside the view to be audible. No audio
//! buffers are touched here.

use parkscape_types::Rotation;
use parkscape_types::geometry::CoordsXYZ;
use parkscape_types::rotation::project;
use parkscape_types::viewport::{Viewport, ViewportFlags, ZoomLevel};

use crate::manager::{ViewportId, ViewportManager};
use crate::window::ScreenSize;

/// Mixer inputs for one sound source. Volume is in millibels (0 is full
/// scale, more negative is quieter); pan is signed, zero at screen centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundParams {
    pub volume: i32,
    pub pan: i32,
}

/// The viewport world sounds are spatialized against: the first active one
/// with sound enabled.
pub fn find_tracking_viewport(manager: &ViewportManager) -> Option<ViewportId> {
    manager
        .active()
        .iter()
        .copied()
        .find(|&id| manager.get(id).flags.contains(ViewportFlags::SOUND_ON))
}

/// Extra volume cut applied per zoom level; zoomed-out views hear less.
fn zoom_attenuation(zoom: ZoomLevel) -> i32 {
    match zoom.get() {
        0 => 0,
        1 => 30,
        _ => 60,
    }
}

/// Volume contribution of one pan axis, 0..=255.
fn axis_volume(pan: i32) -> i32 {
    let distance = pan.abs().min(6143) - 2048;
    if distance <= 0 {
        return 255;
    }
    let volume = -((distance / 4) - 1024) / 4;
    if volume >= 256 { 255 } else { volume }
}

/// Spatialize a world position through `viewport`.
///
/// Sources outside a margin of two view-widths around the view are
/// inaudible, as are ones attenuated below the mixer floor.
pub fn sound_params_at(
    viewport: &Viewport,
    pos: CoordsXYZ,
    rotation: Rotation,
    screen: ScreenSize,
) -> Option<SoundParams> {
    let projected = project(pos, rotation);

    let margin = viewport.view_width * 2;
    let left = viewport.view_x - margin;
    let top = viewport.view_y - viewport.view_width;
    let right = left + margin + margin + viewport.view_width;
    let bottom = top + viewport.view_width * 2 + viewport.view_height;
    if left >= projected.x || top >= projected.y || right < projected.x || bottom < projected.y {
        return None;
    }

    let screen_x = viewport.x + viewport.zoom.scale_down(projected.x - viewport.view_x);
    let pan_x = ((screen_x * 0x10000 / screen.width.max(64)) - 0x8000) >> 4;
    let screen_y = viewport.y + viewport.zoom.scale_down(projected.y - viewport.view_y);
    let pan_y = ((screen_y * 0x10000 / screen.height.max(64)) - 0x8000) >> 4;

    let mut volume = axis_volume(pan_y).min(axis_volume(pan_x));
    let attenuation = zoom_attenuation(viewport.zoom) * 3;
    volume = if volume < attenuation {
        0
    } else {
        volume - attenuation
    };

    let inverse = 255 - volume;
    let millibels = -(inverse * inverse / 16) - 700;
    if volume == 0 || millibels < -4000 {
        return None;
    }
    Some(SoundParams {
        volume: millibels,
        pan: pan_x.clamp(-10_000, 10_000),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkscape_types::geometry::ScreenRect;

    const SCREEN: ScreenSize = ScreenSize::new(640, 480);

    /// Full-screen viewport with the view centred on world (256, 256, 0).
    fn centred_viewport(zoom: u8) -> Viewport {
        let zoom = ZoomLevel::new(zoom);
        let mut vp = Viewport::new(ScreenRect::new(0, 0, 640, 480), zoom);
        let focus = project(CoordsXYZ::new(256, 256, 0), Rotation::R0);
        vp.view_x = focus.x - vp.view_width / 2;
        vp.view_y = focus.y - vp.view_height / 2;
        vp
    }

    #[test]
    fn centred_source_is_full_volume_at_zero_pan() {
        let vp = centred_viewport(0);
        let params =
            sound_params_at(&vp, CoordsXYZ::new(256, 256, 0), Rotation::R0, SCREEN).unwrap();
        assert_eq!(params, SoundParams { volume: -700, pan: 0 });
    }

    #[test]
    fn source_left_of_centre_pans_left() {
        let vp = centred_viewport(0);
        // View x of this position lands at screen x 160.
        let pos = CoordsXYZ::new(256 + 80, 256 - 80, 0);
        let params = sound_params_at(&vp, pos, Rotation::R0, SCREEN).unwrap();
        assert_eq!(params.pan, -1024);
        assert_eq!(params.volume, -700);
    }

    #[test]
    fn offscreen_source_is_quieter() {
        let vp = centred_viewport(0);
        // Screen x -160, well past the left edge.
        let pos = CoordsXYZ::new(256 + 240, 256 - 240, 0);
        let params = sound_params_at(&vp, pos, Rotation::R0, SCREEN).unwrap();
        assert!(params.pan < -1024);
        assert!(params.volume < -700);
    }

    #[test]
    fn far_source_is_inaudible() {
        let vp = centred_viewport(0);
        assert_eq!(
            sound_params_at(&vp, CoordsXYZ::new(0, 5000, 0), Rotation::R0, SCREEN),
            None
        );
    }

    #[test]
    fn zoomed_out_views_attenuate() {
        let loud = sound_params_at(
            &centred_viewport(0),
            CoordsXYZ::new(256, 256, 0),
            Rotation::R0,
            SCREEN,
        )
        .unwrap();
        let quiet = sound_params_at(
            &centred_viewport(1),
            CoordsXYZ::new(256, 256, 0),
            Rotation::R0,
            SCREEN,
        )
        .unwrap();
        assert!(quiet.volume < loud.volume);
    }

    #[test]
    fn tracking_viewport_is_first_with_sound_on() {
        let mut manager = ViewportManager::new();
        let a = manager
            .create(ScreenRect::new(0, 0, 100, 100), ZoomLevel::MIN)
            .unwrap();
        let b = manager
            .create(ScreenRect::new(100, 0, 100, 100), ZoomLevel::MIN)
            .unwrap();
        assert_eq!(find_tracking_viewport(&manager), None);

        manager.get_mut(b).flags.insert(ViewportFlags::SOUND_ON);
        assert_eq!(find_tracking_viewport(&manager), Some(b));

        manager.get_mut(a).flags.insert(ViewportFlags::SOUND_ON);
        assert_eq!(find_tracking_viewport(&manager), Some(a));
    }
}
