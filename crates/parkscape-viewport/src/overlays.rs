//! Reference-counted overlay toggles and the visibility mode switch.
//!
//! Several tools can request the same overlay (gridlines while placing
//! scenery, land rights while buying land) without knowing about each other,
//! so each overlay keeps a counter: the flag turns on with the first show
//! and off with the last hide. Counters saturate; an unbalanced hide must
//! not wedge the overlay permanently.

use parkscape_types::Viewport;
use parkscape_types::config::RenderConfig;
use parkscape_types::viewport::ViewportFlags;

/// Overlay request counts for the main window's viewport.
#[derive(Debug, Default)]
pub struct OverlayCounters {
    gridlines: u8,
    land_rights: u8,
    construction_rights: u8,
}

impl OverlayCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the viewport needs a repaint.
    pub fn show_gridlines(&mut self, viewport: &mut Viewport) -> bool {
        let invalidate = self.gridlines == 0 && show_flag(viewport, ViewportFlags::GRIDLINES);
        self.gridlines = self.gridlines.saturating_add(1);
        invalidate
    }

    /// The gridlines flag survives the last hide when the player has them
    /// always on.
    pub fn hide_gridlines(&mut self, viewport: &mut Viewport, config: &RenderConfig) -> bool {
        self.gridlines = self.gridlines.saturating_sub(1);
        self.gridlines == 0
            && !config.always_show_gridlines
            && hide_flag(viewport, ViewportFlags::GRIDLINES)
    }

    pub fn show_land_rights(&mut self, viewport: &mut Viewport) -> bool {
        let invalidate = self.land_rights == 0 && show_flag(viewport, ViewportFlags::LAND_OWNERSHIP);
        self.land_rights = self.land_rights.saturating_add(1);
        invalidate
    }

    pub fn hide_land_rights(&mut self, viewport: &mut Viewport) -> bool {
        self.land_rights = self.land_rights.saturating_sub(1);
        self.land_rights == 0 && hide_flag(viewport, ViewportFlags::LAND_OWNERSHIP)
    }

    pub fn show_construction_rights(&mut self, viewport: &mut Viewport) -> bool {
        let invalidate =
            self.construction_rights == 0 && show_flag(viewport, ViewportFlags::CONSTRUCTION_RIGHTS);
        self.construction_rights = self.construction_rights.saturating_add(1);
        invalidate
    }

    pub fn hide_construction_rights(&mut self, viewport: &mut Viewport) -> bool {
        self.construction_rights = self.construction_rights.saturating_sub(1);
        self.construction_rights == 0 && hide_flag(viewport, ViewportFlags::CONSTRUCTION_RIGHTS)
    }
}

fn show_flag(viewport: &mut Viewport, flag: ViewportFlags) -> bool {
    if viewport.flags.contains(flag) {
        return false;
    }
    viewport.flags.insert(flag);
    true
}

fn hide_flag(viewport: &mut Viewport, flag: ViewportFlags) -> bool {
    if !viewport.flags.contains(flag) {
        return false;
    }
    viewport.flags.remove(flag);
    true
}

/// Everything the "normal" visibility mode strips from a viewport.
const VISIBILITY_MASK: ViewportFlags = ViewportFlags::UNDERGROUND_INSIDE
    .union(ViewportFlags::SEETHROUGH_RIDES)
    .union(ViewportFlags::SEETHROUGH_SCENERY)
    .union(ViewportFlags::SEETHROUGH_PATHS)
    .union(ViewportFlags::INVISIBLE_SUPPORTS)
    .union(ViewportFlags::LAND_HEIGHTS)
    .union(ViewportFlags::TRACK_HEIGHTS)
    .union(ViewportFlags::PATH_HEIGHTS)
    .union(ViewportFlags::INVISIBLE_PEEPS)
    .union(ViewportFlags::HIDE_BASE)
    .union(ViewportFlags::HIDE_VERTICAL);

/// Apply one of the fixed visibility modes. Returns true when the flags
/// changed and the viewport needs a repaint.
///
/// Modes: 0 resets every visibility flag, 1 and 4 enter underground view,
/// 2 shows track heights, 3 and 5 leave underground view. Unknown modes are
/// ignored.
pub fn set_visibility(viewport: &mut Viewport, mode: u8) -> bool {
    let before = viewport.flags;
    match mode {
        0 => viewport.flags.remove(VISIBILITY_MASK),
        1 | 4 => viewport.flags.insert(ViewportFlags::UNDERGROUND_INSIDE),
        2 => viewport.flags.insert(ViewportFlags::TRACK_HEIGHTS),
        3 | 5 => viewport.flags.remove(ViewportFlags::UNDERGROUND_INSIDE),
        _ => {}
    }
    viewport.flags != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkscape_types::geometry::ScreenRect;
    use parkscape_types::viewport::ZoomLevel;

    fn viewport() -> Viewport {
        Viewport::new(ScreenRect::new(0, 0, 640, 480), ZoomLevel::MIN)
    }

    #[test]
    fn gridlines_turn_on_first_show_and_off_last_hide() {
        let mut vp = viewport();
        let mut counters = OverlayCounters::new();
        let config = RenderConfig::default();

        assert!(counters.show_gridlines(&mut vp));
        assert!(!counters.show_gridlines(&mut vp));
        assert!(!counters.show_gridlines(&mut vp));
        assert!(vp.flags.contains(ViewportFlags::GRIDLINES));

        assert!(!counters.hide_gridlines(&mut vp, &config));
        assert!(!counters.hide_gridlines(&mut vp, &config));
        assert!(vp.flags.contains(ViewportFlags::GRIDLINES));
        assert!(counters.hide_gridlines(&mut vp, &config));
        assert!(!vp.flags.contains(ViewportFlags::GRIDLINES));
    }

    #[test]
    fn unbalanced_hide_does_not_wedge_the_overlay() {
        let mut vp = viewport();
        let mut counters = OverlayCounters::new();
        let config = RenderConfig::default();

        counters.show_gridlines(&mut vp);
        counters.hide_gridlines(&mut vp, &config);
        // One hide too many.
        assert!(!counters.hide_gridlines(&mut vp, &config));

        assert!(counters.show_gridlines(&mut vp));
        assert!(vp.flags.contains(ViewportFlags::GRIDLINES));
    }

    #[test]
    fn always_on_gridlines_survive_the_last_hide() {
        let mut vp = viewport();
        let mut counters = OverlayCounters::new();
        let config = RenderConfig::from_toml("always_show_gridlines = true").unwrap();

        counters.show_gridlines(&mut vp);
        assert!(!counters.hide_gridlines(&mut vp, &config));
        assert!(vp.flags.contains(ViewportFlags::GRIDLINES));
    }

    #[test]
    fn rights_overlays_count_independently() {
        let mut vp = viewport();
        let mut counters = OverlayCounters::new();

        assert!(counters.show_land_rights(&mut vp));
        assert!(counters.show_construction_rights(&mut vp));
        assert!(counters.hide_land_rights(&mut vp));
        assert!(vp.flags.contains(ViewportFlags::CONSTRUCTION_RIGHTS));
        assert!(!vp.flags.contains(ViewportFlags::LAND_OWNERSHIP));
        assert!(counters.hide_construction_rights(&mut vp));
    }

    #[test]
    fn visibility_modes_match_the_switch() {
        let mut vp = viewport();

        assert!(set_visibility(&mut vp, 1));
        assert!(vp.flags.contains(ViewportFlags::UNDERGROUND_INSIDE));
        assert!(!set_visibility(&mut vp, 4));

        assert!(set_visibility(&mut vp, 2));
        assert!(vp.flags.contains(ViewportFlags::TRACK_HEIGHTS));

        assert!(set_visibility(&mut vp, 3));
        assert!(!vp.flags.contains(ViewportFlags::UNDERGROUND_INSIDE));

        // Mode 0 strips the rest, but leaves overlay toggles alone.
        vp.flags.insert(ViewportFlags::GRIDLINES | ViewportFlags::HIDE_BASE);
        assert!(set_visibility(&mut vp, 0));
        assert!(vp.flags.contains(ViewportFlags::GRIDLINES));
        assert!(!vp.flags.contains(ViewportFlags::HIDE_BASE));
        assert!(!vp.flags.contains(ViewportFlags::TRACK_HEIGHTS));

        assert!(!set_visibility(&mut vp, 99));
    }
}
