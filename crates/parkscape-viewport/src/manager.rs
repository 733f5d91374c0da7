//! Fixed-slot viewport allocation.
//!
//! Viewports live in a fixed array of [`MAX_VIEWPORT_COUNT`] slots; a slot
//! with zero width is free. A compacted list of the active slots, in slot
//! order, is rebuilt after every create/destroy so iteration (rendering,
//! point lookup, sound tracking) never has to skip free slots.

use parkscape_types::geometry::{ScreenCoords, ScreenRect};
use parkscape_types::viewport::ZoomLevel;
use parkscape_types::{ParkscapeError, Result, Viewport};

/// Total viewport slots. Opening more windows with viewports than this is
/// an error the caller must surface.
pub const MAX_VIEWPORT_COUNT: usize = 9;

/// Stable handle to a viewport slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportId(usize);

impl ViewportId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Owner of all viewport slots.
#[derive(Debug)]
pub struct ViewportManager {
    slots: [Viewport; MAX_VIEWPORT_COUNT],
    active: Vec<ViewportId>,
}

impl ViewportManager {
    pub fn new() -> Self {
        Self {
            slots: [Viewport::default(); MAX_VIEWPORT_COUNT],
            active: Vec::with_capacity(MAX_VIEWPORT_COUNT),
        }
    }

    /// Allocate the first free slot and initialize it for `rect` at `zoom`.
    pub fn create(&mut self, rect: ScreenRect, zoom: ZoomLevel) -> Result<ViewportId> {
        let Some(index) = self.slots.iter().position(|v| !v.is_active()) else {
            log::error!("no more viewport slots left to allocate");
            return Err(ParkscapeError::ViewportSlotsExhausted(MAX_VIEWPORT_COUNT));
        };
        self.slots[index] = Viewport::new(rect, zoom);
        self.update_pointers();
        Ok(ViewportId(index))
    }

    /// Free a slot. The id must not be used afterwards.
    pub fn destroy(&mut self, id: ViewportId) {
        self.slots[id.0] = Viewport::default();
        self.update_pointers();
    }

    /// Rebuild the compacted active list from slot occupancy.
    pub fn update_pointers(&mut self) {
        self.active.clear();
        self.active.extend(
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_active())
                .map(|(i, _)| ViewportId(i)),
        );
    }

    /// Active viewports in slot order.
    pub fn active(&self) -> &[ViewportId] {
        &self.active
    }

    pub fn get(&self, id: ViewportId) -> &Viewport {
        &self.slots[id.0]
    }

    pub fn get_mut(&mut self, id: ViewportId) -> &mut Viewport {
        &mut self.slots[id.0]
    }

    /// First active viewport whose screen rectangle contains `screen`.
    pub fn find_from_point(&self, screen: ScreenCoords) -> Option<ViewportId> {
        self.active
            .iter()
            .copied()
            .find(|&id| self.slots[id.0].contains_screen_point(screen))
    }
}

impl Default for ViewportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: i32, y: i32) -> ScreenRect {
        ScreenRect::new(x, y, 100, 100)
    }

    #[test]
    fn create_fails_once_all_slots_are_used() {
        let mut manager = ViewportManager::new();
        for i in 0..MAX_VIEWPORT_COUNT {
            manager
                .create(rect(i as i32 * 100, 0), ZoomLevel::MIN)
                .unwrap();
        }
        let err = manager.create(rect(0, 0), ZoomLevel::MIN).unwrap_err();
        assert!(matches!(
            err,
            ParkscapeError::ViewportSlotsExhausted(MAX_VIEWPORT_COUNT)
        ));
    }

    #[test]
    fn destroy_frees_the_slot_for_reuse() {
        let mut manager = ViewportManager::new();
        let ids: Vec<_> = (0..MAX_VIEWPORT_COUNT)
            .map(|i| manager.create(rect(i as i32 * 100, 0), ZoomLevel::MIN).unwrap())
            .collect();
        manager.destroy(ids[4]);
        assert_eq!(manager.active().len(), MAX_VIEWPORT_COUNT - 1);

        let reused = manager.create(rect(0, 200), ZoomLevel::MIN).unwrap();
        assert_eq!(reused.index(), 4);
        assert_eq!(manager.active().len(), MAX_VIEWPORT_COUNT);
    }

    #[test]
    fn active_list_is_compacted_in_slot_order() {
        let mut manager = ViewportManager::new();
        let a = manager.create(rect(0, 0), ZoomLevel::MIN).unwrap();
        let b = manager.create(rect(100, 0), ZoomLevel::MIN).unwrap();
        let c = manager.create(rect(200, 0), ZoomLevel::MIN).unwrap();
        manager.destroy(b);
        assert_eq!(manager.active(), &[a, c]);
    }

    #[test]
    fn find_from_point_matches_containing_rect() {
        let mut manager = ViewportManager::new();
        let a = manager.create(rect(0, 0), ZoomLevel::MIN).unwrap();
        let b = manager.create(rect(100, 0), ZoomLevel::MIN).unwrap();
        assert_eq!(manager.find_from_point(ScreenCoords::new(50, 50)), Some(a));
        assert_eq!(manager.find_from_point(ScreenCoords::new(150, 50)), Some(b));
        assert_eq!(manager.find_from_point(ScreenCoords::new(500, 50)), None);
    }

    proptest! {
        // Any create/destroy sequence leaves the active list equal to the
        // occupied slots, in slot order.
        #[test]
        fn active_list_always_mirrors_occupancy(ops in prop::collection::vec(0usize..12, 0..40)) {
            let mut manager = ViewportManager::new();
            for op in ops {
                if op < MAX_VIEWPORT_COUNT && manager.get(ViewportId(op)).is_active() {
                    manager.destroy(ViewportId(op));
                } else {
                    let _ = manager.create(rect(0, 0), ZoomLevel::MIN);
                }
            }
            let occupied: Vec<_> = (0..MAX_VIEWPORT_COUNT)
                .filter(|&i| manager.get(ViewportId(i)).is_active())
                .map(ViewportId)
                .collect();
            prop_assert_eq!(manager.active(), occupied.as_slice());
        }
    }
}
