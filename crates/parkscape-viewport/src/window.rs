//! Windows that own a viewport: focus tracking, panning and the per-tick
//! position update.
//!
//! A window keeps a *saved view* (the view origin it wants) separate from
//! the viewport's current origin, so smooth scrolling and map-edge clamping
//! can converge on it over several ticks. Panning never repaints here; it
//! returns a [`ScrollHint`] describing what the compositor should shift or
//! redraw.

use bitflags::bitflags;

use parkscape_types::config::RenderConfig;
use parkscape_types::geometry::{CoordsXYZ, MAP_MINIMUM_X_Y, ScreenCoords, ScreenRect};
use parkscape_types::rotation::center_coordinates;
use parkscape_types::viewport::{ViewportFlags, ZoomLevel};
use parkscape_types::{Result, Rotation};
use parkscape_world::{EntityId, EntityList, WorldMap};

use crate::interaction::snap_to_surface;
use crate::manager::{ViewportId, ViewportManager};

bitflags! {
    /// Window behavior bits that affect viewport updates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// The main world window. Its viewport never gets the underground
        /// flag toggled by focus tracking.
        const MAIN                  = 1 << 0;
        /// Background shows through; panning must redraw the full rect
        /// instead of shifting pixels.
        const TRANSPARENT           = 1 << 1;
        /// Smooth-scroll toward the saved view instead of jumping.
        const SCROLLING_TO_LOCATION = 1 << 2;
    }
}

/// What a window's viewport is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Coordinate(CoordsXYZ),
    Entity(EntityId),
}

/// Screen dimensions the compositor clips against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Damage produced by a pan, for the compositor to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollHint {
    /// Nothing moved a whole screen pixel.
    None,
    /// Redraw the whole (screen-clipped) viewport rectangle.
    Redraw(ScreenRect),
    /// Shift the pixels of `region` by `(dx, dy)` screen pixels and repaint
    /// the strips uncovered along the trailing edges.
    Shift { dx: i32, dy: i32, region: ScreenRect },
}

/// A window holding one viewport.
#[derive(Debug)]
pub struct ViewportWindow {
    pub viewport: Option<ViewportId>,
    pub focus: Focus,
    /// View origin this window wants its viewport at.
    pub saved_view: ScreenCoords,
    pub flags: WindowFlags,
}

impl ViewportWindow {
    pub fn new(focus: Focus, flags: WindowFlags) -> Self {
        Self {
            viewport: None,
            focus,
            saved_view: ScreenCoords::default(),
            flags,
        }
    }

    /// Allocate and aim a viewport at this window's focus.
    ///
    /// Entity focus forces zoom to the finest level; the follow path cannot
    /// keep a target centered at coarser zooms without judder.
    pub fn open_viewport(
        &mut self,
        manager: &mut ViewportManager,
        rect: ScreenRect,
        zoom: ZoomLevel,
        config: &RenderConfig,
        entities: &EntityList,
        rotation: Rotation,
    ) -> Result<ViewportId> {
        let zoom = match self.focus {
            Focus::Coordinate(_) => zoom,
            Focus::Entity(_) => ZoomLevel::MIN,
        };
        let id = manager.create(rect, zoom)?;
        let viewport = manager.get_mut(id);
        if config.always_show_gridlines {
            viewport.flags |= ViewportFlags::GRIDLINES;
        }
        let view = center_coordinates(
            self.focus_position(entities),
            rotation,
            viewport.view_width,
            viewport.view_height,
        );
        viewport.view_x = view.x;
        viewport.view_y = view.y;
        self.saved_view = view;
        self.viewport = Some(id);
        Ok(id)
    }

    fn focus_position(&self, entities: &EntityList) -> CoordsXYZ {
        match self.focus {
            Focus::Coordinate(coords) => coords,
            Focus::Entity(id) => entities
                .get(id)
                .map(|e| e.pos)
                .unwrap_or_default(),
        }
    }

    /// Per-tick viewport update: follow the focus, keep the view on the map,
    /// and pan toward the saved view.
    pub fn update_position(
        &mut self,
        manager: &mut ViewportManager,
        map: &WorldMap,
        entities: &EntityList,
        rotation: Rotation,
        screen: ScreenSize,
    ) -> ScrollHint {
        let Some(id) = self.viewport else {
            return ScrollHint::None;
        };
        if let Focus::Entity(entity_id) = self.focus {
            return self.update_entity_follow(manager, id, map, entities, entity_id, rotation, screen);
        }

        let viewport = *manager.get(id);
        let centre = ScreenCoords::new(
            viewport.view_width / 2 + self.saved_view.x,
            viewport.view_height / 2 + self.saved_view.y,
        );
        let (mut pos, _) = snap_to_surface(map, centre, rotation);
        self.set_underground_flag(manager, id, false);

        // Pull the focus point back onto the playable map, axis by axis.
        let maximum = map.maximum_x_y();
        let mut at_edge_x = false;
        let mut at_edge_y = false;
        if pos.x < MAP_MINIMUM_X_Y {
            pos.x = MAP_MINIMUM_X_Y;
            at_edge_x = true;
        } else if pos.x > maximum {
            pos.x = maximum;
            at_edge_x = true;
        }
        if pos.y < MAP_MINIMUM_X_Y {
            pos.y = MAP_MINIMUM_X_Y;
            at_edge_y = true;
        } else if pos.y > maximum {
            pos.y = maximum;
            at_edge_y = true;
        }
        if at_edge_x || at_edge_y {
            // Re-project the clamped point and intersect it with the saved
            // view on both axes, keeping the saved offset's sign.
            let z = map.surface_height(pos);
            let view = center_coordinates(
                pos.with_z(z),
                rotation,
                viewport.view_width,
                viewport.view_height,
            );
            self.saved_view.x = merge_edge_axis(view.x, self.saved_view.x);
            self.saved_view.y = merge_edge_axis(view.y, self.saved_view.y);
        }

        let mut target = self.saved_view;
        if self.flags.contains(WindowFlags::SCROLLING_TO_LOCATION) {
            // Close an eighth of the remaining distance per tick, at least
            // one view pixel per axis.
            let mut dx = target.x - viewport.view_x;
            let mut dy = target.y - viewport.view_y;
            let negative_x = dx < 0;
            let negative_y = dy < 0;
            if negative_x {
                dx = -dx;
            }
            if negative_y {
                dy = -dy;
            }
            dx = (dx + 7) / 8;
            dy = (dy + 7) / 8;
            if dx == 0 && dy == 0 {
                self.flags.remove(WindowFlags::SCROLLING_TO_LOCATION);
            }
            if negative_x {
                dx = -dx;
            }
            if negative_y {
                dy = -dy;
            }
            target = ScreenCoords::new(viewport.view_x + dx, viewport.view_y + dy);
        }
        self.move_view(manager, id, target, screen)
    }

    #[allow(clippy::too_many_arguments)]
    fn update_entity_follow(
        &mut self,
        manager: &mut ViewportManager,
        id: ViewportId,
        map: &WorldMap,
        entities: &EntityList,
        entity_id: EntityId,
        rotation: Rotation,
        screen: ScreenSize,
    ) -> ScrollHint {
        let Some(entity) = entities.get(entity_id) else {
            return ScrollHint::None;
        };
        let underground = entity.pos.z < map.surface_height(entity.pos.xy()) - 16;
        self.set_underground_flag(manager, id, underground);

        let viewport = *manager.get(id);
        let view = center_coordinates(entity.pos, rotation, viewport.view_width, viewport.view_height);
        self.move_view(manager, id, view, screen)
    }

    /// Toggle the underground render mode on follow transitions. The main
    /// window keeps whatever the player chose; only secondary windows track
    /// their focus automatically.
    fn set_underground_flag(
        &self,
        manager: &mut ViewportManager,
        id: ViewportId,
        underground: bool,
    ) -> bool {
        if self.flags.contains(WindowFlags::MAIN) {
            return false;
        }
        let viewport = manager.get_mut(id);
        let currently = viewport.flags.contains(ViewportFlags::UNDERGROUND_INSIDE);
        if underground == currently {
            return false;
        }
        viewport.flags.toggle(ViewportFlags::UNDERGROUND_INSIDE);
        true
    }

    /// Pan the viewport's view origin to `target`.
    ///
    /// Deltas are compared in screen pixels (each term shifted by zoom
    /// separately), so sub-pixel pans update the origin without producing
    /// damage. When the viewport hangs off the screen, the emitted region is
    /// clipped; if nothing remains on screen the viewport is left exactly as
    /// it was.
    pub fn move_view(
        &self,
        manager: &mut ViewportManager,
        id: ViewportId,
        target: ScreenCoords,
        screen: ScreenSize,
    ) -> ScrollHint {
        let viewport = manager.get_mut(id);
        let zoom = viewport.zoom;
        let dx = zoom.scale_down(viewport.view_x) - zoom.scale_down(target.x);
        let dy = zoom.scale_down(viewport.view_y) - zoom.scale_down(target.y);
        if dx == 0 && dy == 0 {
            viewport.view_x = target.x;
            viewport.view_y = target.y;
            return ScrollHint::None;
        }

        if self.flags.contains(WindowFlags::TRANSPARENT) {
            viewport.view_x = target.x;
            viewport.view_y = target.y;
            let mut rect = viewport.screen_rect();
            if rect.x < 0 {
                rect.width += rect.x;
                rect.x = 0;
            }
            if rect.y < 0 {
                rect.height += rect.y;
                rect.y = 0;
            }
            rect.width = rect.width.min(screen.width - rect.x);
            rect.height = rect.height.min(screen.height - rect.y);
            if rect.width <= 0 || rect.height <= 0 {
                return ScrollHint::None;
            }
            return ScrollHint::Redraw(rect);
        }

        // Clip a working copy against the screen; abandon the move entirely
        // if the visible part vanishes.
        let mut clipped = *viewport;
        if clipped.x < 0 {
            clipped.width += clipped.x;
            clipped.view_width += zoom.scale_up(clipped.x);
            clipped.view_x -= zoom.scale_up(clipped.x);
            clipped.x = 0;
        }
        let overflow = clipped.x + clipped.width - screen.width;
        if overflow > 0 {
            clipped.width -= overflow;
            clipped.view_width -= zoom.scale_up(overflow);
        }
        if clipped.width <= 0 {
            return ScrollHint::None;
        }
        if clipped.y < 0 {
            clipped.height += clipped.y;
            clipped.view_height += zoom.scale_up(clipped.y);
            clipped.view_y -= zoom.scale_up(clipped.y);
            clipped.y = 0;
        }
        let overflow = clipped.y + clipped.height - screen.height;
        if overflow > 0 {
            clipped.height -= overflow;
            clipped.view_height -= zoom.scale_up(overflow);
        }
        if clipped.height <= 0 {
            return ScrollHint::None;
        }

        let viewport = manager.get_mut(id);
        viewport.view_x = target.x;
        viewport.view_y = target.y;
        ScrollHint::Shift {
            dx,
            dy,
            region: clipped.screen_rect(),
        }
    }

    /// The view centre, zoom and rotation to restore this window from a
    /// save.
    pub fn saved_view_state(&self, manager: &ViewportManager, rotation: Rotation) -> Option<SavedView> {
        let viewport = manager.get(self.viewport?);
        Some(SavedView {
            view_centre: viewport.view_center(),
            zoom: viewport.zoom,
            rotation,
        })
    }
}

/// Intersect a re-projected map-edge clamp with a saved view axis. A saved
/// offset past the clamp is pulled back to it; one already inside keeps its
/// value, on whichever side of the origin it sits.
fn merge_edge_axis(clamped: i32, saved: i32) -> i32 {
    if saved > 0 {
        clamped.min(saved)
    } else {
        clamped.max(saved)
    }
}

/// Camera state persisted with a park save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedView {
    pub view_centre: ScreenCoords,
    pub zoom: ZoomLevel,
    pub rotation: Rotation,
}
