//! The paint session: a per-column arena of paint structs, bucketed into
//! depth quadrants, arranged back-to-front, and drawn through a backend.
//!
//! The original kept a global array of 4000 untyped slots threaded with raw
//! pointers. Here the arena is a `Vec<PaintEntry>` with `PaintIndex` links
//! and `Option` in place of null, but the capacity cap, the bucketing
//! hashes, the rotation-specific bound-box decrements, and the arrangement
//! pass are preserved exactly; a full arena silently drops new primitives
//! just as the original did.

use parkscape_types::geometry::{CoordsXY, CoordsXYZ, ScreenCoords, floor2};
use parkscape_types::image::ImageId;
use parkscape_types::interaction::{InteractionItem, InteractionMask};
use parkscape_types::rotation::{Rotation, project};
use parkscape_types::viewport::ViewportFlags;
use parkscape_types::{FrameState, Result};
use parkscape_world::EntityId;

use crate::backend::{Dpi, PaintBackend, SpriteAtlas};
use crate::support::SupportState;

/// Arena capacity, shared by primitives, attachments and text entries.
pub const MAX_PAINT_ENTRIES: usize = 4000;

/// Number of depth quadrants primitives are bucketed into.
pub const MAX_PAINT_QUADRANTS: usize = 512;

const QF_IDENTICAL: u8 = 1 << 0;
const QF_BIGGER: u8 = 1 << 1;
const QF_NEXT: u8 = 1 << 2;

/// Offsets and bound boxes arrive in rotation-0 frame; each camera rotation
/// un-rotates them with the inverse map direction.
const INVERSE_ROTATION: [u8; 4] = [0, 3, 2, 1];

/// Index of an entry in the session arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintIndex(u32);

/// World-space bound box of a primitive, used for depth arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundBox {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub x_end: i32,
    pub y_end: i32,
    pub z_end: i32,
}

/// What a primitive stands for, carried through to hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintTarget {
    #[default]
    None,
    /// A tile element, by tile coordinates and chain position.
    Tile { coords: CoordsXY, element: usize },
    Entity(EntityId),
}

/// One painted primitive.
#[derive(Debug, Clone)]
pub struct PaintStruct {
    pub image: ImageId,
    pub x: i32,
    pub y: i32,
    pub bounds: BoundBox,
    pub item: InteractionItem,
    pub map_pos: CoordsXY,
    pub target: PaintTarget,
    pub quadrant_index: u32,
    quadrant_flags: u8,
    pub next_quadrant: Option<PaintIndex>,
    /// Same-bound-box continuation drawn immediately after this primitive.
    pub children: Option<PaintIndex>,
    /// Head of the attachment sibling chain.
    pub attached: Option<PaintIndex>,
}

/// A sprite glued to a primitive at a local offset.
#[derive(Debug, Clone)]
pub struct AttachedStruct {
    pub image: ImageId,
    pub x: i32,
    pub y: i32,
    pub next: Option<PaintIndex>,
}

/// A floating text label drawn after the sprite composite.
#[derive(Debug, Clone)]
pub struct TextStruct {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub next: Option<PaintIndex>,
}

#[derive(Debug, Clone)]
enum PaintEntry {
    Primitive(PaintStruct),
    Attached(AttachedStruct),
    Text(TextStruct),
}

/// Result of a pick traversal; `item == None` is a valid miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickResult {
    pub item: InteractionItem,
    pub map_pos: CoordsXY,
    pub target: PaintTarget,
}

/// A position in a quadrant chain: the virtual list head or an arena node.
#[derive(Debug, Clone, Copy)]
enum Link {
    Head,
    Node(PaintIndex),
}

/// Paint session for one 32-pixel column.
pub struct PaintSession<'a> {
    dpi: Dpi,
    atlas: &'a dyn SpriteAtlas,
    rotation: Rotation,
    flags: ViewportFlags,
    entries: Vec<PaintEntry>,
    quadrants: [Option<PaintIndex>; MAX_PAINT_QUADRANTS],
    quadrant_back_index: u32,
    quadrant_front_index: u32,
    /// The most recent root primitive, target of child/attach calls.
    last_root: Option<PaintIndex>,
    /// The most recent attachment, target of attach-chaining.
    last_attach: Option<PaintIndex>,
    text_head: Option<PaintIndex>,
    text_tail: Option<PaintIndex>,
    arranged_head: Option<PaintIndex>,
    /// World position primitives are submitted relative to.
    pub sprite_position: CoordsXY,
    /// Tile the dispatcher is currently walking.
    pub map_position: CoordsXY,
    pub interaction_item: InteractionItem,
    pub current_target: PaintTarget,
    pub supports: SupportState,
}

impl<'a> PaintSession<'a> {
    pub fn new(dpi: Dpi, atlas: &'a dyn SpriteAtlas, frame: FrameState, flags: ViewportFlags) -> Self {
        Self {
            dpi,
            atlas,
            rotation: frame.rotation,
            flags,
            entries: Vec::new(),
            quadrants: [None; MAX_PAINT_QUADRANTS],
            quadrant_back_index: u32::MAX,
            quadrant_front_index: 0,
            last_root: None,
            last_attach: None,
            text_head: None,
            text_tail: None,
            arranged_head: None,
            sprite_position: CoordsXY::default(),
            map_position: CoordsXY::default(),
            interaction_item: InteractionItem::None,
            current_target: PaintTarget::None,
            supports: SupportState::new(),
        }
    }

    pub const fn dpi(&self) -> &Dpi {
        &self.dpi
    }

    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub const fn flags(&self) -> ViewportFlags {
        self.flags
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // ---- Arena access ----

    fn prim(&self, idx: PaintIndex) -> &PaintStruct {
        match &self.entries[idx.0 as usize] {
            PaintEntry::Primitive(ps) => ps,
            _ => unreachable!("paint index is not a primitive"),
        }
    }

    fn prim_mut(&mut self, idx: PaintIndex) -> &mut PaintStruct {
        match &mut self.entries[idx.0 as usize] {
            PaintEntry::Primitive(ps) => ps,
            _ => unreachable!("paint index is not a primitive"),
        }
    }

    fn attached(&self, idx: PaintIndex) -> &AttachedStruct {
        match &self.entries[idx.0 as usize] {
            PaintEntry::Attached(a) => a,
            _ => unreachable!("paint index is not an attachment"),
        }
    }

    fn attached_mut(&mut self, idx: PaintIndex) -> &mut AttachedStruct {
        match &mut self.entries[idx.0 as usize] {
            PaintEntry::Attached(a) => a,
            _ => unreachable!("paint index is not an attachment"),
        }
    }

    fn text(&self, idx: PaintIndex) -> &TextStruct {
        match &self.entries[idx.0 as usize] {
            PaintEntry::Text(t) => t,
            _ => unreachable!("paint index is not a text entry"),
        }
    }

    fn text_mut(&mut self, idx: PaintIndex) -> &mut TextStruct {
        match &mut self.entries[idx.0 as usize] {
            PaintEntry::Text(t) => t,
            _ => unreachable!("paint index is not a text entry"),
        }
    }

    fn has_free_entry(&self) -> bool {
        self.entries.len() < MAX_PAINT_ENTRIES - 1
    }

    fn push_entry(&mut self, entry: PaintEntry) -> PaintIndex {
        let idx = PaintIndex(self.entries.len() as u32);
        self.entries.push(entry);
        idx
    }

    fn link_next(&self, link: Link) -> Option<PaintIndex> {
        match link {
            Link::Head => self.arranged_head,
            Link::Node(idx) => self.prim(idx).next_quadrant,
        }
    }

    fn set_link_next(&mut self, link: Link, next: Option<PaintIndex>) {
        match link {
            Link::Head => self.arranged_head = next,
            Link::Node(idx) => self.prim_mut(idx).next_quadrant = next,
        }
    }

    // ---- Primitive submission ----

    fn sprite_visible(&self, image: ImageId, anchor: ScreenCoords) -> bool {
        let ext = self.atlas.extent(image.index());
        let left = anchor.x + ext.x_offset;
        let bottom = anchor.y + ext.y_offset;
        let right = left + ext.width;
        let top = bottom + ext.height;
        right > self.dpi.x
            && top > self.dpi.y
            && left < self.dpi.right()
            && bottom < self.dpi.bottom()
    }

    fn new_struct(&self, image: ImageId, anchor: ScreenCoords, bounds: BoundBox) -> PaintStruct {
        PaintStruct {
            image,
            x: anchor.x,
            y: anchor.y,
            bounds,
            item: self.interaction_item,
            map_pos: self.map_position,
            target: self.current_target,
            quadrant_index: 0,
            quadrant_flags: 0,
            next_quadrant: None,
            children: None,
            attached: None,
        }
    }

    fn add_to_quadrant(&mut self, idx: PaintIndex, position_hash: i32) {
        let quadrant = (position_hash / 32).clamp(0, MAX_PAINT_QUADRANTS as i32 - 1) as u32;
        let head = self.quadrants[quadrant as usize];
        let ps = self.prim_mut(idx);
        ps.quadrant_index = quadrant;
        ps.next_quadrant = head;
        self.quadrants[quadrant as usize] = Some(idx);
        self.quadrant_back_index = self.quadrant_back_index.min(quadrant);
        self.quadrant_front_index = self.quadrant_front_index.max(quadrant);
    }

    /// Per-rotation decrement of the bound-box extents, applied before the
    /// extents are un-rotated into the world frame.
    fn decrement_bound_size(rotation: Rotation, size: &mut CoordsXY) {
        match rotation {
            Rotation::R0 => {
                size.x -= 1;
                size.y -= 1;
            }
            Rotation::R1 => size.x -= 1,
            Rotation::R2 => {}
            Rotation::R3 => size.y -= 1,
        }
    }

    /// Submit a primitive whose bound box starts at its own offset.
    ///
    /// Silently drops the primitive when the arena is full or the sprite
    /// cannot touch the current column.
    pub fn add_primitive(
        &mut self,
        image: ImageId,
        offset: CoordsXYZ,
        bound_size: CoordsXYZ,
    ) -> Option<PaintIndex> {
        self.last_root = None;
        self.last_attach = None;
        if !self.has_free_entry() {
            return None;
        }

        let rotation = self.rotation;
        let inverse = INVERSE_ROTATION[rotation.as_u8() as usize];

        let mut bound = CoordsXY::new(bound_size.x, bound_size.y);
        Self::decrement_bound_size(rotation, &mut bound);
        let coord = CoordsXY::new(offset.x, offset.y).rotated(inverse);
        let bound = bound.rotated(inverse);
        let coord = CoordsXY::new(
            coord.x + self.sprite_position.x,
            coord.y + self.sprite_position.y,
        );

        let bounds = BoundBox {
            x: coord.x,
            y: coord.y,
            z: offset.z,
            x_end: coord.x + bound.x,
            y_end: coord.y + bound.y,
            z_end: offset.z + bound_size.z,
        };

        let anchor = project(coord.with_z(offset.z), rotation);
        if !self.sprite_visible(image, anchor) {
            return None;
        }

        let ps = self.new_struct(image, anchor, bounds);
        let idx = self.push_entry(PaintEntry::Primitive(ps));
        self.last_root = Some(idx);

        let position_hash = match rotation {
            Rotation::R0 => coord.y + coord.x,
            Rotation::R1 => coord.y - coord.x + 0x2000,
            Rotation::R2 => -(coord.y + coord.x) + 0x4000,
            Rotation::R3 => coord.x - coord.y + 0x2000,
        };
        self.add_to_quadrant(idx, position_hash);
        Some(idx)
    }

    /// Shared rotation/projection/visibility path for the bounded variants.
    fn build_bounded(
        &self,
        image: ImageId,
        offset: CoordsXYZ,
        bound_size: CoordsXYZ,
        bound_offset: CoordsXYZ,
    ) -> Option<(ScreenCoords, BoundBox)> {
        let rotation = self.rotation;
        let inverse = INVERSE_ROTATION[rotation.as_u8() as usize];

        let coord = CoordsXY::new(offset.x, offset.y).rotated(inverse);
        let coord = CoordsXY::new(
            coord.x + self.sprite_position.x,
            coord.y + self.sprite_position.y,
        );
        let anchor = project(coord.with_z(offset.z), rotation);
        if !self.sprite_visible(image, anchor) {
            return None;
        }

        let mut size = CoordsXY::new(bound_size.x, bound_size.y);
        Self::decrement_bound_size(rotation, &mut size);
        let size = size.rotated(inverse);
        let bb_offset = CoordsXY::new(bound_offset.x, bound_offset.y).rotated(inverse);

        let bounds = BoundBox {
            x: bb_offset.x + self.sprite_position.x,
            y: bb_offset.y + self.sprite_position.y,
            z: bound_offset.z,
            x_end: size.x + bb_offset.x + self.sprite_position.x,
            y_end: size.y + bb_offset.y + self.sprite_position.y,
            z_end: bound_offset.z + bound_size.z,
        };
        Some((anchor, bounds))
    }

    /// Submit a primitive with an independent bound-box offset; bucketed by
    /// the rotated bound-box origin.
    pub fn add_primitive_with_bounds(
        &mut self,
        image: ImageId,
        offset: CoordsXYZ,
        bound_size: CoordsXYZ,
        bound_offset: CoordsXYZ,
    ) -> Option<PaintIndex> {
        self.last_root = None;
        self.last_attach = None;
        if !self.has_free_entry() {
            return None;
        }
        let (anchor, bounds) = self.build_bounded(image, offset, bound_size, bound_offset)?;
        let ps = self.new_struct(image, anchor, bounds);
        let idx = self.push_entry(PaintEntry::Primitive(ps));
        self.last_root = Some(idx);

        let rotation = self.rotation;
        let attach = CoordsXY::new(bounds.x, bounds.y).rotated(rotation.as_u8());
        let bias = match rotation {
            Rotation::R0 => 0,
            Rotation::R1 | Rotation::R3 => 0x2000,
            Rotation::R2 => 0x4000,
        };
        self.add_to_quadrant(idx, attach.x + bias + attach.y);
        Some(idx)
    }

    /// Submit a primitive that joins no quadrant chain; drawn only as a
    /// child or attachment target.
    pub fn add_orphan(
        &mut self,
        image: ImageId,
        offset: CoordsXYZ,
        bound_size: CoordsXYZ,
        bound_offset: CoordsXYZ,
    ) -> Option<PaintIndex> {
        self.last_root = None;
        self.last_attach = None;
        if !self.has_free_entry() {
            return None;
        }
        let (anchor, bounds) = self.build_bounded(image, offset, bound_size, bound_offset)?;
        let ps = self.new_struct(image, anchor, bounds);
        let idx = self.push_entry(PaintEntry::Primitive(ps));
        self.last_root = Some(idx);
        Some(idx)
    }

    /// Submit a continuation of the previous primitive: drawn immediately
    /// after it, never re-bucketed. Falls back to a bounded primitive when
    /// there is no previous one.
    pub fn add_child(
        &mut self,
        image: ImageId,
        offset: CoordsXYZ,
        bound_size: CoordsXYZ,
        bound_offset: CoordsXYZ,
    ) -> Option<PaintIndex> {
        let Some(parent) = self.last_root else {
            return self.add_primitive_with_bounds(image, offset, bound_size, bound_offset);
        };
        if !self.has_free_entry() {
            return None;
        }
        let (anchor, bounds) = self.build_bounded(image, offset, bound_size, bound_offset)?;
        let ps = self.new_struct(image, anchor, bounds);
        let idx = self.push_entry(PaintEntry::Primitive(ps));
        self.prim_mut(parent).children = Some(idx);
        self.last_root = Some(idx);
        Some(idx)
    }

    /// Glue a sprite to the last primitive at a local offset. New
    /// attachments are prepended to the primitive's chain.
    pub fn attach_to_previous_primitive(&mut self, image: ImageId, x: i32, y: i32) -> bool {
        if !self.has_free_entry() {
            return false;
        }
        let Some(master) = self.last_root else {
            return false;
        };
        let old_first = self.prim(master).attached;
        let idx = self.push_entry(PaintEntry::Attached(AttachedStruct {
            image,
            x,
            y,
            next: old_first,
        }));
        self.prim_mut(master).attached = Some(idx);
        self.last_attach = Some(idx);
        true
    }

    /// Chain a sprite after the most recent attachment (appended, unlike
    /// [`Self::attach_to_previous_primitive`] which prepends).
    pub fn attach_to_previous_attachment(&mut self, image: ImageId, x: i32, y: i32) -> bool {
        let Some(previous) = self.last_attach else {
            return self.attach_to_previous_primitive(image, x, y);
        };
        if !self.has_free_entry() {
            return false;
        }
        let idx = self.push_entry(PaintEntry::Attached(AttachedStruct {
            image,
            x,
            y,
            next: None,
        }));
        self.attached_mut(previous).next = Some(idx);
        self.last_attach = Some(idx);
        true
    }

    /// Queue a floating text label at the current sprite position. Labels
    /// form a FIFO chain drawn after the sprite composite.
    pub fn add_floating_text(&mut self, text: String, z: i32, offset_x: i32) {
        if !self.has_free_entry() {
            return;
        }
        let anchor = project(self.sprite_position.with_z(z), self.rotation);
        let idx = self.push_entry(PaintEntry::Text(TextStruct {
            text,
            x: anchor.x + offset_x,
            y: anchor.y,
            next: None,
        }));
        match self.text_tail {
            Some(tail) => self.text_mut(tail).next = Some(idx),
            None => self.text_head = Some(idx),
        }
        self.text_tail = Some(idx);
    }

    // ---- Arrangement ----

    /// Concatenate quadrant chains back-to-front and reorder neighbouring
    /// quadrants where bound boxes demand it. Must run before
    /// [`Self::draw`] or [`Self::pick`].
    pub fn arrange(&mut self) {
        self.arranged_head = None;
        let mut quadrant_index = self.quadrant_back_index;
        if quadrant_index == u32::MAX {
            return;
        }

        let mut tail = Link::Head;
        loop {
            if let Some(first) = self.quadrants[quadrant_index as usize] {
                self.set_link_next(tail, Some(first));
                let mut node = first;
                while let Some(next) = self.prim(node).next_quadrant {
                    node = next;
                }
                tail = Link::Node(node);
            }
            quadrant_index += 1;
            if quadrant_index > self.quadrant_front_index {
                break;
            }
        }

        let mut cache = self.arrange_helper(Link::Head, self.quadrant_back_index, QF_NEXT);
        let mut quadrant_index = self.quadrant_back_index;
        loop {
            quadrant_index += 1;
            if quadrant_index >= self.quadrant_front_index {
                break;
            }
            cache = self.arrange_helper(cache, quadrant_index, 0);
        }
    }

    /// One pass of the quadrant-flag reorder over the chain starting after
    /// `start`. Returns the position the next pass should start from.
    fn arrange_helper(&mut self, start: Link, quadrant_index: u32, flag: u8) -> Link {
        // Skip chains entirely behind this quadrant.
        let mut ps = start;
        loop {
            let Some(next) = self.link_next(ps) else {
                return ps;
            };
            if quadrant_index > self.prim(next).quadrant_index {
                ps = Link::Node(next);
            } else {
                break;
            }
        }

        let ps_cache = ps;

        // Flag this quadrant, the next one, and the first node beyond.
        let mut cur = ps;
        loop {
            let Some(next) = self.link_next(cur) else {
                break;
            };
            let qi = self.prim(next).quadrant_index;
            if qi > quadrant_index + 1 {
                self.prim_mut(next).quadrant_flags = QF_BIGGER;
                break;
            } else if qi == quadrant_index + 1 {
                self.prim_mut(next).quadrant_flags = QF_NEXT | QF_IDENTICAL;
            } else if qi == quadrant_index {
                self.prim_mut(next).quadrant_flags = flag | QF_IDENTICAL;
            }
            cur = Link::Node(next);
        }

        let rotation = self.rotation;
        let mut ps = ps_cache;
        loop {
            // Advance to the next node still flagged for comparison.
            let pivot;
            loop {
                match self.link_next(ps) {
                    None => return ps_cache,
                    Some(next) => {
                        let f = self.prim(next).quadrant_flags;
                        if f & QF_BIGGER != 0 {
                            return ps_cache;
                        }
                        if f & QF_IDENTICAL != 0 {
                            pivot = next;
                            break;
                        }
                        ps = Link::Node(next);
                    }
                }
            }

            self.prim_mut(pivot).quadrant_flags &= !QF_IDENTICAL;
            let anchor = ps;
            let initial = self.prim(pivot).bounds;

            // Pull forward every later neighbour the pivot must draw above.
            let mut prev = Link::Node(pivot);
            let mut cur = self.prim(pivot).next_quadrant;
            while let Some(node) = cur {
                let f = self.prim(node).quadrant_flags;
                if f & QF_BIGGER != 0 {
                    break;
                }
                if f & QF_NEXT == 0 {
                    prev = Link::Node(node);
                    cur = self.prim(node).next_quadrant;
                    continue;
                }
                let current = self.prim(node).bounds;
                if is_bbox_intersecting(rotation, &initial, &current) {
                    let after_node = self.prim(node).next_quadrant;
                    self.set_link_next(prev, after_node);
                    let after_anchor = self.link_next(anchor);
                    self.set_link_next(anchor, Some(node));
                    self.prim_mut(node).next_quadrant = after_anchor;
                    cur = self.link_next(prev);
                } else {
                    prev = Link::Node(node);
                    cur = self.prim(node).next_quadrant;
                }
            }

            ps = anchor;
        }
    }

    // ---- Drawing ----

    fn decimated_position(&self, ps: &PaintStruct) -> (i32, i32) {
        let (mut x, mut y) = (ps.x, ps.y);
        if ps.item == InteractionItem::Entity && self.dpi.zoom.get() >= 1 {
            x = floor2(x, 2);
            y = floor2(y, 2);
            if self.dpi.zoom.get() >= 2 {
                x = floor2(x, 4);
                y = floor2(y, 4);
            }
        }
        (x, y)
    }

    /// Draw the arranged composite: quadrant chains front-to-back of the
    /// arranged order, children right after their parent, the final node's
    /// attachments after that.
    pub fn draw(&self, backend: &mut dyn PaintBackend) -> Result<()> {
        let Some(head) = self.arranged_head else {
            return Ok(());
        };
        let mut chain_node = head;
        let mut cur = Some(head);
        while let Some(idx) = cur {
            let ps = self.prim(idx);
            let (x, y) = self.decimated_position(ps);
            let image = colourify_image(ps.image, ps.item, self.flags);
            backend.draw_sprite(&self.dpi, image, x, y)?;

            if let Some(child) = ps.children {
                cur = Some(child);
            } else {
                self.draw_attached(backend, idx)?;
                cur = self.prim(chain_node).next_quadrant;
                if let Some(next) = cur {
                    chain_node = next;
                }
            }
        }
        Ok(())
    }

    fn draw_attached(&self, backend: &mut dyn PaintBackend, idx: PaintIndex) -> Result<()> {
        let ps = self.prim(idx);
        let mut cur = ps.attached;
        while let Some(a_idx) = cur {
            let a = self.attached(a_idx);
            let image = colourify_image(a.image, ps.item, self.flags);
            backend.draw_sprite(&self.dpi, image, a.x + ps.x, a.y + ps.y)?;
            cur = a.next;
        }
        Ok(())
    }

    /// Draw the floating text chain on a zoom-cropped surface.
    pub fn draw_floating_text(&self, backend: &mut dyn PaintBackend) -> Result<()> {
        if self.text_head.is_none() {
            return Ok(());
        }
        let cropped = self.dpi.cropped_by_zoom();
        let mut cur = self.text_head;
        while let Some(idx) = cur {
            let t = self.text(idx);
            backend.draw_text(&cropped, &t.text, t.x, t.y)?;
            cur = t.next;
        }
        Ok(())
    }

    // ---- Picking ----

    fn sprite_hit(&self, image: ImageId, x: i32, y: i32) -> bool {
        let ext = self.atlas.extent(image.index());
        let left = x + ext.x_offset;
        let top = y + ext.y_offset;
        self.dpi.x >= left
            && self.dpi.x < left + ext.width
            && self.dpi.y >= top
            && self.dpi.y < top + ext.height
    }

    /// Walk the arranged composite and report the front-most primitive
    /// under the session's 1x1 window that the mask admits.
    ///
    /// Labels are never pickable, matching the original traversal.
    pub fn pick(&self, mask: InteractionMask) -> PickResult {
        let mut info = PickResult::default();
        let Some(head) = self.arranged_head else {
            return info;
        };
        let mut chain_node = head;
        let mut cur = Some(head);
        while let Some(idx) = cur {
            let ps = self.prim(idx);
            let (x, y) = self.decimated_position(ps);
            if ps.item != InteractionItem::None
                && ps.item != InteractionItem::Label
                && mask.allows(ps.item)
                && self.sprite_hit(ps.image, x, y)
            {
                info = PickResult {
                    item: ps.item,
                    map_pos: ps.map_pos,
                    target: ps.target,
                };
            }

            if let Some(child) = self.prim(idx).children {
                cur = Some(child);
            } else {
                cur = self.prim(chain_node).next_quadrant;
                if let Some(next) = cur {
                    chain_node = next;
                }
            }
        }
        info
    }
}

/// Apply the see-through / underground recolour rules to an image.
///
/// Idempotent: the substitution carries the transparency bit, which blocks
/// a second substitution.
pub fn colourify_image(image: ImageId, item: InteractionItem, flags: ViewportFlags) -> ImageId {
    let mut image = image;
    if flags.contains(ViewportFlags::SEETHROUGH_RIDES) && item == InteractionItem::Ride {
        image = image.with_see_through();
    }
    if flags.contains(ViewportFlags::UNDERGROUND_INSIDE) && item == InteractionItem::Wall {
        image = image.with_see_through();
    }
    if flags.contains(ViewportFlags::SEETHROUGH_PATHS)
        && matches!(
            item,
            InteractionItem::Footpath | InteractionItem::FootpathItem | InteractionItem::Banner
        )
    {
        image = image.with_see_through();
    }
    if flags.contains(ViewportFlags::SEETHROUGH_SCENERY)
        && matches!(
            item,
            InteractionItem::Scenery | InteractionItem::LargeScenery | InteractionItem::Wall
        )
    {
        image = image.with_see_through();
    }
    image
}

/// Whether `initial` must draw above `current`, given that `current` sits in
/// the neighbouring quadrant. Four hand-written tests, one per rotation.
fn is_bbox_intersecting(rotation: Rotation, initial: &BoundBox, current: &BoundBox) -> bool {
    match rotation {
        Rotation::R0 => {
            initial.z_end >= current.z
                && initial.y_end >= current.y
                && initial.x_end >= current.x
                && !(initial.z < current.z_end
                    && initial.y < current.y_end
                    && initial.x < current.x_end)
        }
        Rotation::R1 => {
            initial.z_end >= current.z
                && initial.y_end >= current.y
                && initial.x_end < current.x
                && !(initial.z < current.z_end
                    && initial.y < current.y_end
                    && initial.x >= current.x_end)
        }
        Rotation::R2 => {
            initial.z_end >= current.z
                && initial.y_end < current.y
                && initial.x_end < current.x
                && !(initial.z < current.z_end
                    && initial.y >= current.y_end
                    && initial.x >= current.x_end)
        }
        Rotation::R3 => {
            initial.z_end >= current.z
                && initial.y_end < current.y
                && initial.x_end >= current.x
                && !(initial.z < current.z_end
                    && initial.y >= current.y_end
                    && initial.x < current.x_end)
        }
    }
}
