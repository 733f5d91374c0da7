//! Support segment bookkeeping: per-tile segment height ceilings, the
//! general support ceiling, and tunnel edge lists.
//!
//! A tile is divided into nine support segments: the center, the four
//! corners, and the four edge midpoints. Track painters record the height at
//! which each segment can accept a support column; the surface and support
//! painters read them back. The eight outer segments occupy the low byte of
//! the flag word in clockwise order so a quarter-turn rotation is a two-bit
//! rotate of that byte.

use bitflags::bitflags;

bitflags! {
    /// Tile support segments. Outer segments sit in the low byte in
    /// clockwise order starting at the north corner; center is bit 8.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Segments: u16 {
        const N_CORNER = 1 << 0;
        const NE_EDGE  = 1 << 1;
        const E_CORNER = 1 << 2;
        const SE_EDGE  = 1 << 3;
        const S_CORNER = 1 << 4;
        const SW_EDGE  = 1 << 5;
        const W_CORNER = 1 << 6;
        const NW_EDGE  = 1 << 7;
        const CENTER   = 1 << 8;
    }
}

impl Segments {
    pub const OUTER: Segments = Segments::from_bits_truncate(0x00FF);

    /// Rotate the segment set by quarter turns. The center is fixed; the
    /// outer ring rotates two bit positions per turn.
    pub const fn rotated(self, direction: u8) -> Segments {
        let outer = (self.bits() & 0xFF) as u8;
        let outer = outer.rotate_left(((direction & 3) * 2) as u32);
        Segments::from_bits_truncate((self.bits() & 0x100) | outer as u16)
    }
}

/// Height is in world z units; [`SEGMENT_HEIGHT_NONE`] means no ceiling has
/// been recorded for the segment.
pub const SEGMENT_HEIGHT_NONE: u16 = 0xFFFF;

/// Most tunnel entries one column edge can carry.
pub const TUNNEL_MAX_COUNT: usize = 64;

/// One segment's recorded support ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSupport {
    pub height: u16,
    pub slope: u8,
}

impl Default for SegmentSupport {
    fn default() -> Self {
        Self {
            height: 0,
            slope: 0,
        }
    }
}

/// The general (whole-tile) support ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneralSupport {
    pub height: u16,
    pub slope: u8,
}

/// A tunnel portal recorded on a tile edge. Heights are stored in 16-unit
/// steps, matching the wire encoding the portal sprites key off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelEntry {
    pub height: u8,
    pub kind: u8,
}

/// Per-tile support and tunnel state carried by the paint session.
#[derive(Debug, Clone, Default)]
pub struct SupportState {
    segments: [SegmentSupport; 9],
    pub general: GeneralSupport,
    pub left_tunnels: Vec<TunnelEntry>,
    pub right_tunnels: Vec<TunnelEntry>,
}

impl SupportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-tile state between tiles; tunnel lists persist for the
    /// whole column.
    pub fn reset_tile(&mut self) {
        self.segments = [SegmentSupport::default(); 9];
        self.general = GeneralSupport::default();
    }

    fn segment_slot(segment_bit: u16) -> usize {
        segment_bit.trailing_zeros() as usize
    }

    pub fn segment(&self, segment: Segments) -> SegmentSupport {
        self.segments[Self::segment_slot(segment.bits())]
    }

    /// Record a support ceiling on every segment in `segments`. The slope
    /// byte is only stored for real heights; clearing a segment with
    /// [`SEGMENT_HEIGHT_NONE`] leaves its slope untouched.
    pub fn set_segment_height(&mut self, segments: Segments, height: u16, slope: u8) {
        for bit in 0..9u16 {
            if segments.bits() & (1 << bit) != 0 {
                let slot = &mut self.segments[bit as usize];
                slot.height = height;
                if height != SEGMENT_HEIGHT_NONE {
                    slot.slope = slope;
                }
            }
        }
    }

    /// Lower the general support ceiling; a higher value than the current
    /// one is ignored.
    pub fn set_general_height(&mut self, height: u16, slope: u8) {
        if self.general.height >= height {
            self.general.height = height;
            self.general.slope = slope;
        }
    }

    /// Set the general support ceiling unconditionally.
    pub fn force_general_height(&mut self, height: u16, slope: u8) {
        self.general.height = height;
        self.general.slope = slope;
    }

    pub fn push_tunnel_left(&mut self, height: i32, kind: u8) {
        if self.left_tunnels.len() < TUNNEL_MAX_COUNT {
            self.left_tunnels.push(TunnelEntry {
                height: (height / 16) as u8,
                kind,
            });
        }
    }

    pub fn push_tunnel_right(&mut self, height: i32, kind: u8) {
        if self.right_tunnels.len() < TUNNEL_MAX_COUNT {
            self.right_tunnels.push(TunnelEntry {
                height: (height / 16) as u8,
                kind,
            });
        }
    }
}
