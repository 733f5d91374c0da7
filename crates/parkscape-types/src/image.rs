//! Palette/recolour-encoded sprite image identifiers.
//!
//! An image id packs a sprite index into the low 19 bits and recolour
//! information into the high bits. The layout is load-bearing: paint
//! callbacks OR palette bits in before submitting, and the compositor's
//! see-through substitution replaces the whole recolour prefix, so the bit
//! positions are kept exactly and wrapped behind named accessors.

/// Low 19 bits: the sprite index.
pub const IMAGE_INDEX_MASK: u32 = 0x7FFFF;

/// Primary-recolour flag bit.
pub const IMAGE_FLAG_REMAP: u32 = 1 << 29;

/// Translucency flag bit. Once set, the see-through substitution must not
/// be applied a second time.
pub const IMAGE_FLAG_TRANSPARENT: u32 = 1 << 30;

/// The full recolour prefix substituted in for see-through/underground
/// rendering: translucent, glassy palette.
pub const IMAGE_SEE_THROUGH_PREFIX: u32 = 0x4188_0000;

/// A palette/recolour-encoded sprite reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageId(pub u32);

impl ImageId {
    pub const fn new(index: u32) -> Self {
        Self(index & IMAGE_INDEX_MASK)
    }

    pub const fn index(self) -> u32 {
        self.0 & IMAGE_INDEX_MASK
    }

    pub const fn is_transparent(self) -> bool {
        self.0 & IMAGE_FLAG_TRANSPARENT != 0
    }

    pub const fn with_remap(self, palette: u32) -> Self {
        Self(self.0 | IMAGE_FLAG_REMAP | (palette << 19))
    }

    /// Replace the recolour prefix with the translucent see-through one.
    ///
    /// Idempotent: an id that already carries the transparency bit (whether
    /// from an earlier substitution or set upstream by a paint callback) is
    /// returned unchanged.
    pub const fn with_see_through(self) -> Self {
        if self.is_transparent() {
            self
        } else {
            Self((self.0 & IMAGE_INDEX_MASK) | IMAGE_SEE_THROUGH_PREFIX)
        }
    }
}
