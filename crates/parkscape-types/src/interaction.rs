//! Interaction item categories and hit-test eligibility masks.
//!
//! Every paint struct carries an [`InteractionItem`] tag. Hit-testing
//! filters candidates through an [`InteractionMask`], which is stored the
//! way the original stored it: a bit *set* in the mask means the category
//! is filtered out, and a candidate is eligible when its bit is clear.

/// Category tag for a painted primitive, used for hit-testing and for the
/// see-through/underground recolour rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum InteractionItem {
    #[default]
    None = 0,
    Terrain = 1,
    Entity = 2,
    Ride = 3,
    Water = 4,
    Scenery = 5,
    Footpath = 6,
    FootpathItem = 7,
    ParkEntrance = 8,
    Wall = 9,
    LargeScenery = 10,
    Label = 11,
    Banner = 12,
}

impl InteractionItem {
    /// The bit this category occupies in an [`InteractionMask`].
    ///
    /// Every category uses `1 << (item - 1)` except banner, which uses
    /// `1 << (item - 3)` -- a long-standing off-by-two in the original
    /// data that saved files and tools depend on, replicated rather than
    /// repaired. It makes banner share a bit with large scenery.
    pub const fn mask_bit(self) -> u16 {
        match self {
            InteractionItem::None => 0,
            InteractionItem::Banner => 1 << (InteractionItem::Banner as u16 - 3),
            other => 1 << (other as u16 - 1),
        }
    }
}

/// Hit-test eligibility filter. Set bits exclude categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionMask(pub u16);

impl InteractionMask {
    /// Everything eligible.
    pub const ALL: Self = Self(0);

    /// Nothing eligible.
    pub const NONE: Self = Self(0xFFFF);

    /// Build a mask that admits only the given categories.
    pub fn allowing(items: &[InteractionItem]) -> Self {
        let mut excluded = 0xFFFF;
        for item in items {
            excluded &= !item.mask_bit();
        }
        Self(excluded)
    }

    pub const fn allows(self, item: InteractionItem) -> bool {
        self.0 & item.mask_bit() == 0
    }
}
