// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive flag bits.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Per-primitive behavior bits, laid out as on the wire.
///
/// [`DRAWABLE`](Self::DRAWABLE) is computed by the scene and stripped from
/// anything supplied by a caller.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PrimitiveFlags(u16);

impl PrimitiveFlags {
    /// No bits set.
    pub const NONE: Self = Self(0);
    /// The primitive paints its own pixels.
    pub const PAINT_SELF: Self = Self(0x0001);
    /// Descendants may paint.
    pub const PAINT_CHILDREN: Self = Self(0x0002);
    /// The incoming view rectangle is clipped to this primitive's rectangle.
    pub const CLIP_SELF: Self = Self(0x0004);
    /// Children are clipped to this primitive's rectangle.
    pub const CLIP_CHILDREN: Self = Self(0x0008);
    /// Compile all four alignment phases for 1-pixel horizontal scrolling.
    pub const H_SCROLL_1: Self = Self(0x0010);
    /// Moves in 4-pixel steps; one phase kept across moves.
    pub const H_SCROLL_4: Self = Self(0x0020);
    /// The position is absolute; the parent's offset is ignored.
    pub const ABSOLUTE: Self = Self(0x0040);
    /// Hint that the primitive holds translucent pixels.
    pub const BLENDED: Self = Self(0x0080);
    /// Computed: the primitive currently paints.
    pub const DRAWABLE: Self = Self(0x8000);

    /// Flags a freshly created visible primitive usually carries.
    pub const VISIBLE: Self = Self(0x0003);

    const WIRE_MASK: u16 = 0x00FF;

    /// Decodes caller-supplied bits, dropping computed and unknown ones.
    #[must_use]
    pub const fn from_wire(bits: u16) -> Self {
        Self(bits & Self::WIRE_MASK)
    }

    /// The raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns these flags with `other` set or cleared.
    #[must_use]
    pub const fn with(self, other: Self, on: bool) -> Self {
        if on {
            Self(self.0 | other.0)
        } else {
            Self(self.0 & !other.0)
        }
    }
}

impl BitOr for PrimitiveFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PrimitiveFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PrimitiveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(PrimitiveFlags, &str); 9] = [
            (PrimitiveFlags::PAINT_SELF, "PAINT_SELF"),
            (PrimitiveFlags::PAINT_CHILDREN, "PAINT_CHILDREN"),
            (PrimitiveFlags::CLIP_SELF, "CLIP_SELF"),
            (PrimitiveFlags::CLIP_CHILDREN, "CLIP_CHILDREN"),
            (PrimitiveFlags::H_SCROLL_1, "H_SCROLL_1"),
            (PrimitiveFlags::H_SCROLL_4, "H_SCROLL_4"),
            (PrimitiveFlags::ABSOLUTE, "ABSOLUTE"),
            (PrimitiveFlags::BLENDED, "BLENDED"),
            (PrimitiveFlags::DRAWABLE, "DRAWABLE"),
        ];
        f.write_str("PrimitiveFlags(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn wire_bits_cannot_set_drawable() {
        let flags = PrimitiveFlags::from_wire(0xFFFF);
        assert!(!flags.contains(PrimitiveFlags::DRAWABLE));
        assert!(flags.contains(PrimitiveFlags::BLENDED | PrimitiveFlags::PAINT_SELF));
    }

    #[test]
    fn debug_lists_names() {
        let flags = PrimitiveFlags::PAINT_SELF | PrimitiveFlags::ABSOLUTE;
        assert_eq!(format!("{flags:?}"), "PrimitiveFlags(PAINT_SELF | ABSOLUTE)");
    }

    #[test]
    fn with_toggles() {
        let flags = PrimitiveFlags::VISIBLE.with(PrimitiveFlags::PAINT_SELF, false);
        assert_eq!(flags, PrimitiveFlags::PAINT_CHILDREN);
    }
}
