// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed colors, opacity levels and blending.
//!
//! A wire color is one byte laid out as `AA_BBGGRR`: the top two bits select
//! one of four [`Opacity`] levels and the low six bits are the residual color,
//! two bits per channel. Scan-out pixels use the same low six bits; the top two
//! bits of a pixel carry the hardware sync levels (see
//! [`DisplayConfig::sync_bits`](crate::display::DisplayConfig::sync_bits)),
//! which painters always rewrite and never blend.

use core::fmt;

/// One byte of scan-out memory.
pub type Pixel = u8;

/// Mask for the six color bits of a [`Color`] or [`Pixel`].
pub const RGB_MASK: u8 = 0x3F;

/// Mask for the two opacity bits of a [`Color`].
pub const OPACITY_MASK: u8 = 0xC0;

/// Coverage level encoded in the top two bits of a [`Color`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opacity {
    /// 25% source, 75% destination.
    Quarter,
    /// 50% source, 50% destination.
    Half,
    /// 75% source, 25% destination.
    ThreeQuarters,
    /// Source overwrites destination.
    Opaque,
}

impl Opacity {
    /// Decodes the two opacity bits (`0..=3`).
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::Quarter,
            1 => Self::Half,
            2 => Self::ThreeQuarters,
            _ => Self::Opaque,
        }
    }

    /// Returns the two-bit wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Quarter => 0,
            Self::Half => 1,
            Self::ThreeQuarters => 2,
            Self::Opaque => 3,
        }
    }

    /// Source weight out of four.
    #[must_use]
    pub const fn weight(self) -> u8 {
        self.code() + 1
    }

    /// Whether pixels at this level overwrite the destination.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        matches!(self, Self::Opaque)
    }
}

/// A packed `opacity:2 | color:6` color byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u8);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self(0xC0);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFF);

    /// Builds a color from an opacity level and six color bits.
    #[must_use]
    pub const fn new(opacity: Opacity, rgb: u8) -> Self {
        Self((opacity.code() << 6) | (rgb & RGB_MASK))
    }

    /// Builds an opaque color from two-bit channel values.
    #[must_use]
    pub const fn opaque_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(Opacity::Opaque, ((b & 3) << 4) | ((g & 3) << 2) | (r & 3))
    }

    /// The opacity level.
    #[must_use]
    pub const fn opacity(self) -> Opacity {
        Opacity::from_code(self.0 >> 6)
    }

    /// The residual six color bits with opacity stripped.
    #[must_use]
    pub const fn rgb(self) -> u8 {
        self.0 & RGB_MASK
    }

    /// The scan-out pixel for this color under the given sync bits.
    #[must_use]
    pub const fn to_pixel(self, sync_bits: u8) -> Pixel {
        self.rgb() | (sync_bits & OPACITY_MASK)
    }

    /// The scan-out pixel replicated into all four bytes of a word.
    #[must_use]
    pub const fn replicated_word(self, sync_bits: u8) -> u32 {
        u32::from_ne_bytes([self.to_pixel(sync_bits); 4])
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({:?}, {:#04x})", self.opacity(), self.rgb())
    }
}

/// Blends six color bits `src` over the color bits of `dst` at `opacity`.
///
/// Each two-bit channel is mixed as `(src * w + dst * (4 - w) + 2) / 4`.
/// Blending a color over itself yields the same color. The sync bits of the
/// result are taken from `sync_bits`.
#[must_use]
pub const fn blend(src: u8, dst: Pixel, opacity: Opacity, sync_bits: u8) -> Pixel {
    let w = opacity.weight() as u16;
    let mut out = 0_u8;
    let mut shift = 0;
    while shift < 6 {
        let s = ((src >> shift) & 3) as u16;
        let d = ((dst >> shift) & 3) as u16;
        let mixed = (s * w + d * (4 - w) + 2) / 4;
        out |= ((mixed as u8) & 3) << shift;
        shift += 2;
    }
    out | (sync_bits & OPACITY_MASK)
}

/// A precomputed blend of one source color over every destination color.
#[derive(Clone, PartialEq, Eq)]
pub struct BlendTable {
    out: [Pixel; 64],
}

impl BlendTable {
    /// Bakes the table for `color` at its own opacity.
    #[must_use]
    pub fn new(color: Color, sync_bits: u8) -> Self {
        let mut out = [0; 64];
        for (dst, slot) in (0_u8..).zip(out.iter_mut()) {
            *slot = blend(color.rgb(), dst, color.opacity(), sync_bits);
        }
        Self { out }
    }

    /// Looks up the blended result for a destination pixel.
    #[inline]
    #[must_use]
    pub fn apply(&self, dst: Pixel) -> Pixel {
        self.out[usize::from(dst & RGB_MASK)]
    }
}

impl fmt::Debug for BlendTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendTable").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_round_trips_through_color() {
        for code in 0..4 {
            let c = Color::new(Opacity::from_code(code), 0x2A);
            assert_eq!(c.opacity().code(), code);
            assert_eq!(c.rgb(), 0x2A);
        }
    }

    #[test]
    fn blend_over_self_is_identity() {
        for rgb in 0..64 {
            for code in 0..4 {
                let opacity = Opacity::from_code(code);
                assert_eq!(blend(rgb, rgb, opacity, 0), rgb, "rgb {rgb:#x} code {code}");
            }
        }
    }

    #[test]
    fn opaque_blend_overwrites() {
        assert_eq!(blend(0x15, 0x2A, Opacity::Opaque, 0), 0x15);
    }

    #[test]
    fn half_blend_mixes_channels() {
        // Red channel 3 over 0 at 50%: (6 + 0 + 2) / 4 = 2.
        assert_eq!(blend(0x03, 0x00, Opacity::Half, 0), 0x02);
        // Quarter: (3 + 0 + 2) / 4 = 1.
        assert_eq!(blend(0x03, 0x00, Opacity::Quarter, 0), 0x01);
    }

    #[test]
    fn sync_bits_are_rewritten() {
        assert_eq!(blend(0x01, 0xC1, Opacity::Half, 0x40), 0x41);
        assert_eq!(Color::WHITE.to_pixel(0x80), 0xBF);
    }

    #[test]
    fn blend_table_matches_blend() {
        let color = Color::new(Opacity::ThreeQuarters, 0x21);
        let table = BlendTable::new(color, 0xC0);
        for dst in 0..64 {
            assert_eq!(table.apply(dst), blend(0x21, dst, Opacity::ThreeQuarters, 0xC0));
        }
    }

    #[test]
    fn replicated_word_repeats_pixel() {
        let w = Color::opaque_rgb(1, 2, 3).replicated_word(0);
        assert_eq!(w.to_ne_bytes(), [0x39; 4]);
    }
}
