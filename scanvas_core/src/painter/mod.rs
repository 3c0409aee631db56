// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiled per-primitive line painters.
//!
//! A primitive's geometry, color and pixel content are compiled once into a
//! [`PainterSet`]. Painting a scan line is then a table lookup and a call:
//! each [`CompiledPainter`] holds a per-row dispatch table into a small set
//! of deduplicated routines, one per distinct row shape.
//!
//! # Alignment phases
//!
//! Fills write whole 4-pixel words between a byte lead and tail. Where that
//! split falls depends on the primitive's x position modulo 4, its *phase*.
//! A painter is compiled for one phase and paints relative to the 4-aligned
//! base `origin.x - phase`:
//!
//! - [`ScrollMode::Stationary`] and [`ScrollMode::Coarse`] sets hold the
//!   phase the primitive had when compiled. Coarse scrollers move in 4-pixel
//!   steps, so the phase never changes and the set survives moves.
//! - [`ScrollMode::Fine`] sets hold all four phases, so any horizontal move
//!   finds a ready painter.
//!
//! A set is only reused across a move when the primitive was and stays fully
//! visible; clipped painters bake their window in.
//!
//! Painters copy everything they need at compile time (bitmap pixels are
//! shared copy-on-write), so editing a primitive never disturbs the painter
//! currently on screen. Regeneration swaps the whole set at once.

mod compile;
mod routine;

use alloc::vec::Vec;
use core::fmt;

use crate::bitmap::{Bitmap, PixelMode};
use crate::color::{Color, Pixel};
use crate::decompose::LineDetail;
use crate::geometry::{PixelRect, Point};
use crate::scene::PrimitiveFlags;

pub use compile::compile_set;

use routine::Routine;

/// How a primitive is expected to move horizontally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollMode {
    /// Not expected to move; one phase.
    Stationary,
    /// Moves in 4-pixel steps; one phase, reused across moves.
    Coarse,
    /// Moves in 1-pixel steps; all four phases.
    Fine,
}

impl ScrollMode {
    /// Derives the mode from primitive flags. Fine scrolling wins.
    #[must_use]
    pub fn from_flags(flags: PrimitiveFlags) -> Self {
        if flags.contains(PrimitiveFlags::H_SCROLL_1) {
            Self::Fine
        } else if flags.contains(PrimitiveFlags::H_SCROLL_4) {
            Self::Coarse
        } else {
            Self::Stationary
        }
    }

    /// Whether a set in this mode may outlive a move.
    #[must_use]
    pub fn survives_moves(self) -> bool {
        !matches!(self, Self::Stationary)
    }
}

/// The pixel source a painter is compiled from.
#[derive(Clone, Copy, Debug)]
pub enum PaintContent<'a> {
    /// Every pixel of the window in one color.
    Fill(Color),
    /// Decomposed line pieces in one color.
    Spans {
        /// Rows relative to the primitive origin.
        detail: &'a LineDetail,
        /// Color and opacity.
        color: Color,
    },
    /// An image anchored at the primitive origin.
    Image {
        /// The pixels.
        bitmap: &'a Bitmap,
        /// How they combine with the line.
        mode: PixelMode,
    },
}

/// Everything needed to compile one primitive's painters.
#[derive(Clone, Copy, Debug)]
pub struct PaintJob<'a> {
    /// Pixel source.
    pub content: PaintContent<'a>,
    /// Absolute origin of the primitive.
    pub origin: Point,
    /// Own width and height.
    pub size: (i32, i32),
    /// Visible part of the primitive, relative to `origin`.
    pub window: PixelRect,
    /// Which phases to compile.
    pub scroll: ScrollMode,
    /// Sync levels for the top pixel bits.
    pub sync_bits: u8,
}

impl PaintJob<'_> {
    /// Whether the whole primitive is visible.
    #[must_use]
    pub fn is_unclipped(&self) -> bool {
        self.window == PixelRect::new(0, 0, self.size.0, self.size.1)
    }
}

/// A painter for one alignment phase.
pub struct CompiledPainter {
    phase: u8,
    first_row: i32,
    table: Vec<Option<u16>>,
    routines: Vec<Routine>,
}

impl CompiledPainter {
    /// The origin x modulo 4 this painter assumes.
    #[must_use]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Number of distinct row routines.
    #[must_use]
    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }

    /// Number of rows that write anything.
    #[must_use]
    pub fn painted_rows(&self) -> usize {
        self.table.iter().flatten().count()
    }

    /// Paints row `row` (relative to the primitive origin) with the painter
    /// base at `base`. Rows the painter does not cover are left alone.
    #[inline]
    pub fn paint(&self, buf: &mut [Pixel], row: i32, base: i32) {
        let slot = row
            .checked_sub(self.first_row)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.table.get(i).copied().flatten());
        if let Some(r) = slot {
            (self.routines[usize::from(r)])(buf, base);
        }
    }
}

impl fmt::Debug for CompiledPainter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPainter")
            .field("phase", &self.phase)
            .field("first_row", &self.first_row)
            .field("rows", &self.table.len())
            .field("routines", &self.routines.len())
            .finish()
    }
}

/// The painters of one primitive, one per compiled phase.
#[derive(Debug)]
pub struct PainterSet {
    phases: [Option<CompiledPainter>; 4],
    size: (i32, i32),
    unclipped: bool,
    scroll: ScrollMode,
}

impl PainterSet {
    /// Paints scan line `line` of a primitive whose absolute origin is
    /// `origin`. Returns `false` when no painter exists for the origin's
    /// phase.
    #[inline]
    pub fn paint(&self, buf: &mut [Pixel], line: i32, origin: Point) -> bool {
        let phase = origin.x.rem_euclid(4);
        let Some(painter) = usize::try_from(phase)
            .ok()
            .and_then(|p| self.phases[p].as_ref())
        else {
            return false;
        };
        painter.paint(buf, line - origin.y, origin.x - phase);
        true
    }

    /// Whether a painter exists for `phase`.
    #[must_use]
    pub fn has_phase(&self, phase: i32) -> bool {
        usize::try_from(phase.rem_euclid(4)).is_ok_and(|p| self.phases[p].is_some())
    }

    /// Number of compiled phases.
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.iter().flatten().count()
    }

    /// Total routines across phases.
    #[must_use]
    pub fn routine_count(&self) -> usize {
        self.phases.iter().flatten().map(CompiledPainter::routine_count).sum()
    }

    /// The painter for `phase`, if compiled.
    #[must_use]
    pub fn painter(&self, phase: i32) -> Option<&CompiledPainter> {
        usize::try_from(phase.rem_euclid(4))
            .ok()
            .and_then(|p| self.phases[p].as_ref())
    }

    /// Whether this set can keep painting after the primitive moved to `x`
    /// with the given size and visibility.
    #[must_use]
    pub fn reusable_after_move(
        &self,
        size: (i32, i32),
        unclipped: bool,
        scroll: ScrollMode,
        x: i32,
    ) -> bool {
        scroll.survives_moves()
            && scroll == self.scroll
            && self.unclipped
            && unclipped
            && size == self.size
            && self.has_phase(x)
    }
}
