// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Character-cell text primitives.

use alloc::vec;
use alloc::vec::Vec;

use crate::bitmap::Bitmap;
use crate::color::Color;

/// Cell width and height in pixels.
pub const CELL_SIZE: i32 = 8;

const BACKSPACE: u8 = 0x08;
const LINE_FEED: u8 = 0x0A;
const FORM_FEED: u8 = 0x0C;
const CARRIAGE_RETURN: u8 = 0x0D;
const BLANK: u8 = b' ';

/// A grid of 8×8 character cells drawn in one foreground and one
/// background color.
///
/// Glyphs are defined by the command stream, one byte per pixel row with the
/// most significant bit leftmost. Codes without a glyph render as
/// background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    columns: u16,
    rows: u16,
    cells: Vec<u8>,
    glyphs: Vec<Option<[u8; 8]>>,
    cursor: (u16, u16),
    fg: Color,
    bg: Color,
}

impl Terminal {
    /// Creates a blank terminal with the cursor at the top left.
    #[must_use]
    pub fn new(columns: u16, rows: u16, fg: Color, bg: Color) -> Self {
        Self {
            columns,
            rows,
            cells: vec![BLANK; usize::from(columns) * usize::from(rows)],
            glyphs: vec![None; 256],
            cursor: (0, 0),
            fg,
            bg,
        }
    }

    /// Size in pixels.
    #[must_use]
    pub fn pixel_size(&self) -> (i32, i32) {
        (
            i32::from(self.columns) * CELL_SIZE,
            i32::from(self.rows) * CELL_SIZE,
        )
    }

    /// Cursor `(column, row)`.
    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// The character code in a cell.
    #[must_use]
    pub fn cell(&self, column: u16, row: u16) -> Option<u8> {
        (column < self.columns && row < self.rows)
            .then(|| self.cells[usize::from(row) * usize::from(self.columns) + usize::from(column)])
    }

    /// Defines the glyph for `code`.
    pub fn define_glyph(&mut self, code: u8, rows: [u8; 8]) {
        self.glyphs[usize::from(code)] = Some(rows);
    }

    /// Moves the cursor; returns `false` outside the grid.
    pub fn set_cursor(&mut self, column: u16, row: u16) -> bool {
        if column < self.columns && row < self.rows {
            self.cursor = (column, row);
            true
        } else {
            false
        }
    }

    /// Applies one byte of text. Returns whether any cell changed.
    ///
    /// Printable ASCII is written at the cursor, which then advances,
    /// wrapping at the right edge and scrolling at the bottom. Backspace,
    /// line feed, carriage return and form feed move the cursor (form feed
    /// also clears). Other bytes are ignored.
    pub fn write(&mut self, byte: u8) -> bool {
        if self.columns == 0 || self.rows == 0 {
            return false;
        }
        match byte {
            0x20..=0x7E => {
                let (col, row) = self.cursor;
                let i = usize::from(row) * usize::from(self.columns) + usize::from(col);
                self.cells[i] = byte;
                if col + 1 >= self.columns {
                    self.cursor.0 = 0;
                    self.line_feed();
                } else {
                    self.cursor.0 = col + 1;
                }
                true
            }
            BACKSPACE => {
                self.cursor.0 = self.cursor.0.saturating_sub(1);
                false
            }
            LINE_FEED => self.line_feed(),
            CARRIAGE_RETURN => {
                self.cursor.0 = 0;
                false
            }
            FORM_FEED => {
                self.cells.fill(BLANK);
                self.cursor = (0, 0);
                true
            }
            _ => false,
        }
    }

    /// Advances to the next row, scrolling when already on the last one.
    fn line_feed(&mut self) -> bool {
        if self.cursor.1 + 1 < self.rows {
            self.cursor.1 += 1;
            return false;
        }
        let w = usize::from(self.columns);
        self.cells.copy_within(w.., 0);
        let len = self.cells.len();
        self.cells[len - w..].fill(BLANK);
        true
    }

    /// Renders the cells into a bitmap of foreground and background bytes.
    ///
    /// Returns `None` when the grid is too large for a bitmap.
    #[must_use]
    pub fn rasterize(&self) -> Option<Bitmap> {
        let (w, h) = self.pixel_size();
        let (bw, bh) = (u16::try_from(w).ok()?, u16::try_from(h).ok()?);
        let mut pixels = vec![self.bg.0; usize::from(bw) * usize::from(bh)];
        let cols = usize::from(self.columns);
        for (cell_i, &code) in self.cells.iter().enumerate() {
            let Some(glyph) = self.glyphs[usize::from(code)] else {
                continue;
            };
            let (cx, cy) = (cell_i % cols * 8, cell_i / cols * 8);
            for (gy, bits) in glyph.iter().enumerate() {
                let start = (cy + gy) * usize::from(bw) + cx;
                for (gx, px) in pixels[start..start + 8].iter_mut().enumerate() {
                    if bits & (0x80 >> gx) != 0 {
                        *px = self.fg.0;
                    }
                }
            }
        }
        Some(Bitmap::from_pixels(bw, bh, pixels))
    }
}
