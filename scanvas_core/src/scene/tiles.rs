// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile grids.

use alloc::vec;
use alloc::vec::Vec;

use crate::bitmap::{Bitmap, TRANSPARENT};
use crate::geometry::Point;

/// Map cell value for "no tile"; the cell stays transparent.
pub const NO_TILE: u16 = 0xFFFF;

/// A grid of cells, each naming one of a set of equally sized tile bitmaps.
///
/// A tile *array* shows the whole grid. A tile *map* shows a fixed-size
/// window onto the grid that wraps around at the grid edges and is panned
/// with [`set_offset`](Self::set_offset).
///
/// Tile bitmaps blend like transparent bitmaps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSet {
    columns: u16,
    rows: u16,
    tile_width: u16,
    tile_height: u16,
    cells: Vec<u16>,
    bitmaps: Vec<Bitmap>,
    offset: Point,
    view: Option<(i32, i32)>,
}

impl TileSet {
    /// A grid shown in full.
    #[must_use]
    pub fn array(columns: u16, rows: u16, bitmaps: u16, tile_width: u16, tile_height: u16) -> Self {
        Self {
            columns,
            rows,
            tile_width,
            tile_height,
            cells: vec![NO_TILE; usize::from(columns) * usize::from(rows)],
            bitmaps: vec![Bitmap::new(tile_width, tile_height, TRANSPARENT); usize::from(bitmaps)],
            offset: Point::new(0, 0),
            view: None,
        }
    }

    /// A wrapping window of `width × height` pixels onto the grid.
    #[must_use]
    pub fn map(
        columns: u16,
        rows: u16,
        bitmaps: u16,
        tile_width: u16,
        tile_height: u16,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            view: Some((i32::from(width), i32::from(height))),
            ..Self::array(columns, rows, bitmaps, tile_width, tile_height)
        }
    }

    /// Whether this is a wrapping map.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.view.is_some()
    }

    /// Size of the whole grid in pixels, saturating at `i32::MAX`.
    #[must_use]
    pub fn content_size(&self) -> (i32, i32) {
        let span =
            |n: u16, px: u16| i32::try_from(u32::from(n) * u32::from(px)).unwrap_or(i32::MAX);
        (
            span(self.columns, self.tile_width),
            span(self.rows, self.tile_height),
        )
    }

    /// Size of the visible area in pixels.
    #[must_use]
    pub fn view_size(&self) -> (i32, i32) {
        self.view.unwrap_or_else(|| self.content_size())
    }

    /// The tile at a cell.
    #[must_use]
    pub fn tile(&self, column: u16, row: u16) -> Option<u16> {
        self.cell_index(column, row).map(|i| self.cells[i])
    }

    /// Points a cell at a tile bitmap (or [`NO_TILE`]).
    pub fn set_tile(&mut self, column: u16, row: u16, tile: u16) -> bool {
        if !self.valid_tile(tile) {
            return false;
        }
        match self.cell_index(column, row) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Sets consecutive cells from `(column, row)`, wrapping to the next row.
    ///
    /// Nothing is written unless every cell and tile is valid.
    pub fn set_tiles(&mut self, column: u16, row: u16, tiles: &[u16]) -> bool {
        let Some(start) = self.cell_index(column, row) else {
            return false;
        };
        if start + tiles.len() > self.cells.len() || !tiles.iter().all(|&t| self.valid_tile(t)) {
            return false;
        }
        self.cells[start..start + tiles.len()].copy_from_slice(tiles);
        true
    }

    /// A tile bitmap for editing.
    pub fn bitmap_mut(&mut self, tile: u16) -> Option<&mut Bitmap> {
        self.bitmaps.get_mut(usize::from(tile))
    }

    /// Number of tile bitmaps.
    #[must_use]
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps.len()
    }

    /// Pans a map; returns `false` for arrays.
    pub fn set_offset(&mut self, x: i32, y: i32) -> bool {
        if self.is_map() {
            self.offset = Point::new(x, y);
            true
        } else {
            false
        }
    }

    /// The current pan offset.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Renders the visible area into a bitmap.
    ///
    /// Returns `None` when the visible area does not fit a bitmap.
    #[must_use]
    pub fn rasterize(&self) -> Option<Bitmap> {
        let (w, h) = self.view_size();
        let (cw, ch) = self.content_size();
        let (bw, bh) = (u16::try_from(w).ok()?, u16::try_from(h).ok()?);
        let mut pixels = vec![TRANSPARENT; usize::from(bw) * usize::from(bh)];
        if cw > 0 && ch > 0 {
            let (tw, th) = (i32::from(self.tile_width), i32::from(self.tile_height));
            for (y, row) in (0_i32..).zip(pixels.chunks_exact_mut(usize::from(bw).max(1))) {
                let cy = (y + self.offset.y).rem_euclid(ch);
                for (x, px) in (0_i32..).zip(row.iter_mut()) {
                    let cx = (x + self.offset.x).rem_euclid(cw);
                    let cell = u16::try_from(cx / tw)
                        .ok()
                        .zip(u16::try_from(cy / th).ok())
                        .and_then(|(c, r)| self.cell_index(c, r))
                        .map(|i| &self.cells[i]);
                    if let Some(bitmap) = cell.and_then(|&t| self.bitmaps.get(usize::from(t))) {
                        *px = bitmap.get(cx % tw, cy % th).unwrap_or(TRANSPARENT);
                    }
                }
            }
        }
        Some(Bitmap::from_pixels(bw, bh, pixels))
    }

    fn valid_tile(&self, tile: u16) -> bool {
        tile == NO_TILE || usize::from(tile) < self.bitmaps.len()
    }

    fn cell_index(&self, column: u16, row: u16) -> Option<usize> {
        (column < self.columns && row < self.rows)
            .then(|| usize::from(row) * usize::from(self.columns) + usize::from(column))
    }
}
