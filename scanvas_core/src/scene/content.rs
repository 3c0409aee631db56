// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel, tile and text content of primitives.
//!
//! Content edits mark [`APPEARANCE`](crate::dirty::APPEARANCE). The
//! single-item operations flush immediately. The `*_run` operations are fed
//! one pixel at a time by command streams and leave the flush to
//! [`Scene::finish_stream`], so painters are rebuilt once per stream.

use super::error::SceneError;
use super::id::PrimitiveId;
use super::shape::{BitmapSource, Shape};
use super::store::Scene;
use super::terminal::Terminal;
use super::tiles::TileSet;
use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::dirty;

impl Scene {
    /// Sets one pixel of an owned bitmap.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive owns a bitmap,
    /// [`SceneError::OutOfBounds`] outside it.
    pub fn set_bitmap_pixel(
        &mut self,
        id: PrimitiveId,
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<(), SceneError> {
        let bitmap = self.owned_bitmap_mut(id)?;
        if !bitmap.set(x, y, color.0) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Writes item `index` of a pixel stream starting at `(x, y)`, wrapping
    /// at the bitmap width. Does not flush.
    ///
    /// # Errors
    ///
    /// As for [`set_bitmap_pixel`](Self::set_bitmap_pixel).
    pub fn write_bitmap_run(
        &mut self,
        id: PrimitiveId,
        x: i32,
        y: i32,
        index: usize,
        color: Color,
    ) -> Result<(), SceneError> {
        let bitmap = self.owned_bitmap_mut(id)?;
        if !bitmap.set_run(x, y, index, color.0) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        Ok(())
    }

    /// Ends a pixel stream, flushing the edits it made.
    pub fn finish_stream(&mut self) {
        self.recompute();
    }

    /// Points a tile cell at a tile bitmap.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive is a tile set,
    /// [`SceneError::OutOfBounds`] for a bad cell or bitmap index.
    pub fn set_tile(
        &mut self,
        id: PrimitiveId,
        column: u16,
        row: u16,
        tile: u16,
    ) -> Result<(), SceneError> {
        if !self.tiles_mut(id)?.set_tile(column, row, tile) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Sets consecutive cells from `(column, row)`.
    ///
    /// # Errors
    ///
    /// As for [`set_tile`](Self::set_tile); nothing is written on error.
    pub fn set_tile_row(
        &mut self,
        id: PrimitiveId,
        column: u16,
        row: u16,
        tiles: &[u16],
    ) -> Result<(), SceneError> {
        if !self.tiles_mut(id)?.set_tiles(column, row, tiles) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Sets one pixel of a tile bitmap.
    ///
    /// # Errors
    ///
    /// As for [`set_tile`](Self::set_tile).
    pub fn set_tile_pixel(
        &mut self,
        id: PrimitiveId,
        tile: u16,
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<(), SceneError> {
        let bitmap = self.tile_bitmap_mut(id, tile)?;
        if !bitmap.set(x, y, color.0) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Writes item `index` of a tile-bitmap pixel stream. Does not flush.
    ///
    /// # Errors
    ///
    /// As for [`set_tile`](Self::set_tile).
    pub fn write_tile_run(
        &mut self,
        id: PrimitiveId,
        tile: u16,
        x: i32,
        y: i32,
        index: usize,
        color: Color,
    ) -> Result<(), SceneError> {
        let bitmap = self.tile_bitmap_mut(id, tile)?;
        if !bitmap.set_run(x, y, index, color.0) {
            return Err(SceneError::OutOfBounds(id));
        }
        self.touch(id);
        Ok(())
    }

    /// Pans a tile map.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive is a tile map.
    pub fn set_tile_offset(&mut self, id: PrimitiveId, x: i32, y: i32) -> Result<(), SceneError> {
        if !self.tiles_mut(id)?.set_offset(x, y) {
            return Err(SceneError::WrongKind(id));
        }
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Makes a terminal the receiver of text bytes.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive is a terminal.
    pub fn select_terminal(&mut self, id: PrimitiveId) -> Result<(), SceneError> {
        self.terminal_mut(id)?;
        self.active_terminal = Some(id);
        Ok(())
    }

    /// Defines the 8×8 glyph drawn for character `code`.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive is a terminal.
    pub fn define_glyph(
        &mut self,
        id: PrimitiveId,
        code: u8,
        rows: [u8; 8],
    ) -> Result<(), SceneError> {
        self.terminal_mut(id)?.define_glyph(code, rows);
        self.touch(id);
        self.recompute();
        Ok(())
    }

    /// Moves a terminal's cursor.
    ///
    /// # Errors
    ///
    /// [`SceneError::WrongKind`] unless the primitive is a terminal,
    /// [`SceneError::OutOfBounds`] outside the grid.
    pub fn set_terminal_cursor(
        &mut self,
        id: PrimitiveId,
        column: u16,
        row: u16,
    ) -> Result<(), SceneError> {
        if !self.terminal_mut(id)?.set_cursor(column, row) {
            return Err(SceneError::OutOfBounds(id));
        }
        Ok(())
    }

    /// Feeds one text byte to the active terminal.
    ///
    /// Returns whether the terminal's cells changed.
    pub fn terminal_text(&mut self, byte: u8) -> bool {
        let Some(id) = self.active_terminal else {
            return false;
        };
        let Ok(terminal) = self.terminal_mut(id) else {
            return false;
        };
        if !terminal.write(byte) {
            return false;
        }
        self.touch(id);
        self.recompute();
        true
    }

    // -- Internal helpers --

    fn touch(&mut self, id: PrimitiveId) {
        self.dirty.mark(id.index(), dirty::APPEARANCE);
    }

    fn shape_mut(&mut self, id: PrimitiveId) -> Result<&mut Shape, SceneError> {
        let idx = self.target(id)?;
        Ok(&mut self.shape[idx as usize])
    }

    fn owned_bitmap_mut(&mut self, id: PrimitiveId) -> Result<&mut Bitmap, SceneError> {
        match self.shape_mut(id)? {
            Shape::Bitmap {
                source: BitmapSource::Owned(bitmap),
                ..
            } => Ok(bitmap),
            _ => Err(SceneError::WrongKind(id)),
        }
    }

    fn tiles_mut(&mut self, id: PrimitiveId) -> Result<&mut TileSet, SceneError> {
        match self.shape_mut(id)? {
            Shape::Tiles(tiles) => Ok(tiles),
            _ => Err(SceneError::WrongKind(id)),
        }
    }

    fn tile_bitmap_mut(&mut self, id: PrimitiveId, tile: u16) -> Result<&mut Bitmap, SceneError> {
        self.tiles_mut(id)?
            .bitmap_mut(tile)
            .ok_or(SceneError::OutOfBounds(id))
    }

    fn terminal_mut(&mut self, id: PrimitiveId) -> Result<&mut Terminal, SceneError> {
        match self.shape_mut(id)? {
            Shape::Terminal(terminal) => Ok(terminal),
            _ => Err(SceneError::WrongKind(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelMode;
    use crate::display::DisplayConfig;
    use crate::geometry::Point;
    use crate::scene::{PrimitiveFlags, PrimitiveSpec, SceneConfig};

    const A: PrimitiveId = PrimitiveId(1);

    fn scene_with(spec: PrimitiveSpec) -> Scene {
        let mut s = Scene::new(DisplayConfig::qvga_320x240(), SceneConfig::compact());
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, spec)
            .unwrap();
        s
    }

    #[test]
    fn stream_rebuilds_once() {
        let mut s = scene_with(PrimitiveSpec::bitmap(3, 2, PixelMode::Solid));
        for (i, c) in [0xC1, 0xC2, 0xC3, 0xC4].into_iter().enumerate() {
            s.write_bitmap_run(A, 1, 0, i, Color(c)).unwrap();
        }
        s.finish_stream();
        assert_eq!(s.last_changes().rebuilt, [A]);
        let Some(Shape::Bitmap {
            source: BitmapSource::Owned(bitmap),
            ..
        }) = s.shape(A)
        else {
            panic!("expected an owned bitmap");
        };
        assert_eq!(bitmap.row(0), Some(&[0xC0, 0xC1, 0xC2][..]));
        assert_eq!(bitmap.row(1), Some(&[0xC3, 0xC4, 0xC0][..]));
    }

    #[test]
    fn pixel_outside_bitmap_is_refused() {
        let mut s = scene_with(PrimitiveSpec::bitmap(2, 2, PixelMode::Transparent));
        assert_eq!(
            s.set_bitmap_pixel(A, 2, 0, Color::WHITE),
            Err(SceneError::OutOfBounds(A))
        );
        assert_eq!(
            s.set_tile(A, 0, 0, 0),
            Err(SceneError::WrongKind(A)),
            "bitmaps have no tiles"
        );
    }

    #[test]
    fn terminal_text_goes_to_active_terminal() {
        let spec = PrimitiveSpec::terminal(Point::new(0, 0), 4, 2, Color::WHITE, Color::BLACK);
        let mut s = scene_with(spec);
        assert!(!s.terminal_text(b'x'), "no terminal selected yet");
        s.select_terminal(A).unwrap();
        assert!(s.terminal_text(b'x'));
        assert!(!s.terminal_text(b'\r'), "cursor moves do not repaint");
        let Some(Shape::Terminal(t)) = s.shape(A) else {
            panic!("expected a terminal");
        };
        assert_eq!(t.cell(0, 0), Some(b'x'));

        s.delete(A).unwrap();
        assert_eq!(s.active_terminal(), None);
    }

    #[test]
    fn tile_map_offset() {
        let mut s = scene_with(PrimitiveSpec::tile_map(4, 4, 2, 8, 8, 16, 16));
        s.set_tile_row(A, 0, 0, &[0, 1, 0, 1]).unwrap();
        s.set_tile_pixel(A, 1, 0, 0, Color::WHITE).unwrap();
        s.set_tile_offset(A, 8, 0).unwrap();
        assert!(s.last_changes().rebuilt.contains(&A));
        let array = PrimitiveSpec::tile_array(2, 2, 1, 8, 8);
        s.create(PrimitiveId(2), PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, array)
            .unwrap();
        assert_eq!(
            s.set_tile_offset(PrimitiveId(2), 1, 1),
            Err(SceneError::WrongKind(PrimitiveId(2)))
        );
    }
}
