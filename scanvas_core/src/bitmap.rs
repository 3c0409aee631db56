// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel images and how their bytes combine with the line below them.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use crate::color::{Color, Pixel};

/// The raw byte that a transparent image leaves untouched.
pub const TRANSPARENT: u8 = 0x00;

/// How image bytes are composited onto the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelMode {
    /// Every byte overwrites; opacity bits are ignored.
    Solid,
    /// Bytes equal to the mask color are skipped; others overwrite.
    Masked(Color),
    /// Each byte blends at its own opacity; [`TRANSPARENT`] is skipped.
    Transparent,
}

/// A row-major grid of color bytes.
///
/// The pixel store is shared copy-on-write: cloning a bitmap is cheap, and a
/// painter compiled from a clone keeps its snapshot while the original is
/// edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    pixels: Rc<Vec<u8>>,
}

impl Bitmap {
    /// Creates a bitmap with every byte set to `fill`.
    #[must_use]
    pub fn new(width: u16, height: u16, fill: u8) -> Self {
        Self {
            width,
            height,
            pixels: Rc::new(vec![fill; usize::from(width) * usize::from(height)]),
        }
    }

    /// Wraps existing row-major pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len()` is not `width * height`.
    #[must_use]
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            usize::from(width) * usize::from(height),
            "pixel data does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels: Rc::new(pixels),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The byte at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Row `y` of the image.
    #[must_use]
    pub fn row(&self, y: i32) -> Option<&[Pixel]> {
        let w = usize::from(self.width);
        let y = usize::try_from(y).ok().filter(|&y| y < usize::from(self.height))?;
        Some(&self.pixels[y * w..(y + 1) * w])
    }

    /// Sets the byte at `(x, y)`; returns `false` outside the image.
    pub fn set(&mut self, x: i32, y: i32, value: u8) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                Rc::make_mut(&mut self.pixels)[i] = value;
                true
            }
            None => false,
        }
    }

    /// Sets the `index`-th byte of a row-major run starting at `(x, y)`,
    /// wrapping at the right edge; returns `false` past the last pixel.
    pub fn set_run(&mut self, x: i32, y: i32, index: usize, value: u8) -> bool {
        if self.offset(x, y).is_none() {
            return false;
        }
        let w = usize::from(self.width);
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        let pos = y * w + x + index;
        if pos >= self.pixels.len() {
            return false;
        }
        Rc::make_mut(&mut self.pixels)[pos] = value;
        true
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < usize::from(self.width))?;
        let y = usize::try_from(y).ok().filter(|&y| y < usize::from(self.height))?;
        Some(y * usize::from(self.width) + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut bmp = Bitmap::new(4, 3, TRANSPARENT);
        assert!(bmp.set(3, 2, 0xC5));
        assert_eq!(bmp.get(3, 2), Some(0xC5));
        assert!(!bmp.set(4, 0, 1));
        assert!(!bmp.set(0, -1, 1));
        assert_eq!(bmp.get(-1, 0), None);
    }

    #[test]
    fn run_wraps_rows() {
        let mut bmp = Bitmap::new(4, 2, 0);
        for (i, v) in [1, 2, 3, 4].into_iter().enumerate() {
            assert!(bmp.set_run(2, 0, i, v));
        }
        assert_eq!(bmp.row(0), Some(&[0, 0, 1, 2][..]));
        assert_eq!(bmp.row(1), Some(&[3, 4, 0, 0][..]));
        assert!(!bmp.set_run(2, 1, 2, 9), "runs stop at the last pixel");
    }

    #[test]
    fn clones_are_snapshots() {
        let mut bmp = Bitmap::new(2, 2, 0);
        let snapshot = bmp.clone();
        bmp.set(0, 0, 7);
        assert_eq!(snapshot.get(0, 0), Some(0));
        assert_eq!(bmp.get(0, 0), Some(7));
    }
}
