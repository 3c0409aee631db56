// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive shapes and creation descriptions.

use super::id::PrimitiveId;
use super::terminal::{CELL_SIZE, Terminal};
use super::tiles::TileSet;
use crate::bitmap::{Bitmap, PixelMode, TRANSPARENT};
use crate::color::Color;
use crate::decompose::{self, LineDetail};
use crate::geometry::{PixelRect, Point};

/// What a primitive draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// The screen background.
    Root,
    /// A container that only positions and clips its children.
    Group,
    /// Decomposed lines or polygons, relative to the primitive origin.
    Lines(LineDetail),
    /// A pixel image.
    Bitmap {
        /// Where the pixels live.
        source: BitmapSource,
        /// How they combine with the line.
        mode: PixelMode,
    },
    /// A tile array or wrapping tile map.
    Tiles(TileSet),
    /// A character-cell terminal.
    Terminal(Terminal),
}

/// The pixel store of a bitmap primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapSource {
    /// Pixels owned by this primitive.
    Owned(Bitmap),
    /// Pixels of another bitmap primitive, drawn with this primitive's mode.
    Reference(PrimitiveId),
}

impl Shape {
    /// A short name for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Group => "group",
            Self::Lines(_) => "lines",
            Self::Bitmap {
                source: BitmapSource::Owned(_),
                ..
            } => "bitmap",
            Self::Bitmap {
                source: BitmapSource::Reference(_),
                ..
            } => "bitmap reference",
            Self::Tiles(t) if t.is_map() => "tile map",
            Self::Tiles(_) => "tile array",
            Self::Terminal(_) => "terminal",
        }
    }

    /// The owned bitmap, if this is one.
    #[must_use]
    pub fn owned_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::Bitmap {
                source: BitmapSource::Owned(bitmap),
                ..
            } => Some(bitmap),
            _ => None,
        }
    }
}

/// A shape as described at creation.
///
/// Shapes with content buffers keep only their dimensions until the scene
/// has checked them; [`build`](Self::build) allocates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ShapeSpec {
    Built(Shape),
    Bitmap {
        width: u16,
        height: u16,
        mode: PixelMode,
    },
    Tiles {
        columns: u16,
        rows: u16,
        bitmaps: u16,
        tile_width: u16,
        tile_height: u16,
        view: Option<(u16, u16)>,
    },
    Terminal {
        columns: u16,
        rows: u16,
        fg: Color,
        bg: Color,
    },
}

impl ShapeSpec {
    /// Whether the full content (not just the visible part) has a size that
    /// fits 16 bits.
    pub(crate) fn content_fits(&self) -> bool {
        match *self {
            Self::Tiles {
                columns,
                rows,
                tile_width,
                tile_height,
                ..
            } => {
                product(columns, tile_width) <= u64::from(u16::MAX)
                    && product(rows, tile_height) <= u64::from(u16::MAX)
            }
            _ => true,
        }
    }

    /// Bytes the content buffers take, including the raster a painter is
    /// compiled from.
    pub(crate) fn content_bytes(&self) -> u64 {
        match *self {
            Self::Built(_) => 0,
            Self::Bitmap { width, height, .. } => product(width, height),
            Self::Tiles {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
                view,
            } => {
                let cells = product(columns, rows).saturating_mul(2);
                let tiles = product(tile_width, tile_height).saturating_mul(u64::from(bitmaps));
                let raster = match view {
                    Some((w, h)) => product(w, h),
                    None => product(columns, tile_width)
                        .saturating_mul(product(rows, tile_height)),
                };
                cells.saturating_add(tiles).saturating_add(raster)
            }
            Self::Terminal { columns, rows, .. } => {
                let cell_px = (CELL_SIZE * CELL_SIZE).unsigned_abs();
                product(columns, rows).saturating_mul(1 + u64::from(cell_px))
            }
        }
    }

    /// Allocates the content.
    pub(crate) fn build(self) -> Shape {
        match self {
            Self::Built(shape) => shape,
            Self::Bitmap {
                width,
                height,
                mode,
            } => {
                let fill = match mode {
                    PixelMode::Solid => Color::BLACK.0,
                    PixelMode::Masked(mask) => mask.0,
                    PixelMode::Transparent => TRANSPARENT,
                };
                Shape::Bitmap {
                    source: BitmapSource::Owned(Bitmap::new(width, height, fill)),
                    mode,
                }
            }
            Self::Tiles {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
                view,
            } => Shape::Tiles(match view {
                Some((w, h)) => {
                    TileSet::map(columns, rows, bitmaps, tile_width, tile_height, w, h)
                }
                None => TileSet::array(columns, rows, bitmaps, tile_width, tile_height),
            }),
            Self::Terminal {
                columns,
                rows,
                fg,
                bg,
            } => Shape::Terminal(Terminal::new(columns, rows, fg, bg)),
        }
    }
}

fn product(a: u16, b: u16) -> u64 {
    u64::from(a) * u64::from(b)
}

fn clamp_size(v: u64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Everything needed to create a primitive: its shape, placement relative
/// to the parent, size and color.
///
/// Vector constructors take coordinates in the parent's space and place the
/// primitive at the top-left of the shape's bounds. Bitmaps, tiles and
/// terminals allocate their content only when the scene accepts them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveSpec {
    pub(crate) shape: ShapeSpec,
    pub(crate) position: Point,
    pub(crate) size: (i32, i32),
    pub(crate) color: Color,
}

impl PrimitiveSpec {
    /// A container covering `rect`.
    #[must_use]
    pub fn group(rect: PixelRect) -> Self {
        Self {
            shape: ShapeSpec::Built(Shape::Group),
            position: Point::new(rect.x0, rect.y0),
            size: (rect.width(), rect.height()),
            color: Color::BLACK,
        }
    }

    /// Arbitrary decomposed pieces in parent coordinates.
    ///
    /// An empty detail yields a zero-sized primitive that never draws.
    #[must_use]
    pub fn lines(detail: &LineDetail, color: Color) -> Self {
        let bounds = detail.bounds();
        Self {
            shape: ShapeSpec::Built(Shape::Lines(detail.translated(-bounds.x0, -bounds.y0))),
            position: Point::new(bounds.x0, bounds.y0),
            size: (bounds.width(), bounds.height()),
            color,
        }
    }

    /// A single pixel.
    #[must_use]
    pub fn point(p: Point, color: Color) -> Self {
        Self::lines(&decompose::decompose_point(p), color)
    }

    /// A one-pixel line.
    #[must_use]
    pub fn line(p0: Point, p1: Point, color: Color) -> Self {
        Self::lines(&decompose::decompose_line(p0, p1), color)
    }

    /// A triangle.
    #[must_use]
    pub fn triangle(v: [Point; 3], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_triangle(v[0], v[1], v[2], solid), color)
    }

    /// Independent triangles.
    #[must_use]
    pub fn triangle_list(triangles: &[[Point; 3]], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_triangle_list(triangles, solid), color)
    }

    /// A fan around the first point.
    #[must_use]
    pub fn triangle_fan(points: &[Point], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_triangle_fan(points, solid), color)
    }

    /// A strip of triangles.
    #[must_use]
    pub fn triangle_strip(points: &[Point], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_triangle_strip(points, solid), color)
    }

    /// An axis-aligned rectangle.
    #[must_use]
    pub fn rect(origin: Point, width: i32, height: i32, solid: bool, color: Color) -> Self {
        let mut spec = Self::lines(
            &decompose::decompose_rect(origin, width, height, solid),
            color,
        );
        if width <= 0 || height <= 0 {
            spec.position = origin;
        }
        spec
    }

    /// An ellipse inscribed in a rectangle.
    #[must_use]
    pub fn ellipse(origin: Point, width: i32, height: i32, solid: bool, color: Color) -> Self {
        let mut spec = Self::lines(
            &decompose::decompose_ellipse(origin, width, height, solid),
            color,
        );
        if width <= 0 || height <= 0 {
            spec.position = origin;
        }
        spec
    }

    /// A quadrilateral.
    #[must_use]
    pub fn quad(v: [Point; 4], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_quad(v, solid), color)
    }

    /// Independent quadrilaterals.
    #[must_use]
    pub fn quad_list(quads: &[[Point; 4]], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_quad_list(quads, solid), color)
    }

    /// A strip of quadrilaterals.
    #[must_use]
    pub fn quad_strip(points: &[Point], solid: bool, color: Color) -> Self {
        Self::lines(&decompose::decompose_quad_strip(points, solid), color)
    }

    /// An owned bitmap at the parent origin with every pixel blank.
    ///
    /// Blank is [`TRANSPARENT`] for transparent bitmaps, the mask color for
    /// masked ones and black for solid ones.
    #[must_use]
    pub fn bitmap(width: u16, height: u16, mode: PixelMode) -> Self {
        Self {
            shape: ShapeSpec::Bitmap {
                width,
                height,
                mode,
            },
            position: Point::new(0, 0),
            size: (i32::from(width), i32::from(height)),
            color: Color::BLACK,
        }
    }

    /// A bitmap drawing the pixels of another bitmap primitive.
    ///
    /// The size is taken from the source when the primitive is created.
    #[must_use]
    pub fn bitmap_reference(source: PrimitiveId, mode: PixelMode) -> Self {
        Self {
            shape: ShapeSpec::Built(Shape::Bitmap {
                source: BitmapSource::Reference(source),
                mode,
            }),
            position: Point::new(0, 0),
            size: (0, 0),
            color: Color::BLACK,
        }
    }

    /// A tile array showing its whole grid.
    #[must_use]
    pub fn tile_array(
        columns: u16,
        rows: u16,
        bitmaps: u16,
        tile_width: u16,
        tile_height: u16,
    ) -> Self {
        Self {
            size: (
                clamp_size(product(columns, tile_width)),
                clamp_size(product(rows, tile_height)),
            ),
            shape: ShapeSpec::Tiles {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
                view: None,
            },
            position: Point::new(0, 0),
            color: Color::BLACK,
        }
    }

    /// A tile map showing a wrapping `width × height` window.
    #[must_use]
    pub fn tile_map(
        columns: u16,
        rows: u16,
        bitmaps: u16,
        tile_width: u16,
        tile_height: u16,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            size: (i32::from(width), i32::from(height)),
            shape: ShapeSpec::Tiles {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
                view: Some((width, height)),
            },
            position: Point::new(0, 0),
            color: Color::BLACK,
        }
    }

    /// A blank terminal at `origin`.
    #[must_use]
    pub fn terminal(origin: Point, columns: u16, rows: u16, fg: Color, bg: Color) -> Self {
        Self {
            size: (
                i32::from(columns) * CELL_SIZE,
                i32::from(rows) * CELL_SIZE,
            ),
            shape: ShapeSpec::Terminal {
                columns,
                rows,
                fg,
                bg,
            },
            position: origin,
            color: fg,
        }
    }

    /// Places the primitive at `position` relative to its parent.
    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// The shape, for shapes without content buffers.
    #[must_use]
    pub fn shape(&self) -> Option<&Shape> {
        match &self.shape {
            ShapeSpec::Built(shape) => Some(shape),
            _ => None,
        }
    }

    /// Position relative to the parent.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_placed_at_bounds() {
        let spec = PrimitiveSpec::line(Point::new(10, 20), Point::new(14, 20), Color::WHITE);
        assert_eq!(spec.position(), Point::new(10, 20));
        assert_eq!(spec.size(), (5, 1));
        let Some(Shape::Lines(detail)) = spec.shape() else {
            panic!("expected lines");
        };
        assert_eq!(detail.bounds(), PixelRect::new(0, 0, 5, 1));
    }

    #[test]
    fn zero_area_rect_is_empty() {
        let spec = PrimitiveSpec::rect(Point::new(3, 4), 0, 10, true, Color::WHITE);
        assert_eq!(spec.size(), (0, 0));
        assert_eq!(spec.position(), Point::new(3, 4));
    }

    #[test]
    fn content_is_deferred_and_sized_without_overflow() {
        let spec = PrimitiveSpec::tile_array(u16::MAX, 1, 0, u16::MAX, 1);
        assert_eq!(spec.size(), (i32::MAX, 1));
        assert!(spec.shape().is_none(), "tile content is not allocated yet");
        assert!(!spec.shape.content_fits());

        let map = PrimitiveSpec::tile_map(u16::MAX, 1, 0, u16::MAX, 1, 10, 1);
        assert_eq!(map.size(), (10, 1));
        assert!(!map.shape.content_fits(), "the grid itself must fit");

        let bitmap = PrimitiveSpec::bitmap(u16::MAX, u16::MAX, PixelMode::Solid);
        assert_eq!(bitmap.shape.content_bytes(), 65535 * 65535);
    }

    #[test]
    fn built_bitmap_starts_blank() {
        let spec = PrimitiveSpec::bitmap(2, 1, PixelMode::Masked(Color::WHITE));
        let shape = spec.shape.build();
        let bitmap = shape.owned_bitmap().unwrap();
        assert_eq!(bitmap.get(1, 0), Some(Color::WHITE.0));
    }
}
