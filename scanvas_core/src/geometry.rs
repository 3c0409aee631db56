// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel geometry.

/// A point in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A half-open pixel rectangle `[x0, x1) × [y0, y1)`.
///
/// A rectangle with `x1 <= x0` or `y1 <= y0` is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl PixelRect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    /// Creates a rectangle from its edges.
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a rectangle from an origin and a size.
    #[must_use]
    pub const fn from_origin_size(origin: Point, width: i32, height: i32) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            x1: origin.x + width,
            y1: origin.y + height,
        }
    }

    /// Width in pixels (zero when empty).
    #[must_use]
    pub const fn width(&self) -> i32 {
        if self.x1 > self.x0 { self.x1 - self.x0 } else { 0 }
    }

    /// Height in pixels (zero when empty).
    #[must_use]
    pub const fn height(&self) -> i32 {
        if self.y1 > self.y0 { self.y1 - self.y0 } else { 0 }
    }

    /// Whether the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// The intersection of two rectangles; [`EMPTY`](Self::EMPTY) when disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let r = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Whether `(x, y)` lies inside.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Returns this rectangle translated by `(dx, dy)`.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// The covered scan lines as a half-open range, or `None` when empty.
    #[must_use]
    pub const fn line_range(&self) -> Option<LineRange> {
        if self.is_empty() {
            None
        } else {
            Some(LineRange {
                start: self.y0,
                end: self.y1,
            })
        }
    }

    /// Converts to a floating-point `kurbo` rectangle.
    #[must_use]
    pub fn to_kurbo(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

/// A non-empty half-open range of scan lines `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineRange {
    /// First covered line.
    pub start: i32,
    /// One past the last covered line.
    pub end: i32,
}

impl LineRange {
    /// Creates a range; `end` must be greater than `start`.
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        debug_assert!(end > start, "line range must be non-empty");
        Self { start, end }
    }

    /// Whether `line` lies inside.
    #[must_use]
    pub const fn contains(&self, line: i32) -> bool {
        line >= self.start && line < self.end
    }
}
