// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reduction of lines and polygons to per-scan-line pixel spans.
//!
//! Every shape a primitive can take is decomposed once, at creation, into a
//! [`LineDetail`]: for each scan line it touches, an x-sorted list of
//! [`Section`]s. Painters are compiled from these rows.
//!
//! Segments are walked with an integer error accumulator along the major
//! axis (the scaled fractional part of the minor-axis position), so no
//! division happens per step and long lines do not drift.
//!
//! Filled shapes take, per row, the minimum start and maximum end of the edges
//! touching that row. Outlines keep separate pieces. Pieces combined from
//! several edges or member shapes go through [`LineDetail::add_piece`], which
//! merges intervals that overlap *or touch*: a few extra covered pixels are
//! cheaper than extra painter spans.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{PathEl, Shape};

use crate::geometry::{PixelRect, Point};

/// Flattening tolerance (in pixels) for curved outlines.
const CURVE_TOLERANCE: f64 = 0.25;

/// A half-open horizontal run of pixels `[x, x + width)` on one scan line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Section {
    /// First covered pixel.
    pub x: i32,
    /// Number of covered pixels (always positive).
    pub width: i32,
}

impl Section {
    /// Creates a section covering `[x, x + width)`.
    #[must_use]
    pub const fn new(x: i32, width: i32) -> Self {
        Self { x, width }
    }

    /// Creates a section from inclusive-exclusive bounds.
    #[must_use]
    pub const fn from_bounds(start: i32, end: i32) -> Self {
        Self {
            x: start,
            width: end - start,
        }
    }

    /// One past the last covered pixel.
    #[must_use]
    pub const fn end(&self) -> i32 {
        self.x + self.width
    }

    /// Whether the two sections overlap or share an edge.
    #[must_use]
    pub const fn touches(&self, other: &Self) -> bool {
        self.x <= other.end() && other.x <= self.end()
    }

    /// Clips to `[start, end)`; `None` when nothing remains.
    #[must_use]
    pub fn clip(&self, start: i32, end: i32) -> Option<Self> {
        let s = self.x.max(start);
        let e = self.end().min(end);
        (e > s).then(|| Self::from_bounds(s, e))
    }
}

/// Per-scan-line pieces of one decomposed shape, ordered by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineDetail {
    rows: BTreeMap<i32, Vec<Section>>,
}

impl LineDetail {
    /// Creates an empty detail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no row has any piece.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of pieces across all rows.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// The pieces of row `y` (empty when the row is untouched).
    #[must_use]
    pub fn row(&self, y: i32) -> &[Section] {
        self.rows.get(&y).map_or(&[], Vec::as_slice)
    }

    /// Iterates rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Section])> + '_ {
        self.rows.iter().map(|(&y, row)| (y, row.as_slice()))
    }

    /// Adds a piece to row `y`, merging it with every piece it overlaps or
    /// touches and keeping the row x-sorted.
    pub fn add_piece(&mut self, y: i32, piece: Section) {
        if piece.width <= 0 {
            return;
        }
        let row = self.rows.entry(y).or_default();
        let first = row.partition_point(|s| s.end() < piece.x);
        let mut last = first;
        let mut start = piece.x;
        let mut end = piece.end();
        while last < row.len() && row[last].x <= end {
            start = start.min(row[last].x);
            end = end.max(row[last].end());
            last += 1;
        }
        row.splice(first..last, [Section::from_bounds(start, end)]);
    }

    /// Appends a piece to row `y` without merging.
    ///
    /// Used for outlines whose left and right edges stay separate; the caller
    /// supplies pieces in x order.
    fn push_unmerged(&mut self, y: i32, piece: Section) {
        if piece.width > 0 {
            self.rows.entry(y).or_default().push(piece);
        }
    }

    /// Merges every piece of `other` into this detail with
    /// [`add_piece`](Self::add_piece).
    pub fn merge_from(&mut self, other: &Self) {
        for (y, row) in other.rows() {
            for &piece in row {
                self.add_piece(y, piece);
            }
        }
    }

    /// The bounding rectangle of all pieces, or [`PixelRect::EMPTY`].
    #[must_use]
    pub fn bounds(&self) -> PixelRect {
        let (Some((&y0, _)), Some((&y1, _))) =
            (self.rows.first_key_value(), self.rows.last_key_value())
        else {
            return PixelRect::EMPTY;
        };
        let mut x0 = i32::MAX;
        let mut x1 = i32::MIN;
        for row in self.rows.values() {
            if let (Some(first), Some(last)) = (row.first(), row.last()) {
                x0 = x0.min(first.x);
                x1 = x1.max(row.iter().map(Section::end).max().unwrap_or(last.end()));
            }
        }
        PixelRect::new(x0, y0, x1, y1 + 1)
    }

    /// Returns a copy translated by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|(&y, row)| {
                    (
                        y + dy,
                        row.iter().map(|s| Section::new(s.x + dx, s.width)).collect(),
                    )
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Segment walking
// ---------------------------------------------------------------------------

/// Walks the segment `p0`–`p1` top to bottom and calls `emit` once per
/// touched row with the run of pixels visited on that row.
fn walk_segment(p0: Point, p1: Point, mut emit: impl FnMut(i32, Section)) {
    let (a, b) = if (p0.y, p0.x) <= (p1.y, p1.x) {
        (p0, p1)
    } else {
        (p1, p0)
    };
    let dx = (b.x - a.x).abs();
    let dy = b.y - a.y;
    let sx = if a.x < b.x { 1 } else { -1 };

    let (mut x, mut y) = (a.x, a.y);
    // `err` carries the minor-axis fraction scaled by `dx` and `dy`.
    let mut err = dx - dy;
    let mut run_y = y;
    let mut run_min = x;
    let mut run_max = x;
    loop {
        if y != run_y {
            emit(run_y, Section::from_bounds(run_min, run_max + 1));
            run_y = y;
            run_min = x;
            run_max = x;
        } else {
            run_min = run_min.min(x);
            run_max = run_max.max(x);
        }
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += 1;
        }
    }
    emit(run_y, Section::from_bounds(run_min, run_max + 1));
}

/// Collects per-row `[min, max)` extents of a segment into `spans`, widening
/// any extent already present for that row.
fn accumulate_extents(spans: &mut BTreeMap<i32, Section>, p0: Point, p1: Point) {
    walk_segment(p0, p1, |y, run| {
        spans
            .entry(y)
            .and_modify(|s| *s = Section::from_bounds(s.x.min(run.x), s.end().max(run.end())))
            .or_insert(run);
    });
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// A single pixel.
#[must_use]
pub fn decompose_point(p: Point) -> LineDetail {
    let mut detail = LineDetail::new();
    detail.add_piece(p.y, Section::new(p.x, 1));
    detail
}

/// A one-pixel-wide line from `p0` to `p1`, both ends inclusive.
///
/// A zero-length segment yields exactly one 1-pixel piece.
#[must_use]
pub fn decompose_line(p0: Point, p1: Point) -> LineDetail {
    let mut detail = LineDetail::new();
    walk_segment(p0, p1, |y, run| detail.add_piece(y, run));
    detail
}

/// A triangle, filled when `solid` is set.
///
/// Filled rows hold one piece from the leftmost to the rightmost edge pixel.
/// Outline rows hold two pieces, the edge spanning the full height and the
/// union of the two shorter edges, ordered by x. They are merged only on the
/// top and bottom rows, where the edges meet.
#[must_use]
pub fn decompose_triangle(a: Point, b: Point, c: Point, solid: bool) -> LineDetail {
    let mut pts = [a, b, c];
    pts.sort_by_key(|p| (p.y, p.x));
    let [top, mid, bottom] = pts;

    let mut long = BTreeMap::new();
    accumulate_extents(&mut long, top, bottom);
    let mut short = BTreeMap::new();
    accumulate_extents(&mut short, top, mid);
    accumulate_extents(&mut short, mid, bottom);

    let mut detail = LineDetail::new();
    for y in top.y..=bottom.y {
        let pieces = (long.get(&y).copied(), short.get(&y).copied());
        match pieces {
            (Some(l), Some(s)) => {
                if solid {
                    detail.add_piece(y, Section::from_bounds(l.x.min(s.x), l.end().max(s.end())));
                } else {
                    let (left, right) = if (l.x, l.end()) <= (s.x, s.end()) {
                        (l, s)
                    } else {
                        (s, l)
                    };
                    if (y == top.y || y == bottom.y) && left.touches(&right) {
                        detail.add_piece(y, left);
                        detail.add_piece(y, right);
                    } else {
                        detail.push_unmerged(y, left);
                        detail.push_unmerged(y, right);
                    }
                }
            }
            (Some(only), None) | (None, Some(only)) => detail.add_piece(y, only),
            (None, None) => {}
        }
    }
    detail
}

/// An axis-aligned rectangle with its top-left pixel at `origin`.
#[must_use]
pub fn decompose_rect(origin: Point, width: i32, height: i32, solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    if width <= 0 || height <= 0 {
        return detail;
    }
    let bottom = origin.y + height - 1;
    for y in origin.y..=bottom {
        if solid || y == origin.y || y == bottom {
            detail.add_piece(y, Section::new(origin.x, width));
        } else {
            detail.add_piece(y, Section::new(origin.x, 1));
            detail.add_piece(y, Section::new(origin.x + width - 1, 1));
        }
    }
    detail
}

/// A quadrilateral with vertices in drawing order.
///
/// Filled quads are split along the `v0`–`v2` diagonal and so assume the
/// quad is convex.
#[must_use]
pub fn decompose_quad(v: [Point; 4], solid: bool) -> LineDetail {
    if solid {
        let mut detail = decompose_triangle(v[0], v[1], v[2], true);
        detail.merge_from(&decompose_triangle(v[0], v[2], v[3], true));
        detail
    } else {
        polyline(&v, true)
    }
}

/// An ellipse inscribed in the rectangle at `origin` of the given size.
#[must_use]
pub fn decompose_ellipse(origin: Point, width: i32, height: i32, solid: bool) -> LineDetail {
    if width <= 0 || height <= 0 {
        return LineDetail::new();
    }
    if width <= 2 || height <= 2 {
        return decompose_rect(origin, width, height, true);
    }
    let rx = f64::from(width - 1) / 2.0;
    let ry = f64::from(height - 1) / 2.0;
    let ellipse = kurbo::Ellipse::new(
        (f64::from(origin.x) + rx, f64::from(origin.y) + ry),
        (rx, ry),
        0.0,
    );

    let mut vertices = Vec::new();
    kurbo::flatten(ellipse.path_elements(CURVE_TOLERANCE), CURVE_TOLERANCE, |el| {
        match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => {
                let p = Point::new(round_px(p.x), round_px(p.y));
                if vertices.last() != Some(&p) {
                    vertices.push(p);
                }
            }
            _ => {}
        }
    });
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    if solid {
        let mut spans = BTreeMap::new();
        for (i, &p) in vertices.iter().enumerate() {
            let q = vertices[(i + 1) % vertices.len()];
            accumulate_extents(&mut spans, p, q);
        }
        let mut detail = LineDetail::new();
        for (y, span) in spans {
            detail.add_piece(y, span);
        }
        detail
    } else {
        polyline(&vertices, true)
    }
}

/// Each triangle of a list, merged.
#[must_use]
pub fn decompose_triangle_list(triangles: &[[Point; 3]], solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    for t in triangles {
        detail.merge_from(&decompose_triangle(t[0], t[1], t[2], solid));
    }
    detail
}

/// A fan around `points[0]`: triangles `(p0, p[i], p[i + 1])`.
#[must_use]
pub fn decompose_triangle_fan(points: &[Point], solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    if let Some((&hub, rest)) = points.split_first() {
        for pair in rest.windows(2) {
            detail.merge_from(&decompose_triangle(hub, pair[0], pair[1], solid));
        }
    }
    detail
}

/// A strip: triangles `(p[i], p[i + 1], p[i + 2])`.
#[must_use]
pub fn decompose_triangle_strip(points: &[Point], solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    for tri in points.windows(3) {
        detail.merge_from(&decompose_triangle(tri[0], tri[1], tri[2], solid));
    }
    detail
}

/// Each quad of a list, merged.
#[must_use]
pub fn decompose_quad_list(quads: &[[Point; 4]], solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    for q in quads {
        detail.merge_from(&decompose_quad(*q, solid));
    }
    detail
}

/// A strip: quads `(p[2i], p[2i + 1], p[2i + 3], p[2i + 2])`.
#[must_use]
pub fn decompose_quad_strip(points: &[Point], solid: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    let mut i = 0;
    while i + 3 < points.len() {
        let quad = [points[i], points[i + 1], points[i + 3], points[i + 2]];
        detail.merge_from(&decompose_quad(quad, solid));
        i += 2;
    }
    detail
}

/// Line segments between consecutive vertices, closed when `closed`.
fn polyline(vertices: &[Point], closed: bool) -> LineDetail {
    let mut detail = LineDetail::new();
    if let [only] = vertices {
        return decompose_point(*only);
    }
    for pair in vertices.windows(2) {
        detail.merge_from(&decompose_line(pair[0], pair[1]));
    }
    if closed && vertices.len() > 2 {
        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            detail.merge_from(&decompose_line(last, first));
        }
    }
    detail
}

/// Rounds half away from zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "flattened curve points lie within the i16 coordinate space"
)]
fn round_px(v: f64) -> i32 {
    let t = v as i32;
    let frac = v - f64::from(t);
    if frac >= 0.5 {
        t + 1
    } else if frac <= -0.5 {
        t - 1
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn assert_rows_sorted_disjoint(detail: &LineDetail) {
        for (y, row) in detail.rows() {
            for pair in row.windows(2) {
                assert!(
                    pair[0].end() < pair[1].x,
                    "row {y}: {:?} and {:?} overlap or touch",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn horizontal_line_is_one_section() {
        let d = decompose_line(p(3, 7), p(12, 7));
        assert_eq!(d.rows().count(), 1);
        assert_eq!(d.row(7), &[Section::new(3, 10)]);
    }

    #[test]
    fn horizontal_line_reversed_endpoints() {
        let d = decompose_line(p(12, 7), p(3, 7));
        assert_eq!(d.row(7), &[Section::new(3, 10)]);
    }

    #[test]
    fn diagonal_line_has_unit_sections() {
        let n = 16;
        let d = decompose_line(p(0, 0), p(n - 1, n - 1));
        assert_eq!(d.rows().count(), n as usize);
        for (y, row) in d.rows() {
            assert_eq!(row, &[Section::new(y, 1)]);
        }
    }

    #[test]
    fn anti_diagonal_line_has_unit_sections() {
        let d = decompose_line(p(9, 0), p(0, 9));
        for (y, row) in d.rows() {
            assert_eq!(row, &[Section::new(9 - y, 1)]);
        }
    }

    #[test]
    fn shallow_line_visits_each_row_once() {
        let d = decompose_line(p(0, 0), p(10, 4));
        assert_eq!(d.rows().count(), 5);
        let total: i32 = d.rows().map(|(_, r)| r[0].width).sum();
        assert_eq!(total, 11, "every column is covered exactly once");
        // Consecutive rows continue where the previous one stopped.
        let mut expected_x = 0;
        for (_, row) in d.rows() {
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].x, expected_x);
            expected_x = row[0].end();
        }
        assert_eq!(expected_x, 11);
    }

    #[test]
    fn steep_line_covers_every_row() {
        let d = decompose_line(p(2, 1), p(5, 20));
        assert_eq!(d.rows().count(), 20);
        assert_eq!(d.row(1)[0].x, 2);
        assert_eq!(d.row(20)[0].x, 5);
    }

    #[test]
    fn degenerate_line_is_one_pixel() {
        let d = decompose_line(p(4, 4), p(4, 4));
        assert_eq!(d.section_count(), 1);
        assert_eq!(d.row(4), &[Section::new(4, 1)]);
    }

    #[test]
    fn add_piece_merges_touching() {
        let mut d = LineDetail::new();
        d.add_piece(0, Section::new(0, 5));
        d.add_piece(0, Section::new(5, 3));
        assert_eq!(d.row(0), &[Section::new(0, 8)]);
    }

    #[test]
    fn add_piece_keeps_gaps_sorted() {
        let mut d = LineDetail::new();
        d.add_piece(0, Section::new(20, 2));
        d.add_piece(0, Section::new(0, 2));
        d.add_piece(0, Section::new(10, 2));
        assert_eq!(
            d.row(0),
            &[Section::new(0, 2), Section::new(10, 2), Section::new(20, 2)]
        );
    }

    #[test]
    fn add_piece_bridges_several() {
        let mut d = LineDetail::new();
        d.add_piece(0, Section::new(0, 2));
        d.add_piece(0, Section::new(5, 2));
        d.add_piece(0, Section::new(10, 2));
        d.add_piece(0, Section::new(1, 9));
        assert_eq!(d.row(0), &[Section::new(0, 12)]);
    }

    #[test]
    fn add_piece_ignores_empty() {
        let mut d = LineDetail::new();
        d.add_piece(3, Section::new(0, 0));
        assert!(d.is_empty());
    }

    #[test]
    fn filled_triangle_rows() {
        let d = decompose_triangle(p(0, 0), p(10, 0), p(5, 10), true);
        assert_eq!(d.row(0), &[Section::from_bounds(0, 11)]);
        assert_eq!(d.row(10), &[Section::new(5, 1)]);
        for (y, row) in d.rows() {
            assert_eq!(row.len(), 1, "row {y} of a filled triangle is one piece");
        }
        assert_eq!(d.bounds(), PixelRect::new(0, 0, 11, 11));
    }

    #[test]
    fn outline_triangle_keeps_two_pieces_inside() {
        let d = decompose_triangle(p(0, 0), p(10, 0), p(5, 10), false);
        for y in 1..10 {
            let row = d.row(y);
            assert_eq!(row.len(), 2, "interior row {y}");
            assert!(row[0].x <= row[1].x, "row {y} is ordered by x");
        }
        assert_eq!(d.row(0), &[Section::from_bounds(0, 11)]);
        assert_eq!(d.row(10), &[Section::new(5, 1)]);
    }

    #[test]
    fn outline_triangle_vertex_order_is_irrelevant() {
        let a = decompose_triangle(p(0, 0), p(10, 0), p(5, 10), false);
        let b = decompose_triangle(p(5, 10), p(0, 0), p(10, 0), false);
        assert_eq!(a, b);
    }

    #[test]
    fn filled_triangle_covers_outline() {
        let outline = decompose_triangle(p(3, 1), p(17, 6), p(8, 14), false);
        let filled = decompose_triangle(p(3, 1), p(17, 6), p(8, 14), true);
        for (y, row) in outline.rows() {
            let fill = filled.row(y)[0];
            for s in row {
                assert!(fill.x <= s.x && s.end() <= fill.end(), "row {y}");
            }
        }
    }

    #[test]
    fn rect_outline_has_sides() {
        let d = decompose_rect(p(2, 2), 5, 4, false);
        assert_eq!(d.row(2), &[Section::new(2, 5)]);
        assert_eq!(d.row(3), &[Section::new(2, 1), Section::new(6, 1)]);
        assert_eq!(d.row(5), &[Section::new(2, 5)]);
        assert!(d.row(6).is_empty());
    }

    #[test]
    fn narrow_rect_outline_merges_sides() {
        let d = decompose_rect(p(0, 0), 2, 3, false);
        assert_eq!(d.row(1), &[Section::new(0, 2)]);
    }

    #[test]
    fn solid_quad_matches_rect() {
        let quad = decompose_quad([p(0, 0), p(9, 0), p(9, 4), p(0, 4)], true);
        assert_eq!(quad, decompose_rect(p(0, 0), 10, 5, true));
    }

    #[test]
    fn ellipse_is_symmetric_and_bounded() {
        let d = decompose_ellipse(p(10, 10), 21, 11, true);
        assert_eq!(d.bounds(), PixelRect::new(10, 10, 31, 21));
        let mid = d.row(15);
        assert_eq!(mid, &[Section::new(10, 21)]);
        let top = d.row(10)[0];
        let bottom = d.row(20)[0];
        assert_eq!(top, bottom);
        assert_eq!(top.x - 10, 30 - (top.end() - 1), "horizontally centred");
    }

    #[test]
    fn ellipse_outline_is_within_fill() {
        let outline = decompose_ellipse(p(0, 0), 15, 9, false);
        let filled = decompose_ellipse(p(0, 0), 15, 9, true);
        assert_rows_sorted_disjoint(&outline);
        for (y, row) in outline.rows() {
            let fill = filled.row(y)[0];
            for s in row {
                assert!(fill.x <= s.x && s.end() <= fill.end(), "row {y}");
            }
        }
    }

    #[test]
    fn merged_lists_never_overlap() {
        let tris = [
            [p(0, 0), p(10, 0), p(5, 8)],
            [p(4, 2), p(20, 3), p(12, 12)],
            [p(30, 0), p(34, 9), p(26, 9)],
        ];
        assert_rows_sorted_disjoint(&decompose_triangle_list(&tris, false));
        assert_rows_sorted_disjoint(&decompose_triangle_list(&tris, true));
        let fan = [p(0, 0), p(10, 0), p(12, 6), p(6, 12), p(0, 10)];
        assert_rows_sorted_disjoint(&decompose_triangle_fan(&fan, true));
        assert_rows_sorted_disjoint(&decompose_triangle_strip(&fan, false));
    }

    #[test]
    fn quad_strip_joins_members() {
        let pts = [p(0, 0), p(0, 4), p(5, 0), p(5, 4), p(10, 0), p(10, 4)];
        let d = decompose_quad_strip(&pts, true);
        assert_eq!(d.row(2), &[Section::new(0, 11)]);
    }

    #[test]
    fn translated_moves_every_piece() {
        let d = decompose_rect(p(0, 0), 3, 2, true).translated(5, -1);
        assert_eq!(d.bounds(), PixelRect::new(5, -1, 8, 1));
    }
}
