// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-scan-line lists of the primitives that paint on each line.
//!
//! The compositor reads one [`VerticalIndex::entry`] per line and runs the
//! painters it names in order. Entries are kept sorted by paint sequence, so
//! a later-created primitive paints over an earlier one no matter when it
//! entered the line.
//!
//! The scene keeps the index current by diffing a primitive's old and new
//! line ranges with [`diff_ranges`] and applying only the lines that changed.

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::LineRange;
use crate::scene::PrimitiveId;

/// One primitive's place in a line entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Paint sequence number; lower paints first.
    pub seq: u32,
    /// The primitive.
    pub id: PrimitiveId,
}

/// Line-by-line membership of drawable primitives.
#[derive(Clone, Debug)]
pub struct VerticalIndex {
    lines: Vec<Vec<IndexEntry>>,
    inserts: u64,
    removes: u64,
}

impl VerticalIndex {
    /// Creates an index with `lines` empty entries.
    #[must_use]
    pub fn new(lines: u16) -> Self {
        Self {
            lines: vec![Vec::new(); usize::from(lines)],
            inserts: 0,
            removes: 0,
        }
    }

    /// Number of lines covered.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The primitives on `line` in paint order; empty outside the index.
    #[must_use]
    pub fn entry(&self, line: i32) -> &[IndexEntry] {
        usize::try_from(line)
            .ok()
            .and_then(|l| self.lines.get(l))
            .map_or(&[], Vec::as_slice)
    }

    /// Adds `id` to `line` at its paint position.
    ///
    /// Lines outside the index and repeated inserts are ignored.
    pub fn insert(&mut self, line: i32, id: PrimitiveId, seq: u32) {
        let Some(list) = usize::try_from(line)
            .ok()
            .and_then(|l| self.lines.get_mut(l))
        else {
            return;
        };
        let entry = IndexEntry { seq, id };
        match list.last() {
            None => list.push(entry),
            Some(last) if last.seq < seq => list.push(entry),
            Some(_) => match list.binary_search_by_key(&seq, |e| e.seq) {
                Ok(pos) => {
                    debug_assert_eq!(list[pos].id, id, "paint sequence {seq} is shared");
                    return;
                }
                Err(pos) => list.insert(pos, entry),
            },
        }
        self.inserts += 1;
    }

    /// Removes `id` from `line`; absent entries are a no-op.
    pub fn remove(&mut self, line: i32, id: PrimitiveId) {
        let Some(list) = usize::try_from(line)
            .ok()
            .and_then(|l| self.lines.get_mut(l))
        else {
            return;
        };
        if let Some(pos) = list.iter().position(|e| e.id == id) {
            list.remove(pos);
            self.removes += 1;
        }
    }

    /// Inserts `id` on every line of `range`.
    pub fn insert_range(&mut self, range: LineRange, id: PrimitiveId, seq: u32) {
        for line in self.clamp(range) {
            self.insert(line, id, seq);
        }
    }

    /// Removes `id` from every line of `range`.
    pub fn remove_range(&mut self, range: LineRange, id: PrimitiveId) {
        for line in self.clamp(range) {
            self.remove(line, id);
        }
    }

    /// Moves `id` from `old` to `new`, touching only lines that differ.
    pub fn apply_diff(
        &mut self,
        id: PrimitiveId,
        seq: u32,
        old: Option<LineRange>,
        new: Option<LineRange>,
    ) {
        let diff = diff_ranges(old, new);
        for range in diff.removals.into_iter().flatten() {
            self.remove_range(range, id);
        }
        for range in diff.insertions.into_iter().flatten() {
            self.insert_range(range, id, seq);
        }
    }

    /// Total single-line insertions performed.
    #[must_use]
    pub fn insert_count(&self) -> u64 {
        self.inserts
    }

    /// Total single-line removals performed.
    #[must_use]
    pub fn remove_count(&self) -> u64 {
        self.removes
    }

    /// Iterates all lines whose entry contains `id`.
    pub fn lines_of(&self, id: PrimitiveId) -> impl Iterator<Item = i32> + '_ {
        (0_i32..)
            .zip(&self.lines)
            .filter(move |(_, list)| list.iter().any(|e| e.id == id))
            .map(|(line, _)| line)
    }

    fn clamp(&self, range: LineRange) -> core::ops::Range<i32> {
        let end = i32::try_from(self.lines.len()).unwrap_or(i32::MAX);
        range.start.max(0)..range.end.min(end)
    }
}

/// How a primitive's new line range relates to its old one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeCase {
    /// Not in the index before or after.
    Absent,
    /// Enters the index.
    Added,
    /// Leaves the index.
    Removed,
    /// New range lies entirely above the old one.
    FullyAbove,
    /// New range starts above the old one and ends inside it.
    OverlapLeading,
    /// New range lies within the old one (including equal).
    Nested,
    /// New range starts inside the old one and ends below it.
    OverlapTrailing,
    /// New range lies entirely below the old one.
    FullyBelow,
    /// New range strictly contains the old one.
    Superset,
}

/// Lines to remove from and insert into the index for one range change.
///
/// Each side is the set difference of the two ranges and so holds at most
/// two intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeDiff {
    /// How the ranges relate.
    pub case: RangeCase,
    /// Old lines not covered by the new range.
    pub removals: [Option<LineRange>; 2],
    /// New lines not covered by the old range.
    pub insertions: [Option<LineRange>; 2],
}

impl RangeDiff {
    /// Number of lines touched by this diff.
    #[must_use]
    pub fn churn(&self) -> i32 {
        self.removals
            .iter()
            .chain(&self.insertions)
            .flatten()
            .map(|r| r.end - r.start)
            .sum()
    }
}

/// Classifies `new` against `old`.
#[must_use]
pub fn classify(old: Option<LineRange>, new: Option<LineRange>) -> RangeCase {
    match (old, new) {
        (None, None) => RangeCase::Absent,
        (None, Some(_)) => RangeCase::Added,
        (Some(_), None) => RangeCase::Removed,
        (Some(o), Some(n)) => {
            if n.end <= o.start {
                RangeCase::FullyAbove
            } else if n.start >= o.end {
                RangeCase::FullyBelow
            } else if n.start >= o.start && n.end <= o.end {
                RangeCase::Nested
            } else if n.start <= o.start && n.end >= o.end {
                RangeCase::Superset
            } else if n.start < o.start {
                RangeCase::OverlapLeading
            } else {
                RangeCase::OverlapTrailing
            }
        }
    }
}

/// Computes the symmetric difference between an old and a new line range.
#[must_use]
pub fn diff_ranges(old: Option<LineRange>, new: Option<LineRange>) -> RangeDiff {
    RangeDiff {
        case: classify(old, new),
        removals: subtract(old, new),
        insertions: subtract(new, old),
    }
}

/// `a \ b` as up to two ranges.
fn subtract(a: Option<LineRange>, b: Option<LineRange>) -> [Option<LineRange>; 2] {
    let Some(a) = a else {
        return [None, None];
    };
    let Some(b) = b else {
        return [Some(a), None];
    };
    let span = |start: i32, end: i32| (end > start).then(|| LineRange::new(start, end));
    [
        span(a.start, a.end.min(b.start)),
        span(a.start.max(b.end), a.end),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: i32, end: i32) -> Option<LineRange> {
        Some(LineRange::new(start, end))
    }

    fn ids(index: &VerticalIndex, line: i32) -> Vec<u16> {
        index.entry(line).iter().map(|e| e.id.0).collect()
    }

    #[test]
    fn insert_orders_by_sequence() {
        let mut index = VerticalIndex::new(4);
        index.insert(1, PrimitiveId(7), 30);
        index.insert(1, PrimitiveId(3), 10);
        index.insert(1, PrimitiveId(9), 20);
        index.insert(1, PrimitiveId(2), 40);
        assert_eq!(ids(&index, 1), [3, 9, 7, 2]);
        assert_eq!(index.insert_count(), 4);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut index = VerticalIndex::new(4);
        index.insert(0, PrimitiveId(1), 1);
        index.remove(0, PrimitiveId(2));
        index.remove(3, PrimitiveId(1));
        assert_eq!(ids(&index, 0), [1]);
        assert_eq!(index.remove_count(), 0);
    }

    #[test]
    fn out_of_range_lines_are_ignored() {
        let mut index = VerticalIndex::new(4);
        index.insert(-1, PrimitiveId(1), 1);
        index.insert(4, PrimitiveId(1), 1);
        index.insert_range(LineRange::new(-3, 10), PrimitiveId(2), 2);
        assert!(index.entry(-1).is_empty());
        assert_eq!(index.lines_of(PrimitiveId(2)).count(), 4);
        assert_eq!(index.lines_of(PrimitiveId(1)).count(), 0);
    }

    #[test]
    fn fully_above() {
        let d = diff_ranges(r(10, 20), r(2, 8));
        assert_eq!(d.case, RangeCase::FullyAbove);
        assert_eq!(d.removals, [r(10, 20), None]);
        assert_eq!(d.insertions, [r(2, 8), None]);
    }

    #[test]
    fn fully_above_touching() {
        let d = diff_ranges(r(10, 20), r(2, 10));
        assert_eq!(d.case, RangeCase::FullyAbove);
        assert_eq!(d.churn(), 18);
    }

    #[test]
    fn overlap_leading() {
        let d = diff_ranges(r(10, 20), r(5, 15));
        assert_eq!(d.case, RangeCase::OverlapLeading);
        assert_eq!(d.removals, [None, r(15, 20)]);
        assert_eq!(d.insertions, [r(5, 10), None]);
    }

    #[test]
    fn nested() {
        let d = diff_ranges(r(10, 20), r(12, 18));
        assert_eq!(d.case, RangeCase::Nested);
        assert_eq!(d.removals, [r(10, 12), r(18, 20)]);
        assert_eq!(d.insertions, [None, None]);
    }

    #[test]
    fn identical_is_nested_without_churn() {
        let d = diff_ranges(r(10, 20), r(10, 20));
        assert_eq!(d.case, RangeCase::Nested);
        assert_eq!(d.churn(), 0);
    }

    #[test]
    fn overlap_trailing() {
        let d = diff_ranges(r(10, 20), r(15, 25));
        assert_eq!(d.case, RangeCase::OverlapTrailing);
        assert_eq!(d.removals, [r(10, 15), None]);
        assert_eq!(d.insertions, [None, r(20, 25)]);
    }

    #[test]
    fn fully_below() {
        let d = diff_ranges(r(10, 20), r(30, 31));
        assert_eq!(d.case, RangeCase::FullyBelow);
        assert_eq!(d.removals, [r(10, 20), None]);
        assert_eq!(d.insertions, [None, r(30, 31)]);
    }

    #[test]
    fn superset() {
        let d = diff_ranges(r(10, 20), r(5, 25));
        assert_eq!(d.case, RangeCase::Superset);
        assert_eq!(d.removals, [None, None]);
        assert_eq!(d.insertions, [r(5, 10), r(20, 25)]);
    }

    #[test]
    fn enter_and_leave() {
        assert_eq!(diff_ranges(None, r(1, 3)).insertions, [r(1, 3), None]);
        assert_eq!(diff_ranges(r(1, 3), None).removals, [r(1, 3), None]);
        assert_eq!(diff_ranges(None, None).case, RangeCase::Absent);
    }

    #[test]
    fn apply_diff_matches_rebuild() {
        let cases = [
            (r(10, 20), r(2, 8)),
            (r(10, 20), r(5, 15)),
            (r(10, 20), r(12, 18)),
            (r(10, 20), r(15, 25)),
            (r(10, 20), r(30, 31)),
            (r(10, 20), r(5, 25)),
        ];
        for (old, new) in cases {
            let mut index = VerticalIndex::new(40);
            let id = PrimitiveId(5);
            index.apply_diff(id, 1, None, old);
            index.apply_diff(id, 1, old, new);
            let lines: Vec<i32> = index.lines_of(id).collect();
            let expected: Vec<i32> = new.map(|n| (n.start..n.end).collect()).unwrap_or_default();
            assert_eq!(lines, expected, "{old:?} -> {new:?}");
        }
    }
}
