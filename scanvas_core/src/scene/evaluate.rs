// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene flush and change tracking.
//!
//! A flush follows a drain-recompute pattern:
//!
//! 1. **GEOMETRY**: drain the affected primitives (marked ones and their
//!    descendants), sort them parent-before-child and recompute absolute
//!    position, view rectangle, draw extent and `drawable` for each. The
//!    old and new line ranges are diffed and only the difference is applied
//!    to the [`VerticalIndex`](crate::vertical::VerticalIndex). Painters are
//!    rebuilt unless the placement is unchanged or the set survives the move.
//! 2. **APPEARANCE**: drain and rebuild painters unconditionally, including
//!    those of bitmaps referencing a changed bitmap.
//! 3. **TOPOLOGY**: drain for the change report.
//!
//! [`SceneChanges`] reports what the flush did, so tracing and tests can
//! observe index churn and painter work.

use alloc::collections::BTreeSet;
use alloc::rc::Rc;
use alloc::vec::Vec;

use super::flags::PrimitiveFlags;
use super::id::{INVALID, PrimitiveId};
use super::shape::{BitmapSource, Shape};
use super::store::Scene;
use crate::bitmap::{Bitmap, PixelMode};
use crate::dirty;
use crate::geometry::{LineRange, PixelRect, Point};
use crate::painter::{PaintContent, PaintJob, ScrollMode, compile_set};
use crate::vertical::{RangeCase, classify, diff_ranges};

/// One primitive's move in the vertical index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeChange {
    /// The primitive.
    pub id: PrimitiveId,
    /// Lines covered before, if indexed.
    pub old: Option<LineRange>,
    /// Lines covered after, if indexed.
    pub new: Option<LineRange>,
    /// How the ranges relate.
    pub case: RangeCase,
}

impl RangeChange {
    /// Number of index lines touched.
    #[must_use]
    pub fn churn(&self) -> i32 {
        diff_ranges(self.old, self.new).churn()
    }
}

/// The set of changes produced by a single [`Scene::recompute`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Primitives whose geometry was recomputed.
    pub geometry: Vec<PrimitiveId>,
    /// Primitives whose color or content changed.
    pub appearance: Vec<PrimitiveId>,
    /// Primitives created since the last flush.
    pub added: Vec<PrimitiveId>,
    /// Primitives destroyed since the last flush.
    pub removed: Vec<PrimitiveId>,
    /// Index updates.
    pub ranges: Vec<RangeChange>,
    /// Primitives whose painters were compiled.
    pub rebuilt: Vec<PrimitiveId>,
    /// Primitives that moved and kept their painters.
    pub reused: Vec<PrimitiveId>,
    /// Primitives that stopped drawing and lost their painters.
    pub dropped: Vec<PrimitiveId>,
    /// Whether the tree shape changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.appearance.clear();
        self.added.clear();
        self.removed.clear();
        self.ranges.clear();
        self.rebuilt.clear();
        self.reused.clear();
        self.dropped.clear();
        self.topology_changed = false;
    }

    /// Total index lines touched.
    #[must_use]
    pub fn index_churn(&self) -> i32 {
        self.ranges.iter().map(RangeChange::churn).sum()
    }
}

/// Placement a painter set was compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PaintKey {
    origin: Point,
    window: PixelRect,
    scroll: ScrollMode,
}

impl Scene {
    /// Drains every dirty channel, bringing computed geometry, the vertical
    /// index and painters up to date.
    ///
    /// Every mutation calls this; it only needs calling directly after
    /// content streams (see [`finish_stream`](Self::finish_stream)).
    pub fn recompute(&mut self) -> &SceneChanges {
        self.flush(false);
        &self.changes
    }

    /// Recomputes the geometry of every attached primitive top-down, with
    /// the root limited to `view` (clamped to the screen).
    pub fn compute_absolute_geometry(&mut self, view: PixelRect) -> &SceneChanges {
        self.root_view = view.intersect(&self.display.screen_rect());
        self.flush(true);
        &self.changes
    }

    fn flush(&mut self, full: bool) {
        let mut changes = core::mem::take(&mut self.changes);
        changes.clear();

        let mut order: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        if full {
            order.extend(self.subtree(0));
        }
        order.retain(|&i| self.live[i as usize]);
        order.sort_unstable_by_key(|&i| (self.depth(i), i));
        order.dedup();

        let appearance: Vec<u32> = self
            .dirty
            .drain(dirty::APPEARANCE)
            .deterministic()
            .run()
            .collect();
        let mut rebuild = BTreeSet::new();
        for &i in &appearance {
            if !self.live[i as usize] {
                continue;
            }
            changes.appearance.push(PrimitiveId::from_index(i));
            rebuild.insert(i);
            if self.shape[i as usize].owned_bitmap().is_some() {
                rebuild.extend(self.referencers(i));
            }
        }

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        for &i in &order {
            self.update_geometry(i);
            self.update_index(i, &mut changes);
            if !rebuild.contains(&i) {
                self.refresh_painters(i, &mut changes);
            }
            changes.geometry.push(PrimitiveId::from_index(i));
        }
        for i in rebuild {
            self.rebuild_painters(i, &mut changes);
        }

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        changes.topology_changed =
            !topology.is_empty() || !changes.added.is_empty() || !changes.removed.is_empty();
        self.changes = changes;
        self.flushes += 1;
    }

    /// Recomputes one primitive from its parent's computed state.
    ///
    /// The parent must already be up to date.
    fn update_geometry(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i];
        let (parent_abs, incoming, attached, allowed) = if idx == 0 {
            (Point::default(), self.root_view, true, true)
        } else if p == INVALID {
            (Point::default(), PixelRect::EMPTY, false, false)
        } else {
            let p = p as usize;
            (
                self.absolute[p],
                self.child_view[p],
                self.attached[p],
                self.children_paint[p],
            )
        };

        let flags = self.flags[i];
        let pos = self.position[i];
        let abs = if flags.contains(PrimitiveFlags::ABSOLUTE) {
            pos
        } else {
            parent_abs.offset(pos.x, pos.y)
        };
        let (w, h) = self.size[i];
        let own = PixelRect::from_origin_size(abs, w, h);
        let view = if flags.contains(PrimitiveFlags::CLIP_SELF) {
            incoming.intersect(&own)
        } else {
            incoming
        };
        let extent = own.intersect(&view);

        self.absolute[i] = abs;
        self.view[i] = view;
        self.extent[i] = extent;
        self.child_view[i] = if flags.contains(PrimitiveFlags::CLIP_CHILDREN) {
            extent
        } else {
            view
        };
        self.attached[i] = attached;
        self.children_paint[i] = allowed && flags.contains(PrimitiveFlags::PAINT_CHILDREN);
        self.drawable[i] = attached
            && allowed
            && flags.contains(PrimitiveFlags::PAINT_SELF)
            && self.can_paint(i)
            && !extent.is_empty();
    }

    /// Whether the shape has anything to paint.
    fn can_paint(&self, i: usize) -> bool {
        match &self.shape[i] {
            Shape::Group => false,
            Shape::Lines(detail) => !detail.is_empty(),
            Shape::Bitmap {
                source: BitmapSource::Reference(source),
                ..
            } => self
                .slot(*source)
                .is_some_and(|s| self.shape[s as usize].owned_bitmap().is_some()),
            Shape::Root | Shape::Bitmap { .. } | Shape::Tiles(_) | Shape::Terminal(_) => true,
        }
    }

    fn update_index(&mut self, idx: u32, changes: &mut SceneChanges) {
        let i = idx as usize;
        let new = if self.drawable[i] {
            self.extent[i].line_range()
        } else {
            None
        };
        let old = self.indexed[i];
        if old == new {
            return;
        }
        let id = PrimitiveId::from_index(idx);
        self.index.apply_diff(id, self.seq[i], old, new);
        self.indexed[i] = new;
        changes.ranges.push(RangeChange {
            id,
            old,
            new,
            case: classify(old, new),
        });
    }

    fn paint_key(&self, i: usize) -> PaintKey {
        let origin = self.absolute[i];
        PaintKey {
            origin,
            window: self.extent[i].offset(-origin.x, -origin.y),
            scroll: ScrollMode::from_flags(self.flags[i]),
        }
    }

    /// Keeps, reuses or rebuilds painters after a geometry change.
    fn refresh_painters(&mut self, idx: u32, changes: &mut SceneChanges) {
        let i = idx as usize;
        if !self.drawable[i] {
            self.drop_painters(idx, changes);
            return;
        }
        let key = self.paint_key(i);
        let Some((set, old)) = self.painters[i].as_ref().zip(self.paint_keys[i]) else {
            self.rebuild_painters(idx, changes);
            return;
        };
        if old == key {
            return;
        }
        let (w, h) = self.size[i];
        let unclipped = key.window == PixelRect::new(0, 0, w, h);
        if old.window == key.window
            && set.reusable_after_move(self.size[i], unclipped, key.scroll, key.origin.x)
        {
            self.paint_keys[i] = Some(key);
            changes.reused.push(PrimitiveId::from_index(idx));
        } else {
            self.rebuild_painters(idx, changes);
        }
    }

    fn drop_painters(&mut self, idx: u32, changes: &mut SceneChanges) {
        let i = idx as usize;
        self.paint_keys[i] = None;
        if self.painters[i].take().is_some() {
            changes.dropped.push(PrimitiveId::from_index(idx));
        }
    }

    /// Compiles a fresh painter set from the primitive's current state.
    fn rebuild_painters(&mut self, idx: u32, changes: &mut SceneChanges) {
        let i = idx as usize;
        if !self.live[i] || !self.drawable[i] {
            self.drop_painters(idx, changes);
            return;
        }
        let key = self.paint_key(i);
        let color = self.color[i];
        let rasterized: Option<Bitmap>;
        let content = match &self.shape[i] {
            Shape::Root => Some(PaintContent::Fill(color)),
            Shape::Group => None,
            Shape::Lines(detail) => Some(PaintContent::Spans { detail, color }),
            Shape::Bitmap { source, mode } => {
                let bitmap = match source {
                    BitmapSource::Owned(bitmap) => Some(bitmap),
                    BitmapSource::Reference(s) => self
                        .slot(*s)
                        .and_then(|s| self.shape[s as usize].owned_bitmap()),
                };
                bitmap.map(|bitmap| PaintContent::Image {
                    bitmap,
                    mode: *mode,
                })
            }
            Shape::Tiles(tiles) => {
                rasterized = tiles.rasterize();
                rasterized.as_ref().map(|bitmap| PaintContent::Image {
                    bitmap,
                    mode: PixelMode::Transparent,
                })
            }
            Shape::Terminal(terminal) => {
                rasterized = terminal.rasterize();
                rasterized.as_ref().map(|bitmap| PaintContent::Image {
                    bitmap,
                    mode: PixelMode::Transparent,
                })
            }
        };
        let set = content.map(|content| {
            compile_set(&PaintJob {
                content,
                origin: key.origin,
                size: self.size[i],
                window: key.window,
                scroll: key.scroll,
                sync_bits: self.display.sync_bits,
            })
        });

        let Some(set) = set else {
            self.drop_painters(idx, changes);
            return;
        };
        self.painters[i] = Some(Rc::new(set));
        self.paint_keys[i] = Some(key);
        changes.rebuilt.push(PrimitiveId::from_index(idx));
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::color::Color;
    use crate::display::DisplayConfig;
    use crate::scene::{PrimitiveSpec, SceneConfig};

    const A: PrimitiveId = PrimitiveId(1);
    const B: PrimitiveId = PrimitiveId(2);

    fn scene() -> Scene {
        Scene::new(DisplayConfig::qvga_320x240(), SceneConfig::compact())
    }

    fn solid(x: i32, y: i32, w: i32, h: i32) -> PrimitiveSpec {
        PrimitiveSpec::rect(Point::new(x, y), w, h, true, Color::WHITE)
    }

    /// Independently derives the draw extent of `id` from local state, or
    /// `None` when it should not draw.
    fn expected_extent(s: &Scene, id: PrimitiveId) -> Option<PixelRect> {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            chain.push(c);
            cur = s.parent(c);
        }
        if chain.last() != Some(&PrimitiveId::ROOT) {
            return None;
        }
        let mut abs = Point::default();
        let mut view = s.display().screen_rect();
        let mut extent = PixelRect::EMPTY;
        let mut allowed = true;
        for (depth, &c) in chain.iter().rev().enumerate() {
            if depth > 0 && !allowed {
                return None;
            }
            let flags = s.flags(c)?;
            let pos = s.position(c)?;
            abs = if flags.contains(PrimitiveFlags::ABSOLUTE) {
                pos
            } else {
                abs.offset(pos.x, pos.y)
            };
            let (w, h) = s.size(c)?;
            let own = PixelRect::from_origin_size(abs, w, h);
            if flags.contains(PrimitiveFlags::CLIP_SELF) {
                view = view.intersect(&own);
            }
            extent = own.intersect(&view);
            if c != id && flags.contains(PrimitiveFlags::CLIP_CHILDREN) {
                view = extent;
            }
            allowed = flags.contains(PrimitiveFlags::PAINT_CHILDREN);
        }
        let flags = s.flags(id)?;
        let paints = flags.contains(PrimitiveFlags::PAINT_SELF)
            && !matches!(s.shape(id)?, Shape::Group)
            && !extent.is_empty();
        paints.then_some(extent)
    }

    /// Checks every index line against a brute-force membership rebuild.
    fn assert_index_consistent(s: &Scene) {
        let ids: Vec<PrimitiveId> = (0..s.config().max_primitives)
            .map(PrimitiveId)
            .filter(|&id| s.is_live(id))
            .collect();
        for &id in &ids {
            let expected = expected_extent(s, id);
            assert_eq!(
                s.is_drawable(id),
                expected.is_some(),
                "drawable mismatch for {id}"
            );
            if let Some(e) = expected {
                assert_eq!(s.draw_extent(id), Some(e), "extent mismatch for {id}");
            }
        }
        for line in 0..i32::from(s.display().active_lines) {
            let mut want: Vec<(u32, PrimitiveId)> = ids
                .iter()
                .filter(|&&id| {
                    expected_extent(s, id)
                        .and_then(|e| e.line_range())
                        .is_some_and(|r| r.contains(line))
                })
                .map(|&id| (s.paint_seq(id).unwrap(), id))
                .collect();
            want.sort_unstable();
            let got: Vec<(u32, PrimitiveId)> =
                s.index().entry(line).iter().map(|e| (e.seq, e.id)).collect();
            assert_eq!(got, want, "index line {line}");
        }
    }

    /// Small deterministic generator for mutation sequences.
    struct XorShift(u32);

    impl XorShift {
        fn next(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }

        fn below(&mut self, n: u32) -> i32 {
            i32::try_from(self.next() % n).unwrap()
        }
    }

    #[test]
    fn index_matches_brute_force_under_random_mutation() {
        let mut s = scene();
        let mut rng = XorShift(0x2545_F491);
        for step in 0..400 {
            let id = PrimitiveId(u16::try_from(1 + rng.below(12)).unwrap());
            let other = PrimitiveId(u16::try_from(rng.below(13)).unwrap());
            let flag_bits = u16::try_from(rng.below(0x80)).unwrap();
            let _ = match rng.below(8) {
                0 | 1 => {
                    let spec = if rng.below(3) == 0 {
                        PrimitiveSpec::group(PixelRect::new(
                            rng.below(200) - 20,
                            rng.below(200) - 20,
                            rng.below(300),
                            rng.below(260),
                        ))
                    } else {
                        solid(
                            rng.below(340) - 10,
                            rng.below(260) - 10,
                            rng.below(60),
                            rng.below(60),
                        )
                    };
                    s.create(id, other, PrimitiveFlags::from_wire(flag_bits), spec)
                        .map(|_| ())
                }
                2 => s.move_relative(id, rng.below(41) - 20, rng.below(41) - 20),
                3 => s.move_absolute(id, rng.below(320), rng.below(240) - 30),
                4 => s.set_flags(id, PrimitiveFlags::from_wire(flag_bits)),
                5 => s.attach(id, other),
                6 => s.detach(id),
                _ => s.delete(id),
            };
            if step % 7 == 0 {
                assert_index_consistent(&s);
            }
        }
        assert_index_consistent(&s);
    }

    #[test]
    fn set_flags_twice_causes_no_churn() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(10, 10, 20, 20))
            .unwrap();
        let flags = PrimitiveFlags::VISIBLE | PrimitiveFlags::BLENDED;
        s.set_flags(A, flags).unwrap();
        let (ins, rem) = (s.index().insert_count(), s.index().remove_count());
        s.set_flags(A, flags).unwrap();
        assert_eq!(s.index().insert_count(), ins);
        assert_eq!(s.index().remove_count(), rem);
    }

    #[test]
    fn move_down_touches_only_changed_lines() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 10, 8, 20))
            .unwrap();
        s.move_relative(A, 0, 5).unwrap();
        let change = s.last_changes().ranges[0];
        assert_eq!(change.case, RangeCase::OverlapTrailing);
        assert_eq!(change.churn(), 10);
        assert_eq!(s.index().lines_of(A).collect::<Vec<_>>(), (15..35).collect::<Vec<_>>());
    }

    #[test]
    fn clip_children_limits_descendants() {
        let mut s = scene();
        let clip = PrimitiveFlags::VISIBLE | PrimitiveFlags::CLIP_CHILDREN;
        s.create(
            A,
            PrimitiveId::ROOT,
            clip,
            PrimitiveSpec::group(PixelRect::new(10, 10, 30, 30)),
        )
        .unwrap();
        s.create(B, A, PrimitiveFlags::VISIBLE, solid(-5, 15, 10, 10)).unwrap();
        assert_eq!(s.draw_extent(B), Some(PixelRect::new(10, 25, 15, 30)));
        assert_eq!(s.absolute_position(B), Some(Point::new(5, 25)));
    }

    #[test]
    fn absolute_ignores_parent_offset() {
        let mut s = scene();
        s.create(
            A,
            PrimitiveId::ROOT,
            PrimitiveFlags::VISIBLE,
            PrimitiveSpec::group(PixelRect::new(100, 100, 200, 200)),
        )
        .unwrap();
        let flags = PrimitiveFlags::VISIBLE | PrimitiveFlags::ABSOLUTE;
        s.create(B, A, flags, solid(3, 4, 2, 2)).unwrap();
        assert_eq!(s.absolute_position(B), Some(Point::new(3, 4)));
        assert!(s.is_drawable(B));
    }

    #[test]
    fn paint_children_gates_descendants() {
        let mut s = scene();
        s.create(
            A,
            PrimitiveId::ROOT,
            PrimitiveFlags::PAINT_SELF,
            PrimitiveSpec::group(PixelRect::new(0, 0, 50, 50)),
        )
        .unwrap();
        s.create(B, A, PrimitiveFlags::VISIBLE, solid(0, 0, 4, 4)).unwrap();
        assert!(!s.is_drawable(B));
        s.set_flags(A, PrimitiveFlags::VISIBLE).unwrap();
        assert!(s.is_drawable(B));
        assert_eq!(s.index().lines_of(B).count(), 4);
    }

    #[test]
    fn later_creation_paints_later() {
        let mut s = scene();
        s.create(B, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 0, 4, 4))
            .unwrap();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 0, 4, 4))
            .unwrap();
        let ids: Vec<_> = s.index().entry(1).iter().map(|e| e.id).collect();
        assert_eq!(ids, [PrimitiveId::ROOT, B, A]);
    }

    #[test]
    fn overlapping_lines_run_painters_in_order() {
        let mut s = scene();
        let red = Color::opaque_rgb(3, 0, 0);
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 10, 4, 10))
            .unwrap();
        s.create(
            B,
            PrimitiveId::ROOT,
            PrimitiveFlags::VISIBLE,
            PrimitiveSpec::rect(Point::new(0, 15), 4, 10, true, red),
        )
        .unwrap();
        let sync = s.display().sync_bits;
        let mut buf = alloc::vec![0; 320];

        assert_eq!(s.paint_line(17, &mut buf), 3, "background, A, then B");
        assert_eq!(buf[0], red.to_pixel(sync), "B paints over A");
        assert_eq!(s.paint_line(12, &mut buf), 2);
        assert_eq!(buf[0], Color::WHITE.to_pixel(sync));
        assert_eq!(s.paint_line(22, &mut buf), 2);
        assert_eq!(buf[0], red.to_pixel(sync));
        assert_eq!(s.paint_line(25, &mut buf), 1, "only the background");
        assert_eq!(s.paint_line(9, &mut buf), 1, "only the background");
    }

    #[test]
    fn fine_scroller_reuses_painters() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE | PrimitiveFlags::H_SCROLL_1;
        s.create(A, PrimitiveId::ROOT, flags, solid(10, 10, 8, 8)).unwrap();
        let before = Rc::clone(s.painters(A).unwrap());
        s.move_relative(A, 1, 0).unwrap();
        assert_eq!(s.last_changes().reused, [A]);
        assert!(Rc::ptr_eq(&before, s.painters(A).unwrap()));

        s.move_absolute(A, -2, 10).unwrap();
        assert_eq!(s.last_changes().rebuilt, [A], "clipped by the screen edge");
    }

    #[test]
    fn coarse_scroller_rebuilds_off_phase() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE | PrimitiveFlags::H_SCROLL_4;
        s.create(A, PrimitiveId::ROOT, flags, solid(8, 10, 8, 8)).unwrap();
        s.move_relative(A, 4, 0).unwrap();
        assert_eq!(s.last_changes().reused, [A]);
        s.move_relative(A, 1, 0).unwrap();
        assert_eq!(s.last_changes().rebuilt, [A]);
    }

    #[test]
    fn stationary_move_rebuilds() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(8, 10, 8, 8))
            .unwrap();
        s.move_relative(A, 4, 0).unwrap();
        assert_eq!(s.last_changes().rebuilt, [A]);
    }

    #[test]
    fn color_change_rebuilds_without_index_churn() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 0, 4, 4))
            .unwrap();
        s.set_color(A, Color(0x55)).unwrap();
        let changes = s.last_changes();
        assert_eq!(changes.rebuilt, [A]);
        assert!(changes.ranges.is_empty());
    }

    #[test]
    fn reference_follows_its_source() {
        let mut s = scene();
        s.create(
            A,
            PrimitiveId::ROOT,
            PrimitiveFlags::VISIBLE,
            PrimitiveSpec::bitmap(4, 2, PixelMode::Solid),
        )
        .unwrap();
        let spec = PrimitiveSpec::bitmap_reference(A, PixelMode::Solid).at(Point::new(10, 10));
        s.create(B, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, spec).unwrap();
        assert_eq!(s.size(B), Some((4, 2)));
        assert!(s.is_drawable(B));

        s.set_bitmap_pixel(A, 0, 0, Color::WHITE).unwrap();
        assert!(s.last_changes().rebuilt.contains(&B));

        s.delete(A).unwrap();
        assert!(!s.is_drawable(B));
        assert!(s.painters(B).is_none());
    }

    #[test]
    fn view_rect_limits_the_root() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, solid(0, 0, 50, 50))
            .unwrap();
        s.compute_absolute_geometry(PixelRect::new(0, 0, 320, 20));
        assert_eq!(s.draw_extent(A), Some(PixelRect::new(0, 0, 50, 20)));
        assert!(s.index().entry(30).is_empty());
    }
}
