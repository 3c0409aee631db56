// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays primitive storage with topology and property management.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::error::SceneError;
use super::evaluate::{PaintKey, SceneChanges};
use super::flags::PrimitiveFlags;
use super::id::{INVALID, PrimitiveId};
use super::shape::{BitmapSource, PrimitiveSpec, Shape, ShapeSpec};
use super::traverse::Children;
use crate::color::{Color, Pixel};
use crate::dirty;
use crate::display::DisplayConfig;
use crate::geometry::{LineRange, PixelRect, Point};
use crate::painter::PainterSet;
use crate::vertical::VerticalIndex;

/// Sizing of the primitive table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Size of the ID space, root included. Valid IDs are
    /// `1..max_primitives`.
    pub max_primitives: u16,
    /// Most primitives that may be live at once, root excluded.
    pub capacity: u16,
    /// Most bytes the content of one bitmap, tile or terminal primitive may
    /// take.
    pub content_budget: u32,
}

impl SceneConfig {
    /// A full-size table.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            max_primitives: 1024,
            capacity: 1023,
            content_budget: 4 << 20,
        }
    }

    /// A small table for memory-constrained builds.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            max_primitives: 256,
            capacity: 128,
            content_budget: 256 << 10,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Automatic per-frame movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Motion {
    /// Horizontal step per frame.
    pub dx: i32,
    /// Vertical step per frame.
    pub dy: i32,
    /// Frames left to move.
    pub remaining: u16,
}

/// The primitive tree, its computed geometry, the vertical index and the
/// compiled painters.
///
/// Primitives are addressed by [`PrimitiveId`]; each occupies the slot of
/// its ID in parallel arrays. Every mutation marks dirty channels and ends
/// with [`recompute`](Self::recompute), so the index and painters always
/// match the tree between calls.
#[derive(Debug)]
pub struct Scene {
    // -- Topology --
    pub(crate) live: Vec<bool>,
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) position: Vec<Point>,
    pub(crate) size: Vec<(i32, i32)>,
    pub(crate) flags: Vec<PrimitiveFlags>,
    pub(crate) color: Vec<Color>,
    pub(crate) motion: Vec<Motion>,
    pub(crate) shape: Vec<Shape>,
    pub(crate) seq: Vec<u32>,

    // -- Computed properties (written by recompute) --
    pub(crate) absolute: Vec<Point>,
    pub(crate) view: Vec<PixelRect>,
    pub(crate) extent: Vec<PixelRect>,
    pub(crate) child_view: Vec<PixelRect>,
    pub(crate) attached: Vec<bool>,
    pub(crate) children_paint: Vec<bool>,
    pub(crate) drawable: Vec<bool>,
    pub(crate) indexed: Vec<Option<LineRange>>,
    pub(crate) painters: Vec<Option<Rc<PainterSet>>>,
    pub(crate) paint_keys: Vec<Option<PaintKey>>,

    // -- Bookkeeping --
    pub(crate) live_count: u16,
    pub(crate) next_seq: u32,
    pub(crate) root_view: PixelRect,
    pub(crate) active_terminal: Option<PrimitiveId>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<PrimitiveId>,
    pub(crate) pending_removed: Vec<PrimitiveId>,
    pub(crate) changes: SceneChanges,
    pub(crate) flushes: u64,

    pub(crate) index: VerticalIndex,
    pub(crate) display: DisplayConfig,
    pub(crate) config: SceneConfig,
}

impl Scene {
    /// Creates a scene holding only the root, which fills the screen in
    /// opaque black.
    #[must_use]
    pub fn new(display: DisplayConfig, config: SceneConfig) -> Self {
        let n = usize::from(config.max_primitives.max(1));
        let screen = display.screen_rect();
        let mut scene = Self {
            live: vec![false; n],
            parent: vec![INVALID; n],
            first_child: vec![INVALID; n],
            last_child: vec![INVALID; n],
            next_sibling: vec![INVALID; n],
            prev_sibling: vec![INVALID; n],
            position: vec![Point::default(); n],
            size: vec![(0, 0); n],
            flags: vec![PrimitiveFlags::NONE; n],
            color: vec![Color::BLACK; n],
            motion: vec![Motion::default(); n],
            shape: vec![Shape::Group; n],
            seq: vec![0; n],
            absolute: vec![Point::default(); n],
            view: vec![PixelRect::EMPTY; n],
            extent: vec![PixelRect::EMPTY; n],
            child_view: vec![PixelRect::EMPTY; n],
            attached: vec![false; n],
            children_paint: vec![false; n],
            drawable: vec![false; n],
            indexed: vec![None; n],
            painters: vec![None; n],
            paint_keys: vec![None; n],
            live_count: 0,
            next_seq: 1,
            root_view: screen,
            active_terminal: None,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            changes: SceneChanges::default(),
            flushes: 0,
            index: VerticalIndex::new(display.active_lines),
            display,
            config,
        };

        scene.live[0] = true;
        scene.flags[0] = PrimitiveFlags::VISIBLE;
        scene.shape[0] = Shape::Root;
        scene.size[0] = (screen.width(), screen.height());
        scene.dirty.mark_with(0, dirty::GEOMETRY, &EagerPolicy);
        scene.recompute();
        scene
    }

    // -- Topology API --

    /// Creates a primitive under `parent` and returns its ID.
    ///
    /// A primitive already live under `id` is deleted first, together with
    /// its subtree. The new primitive paints above everything created
    /// before it.
    ///
    /// # Errors
    ///
    /// - [`SceneError::InvalidId`] for the root or an ID outside the table.
    /// - [`SceneError::UnknownParent`] if `parent` is not live or would be
    ///   deleted by the replacement.
    /// - [`SceneError::TableFull`] when no capacity is left.
    /// - [`SceneError::UnknownTarget`] / [`SceneError::WrongKind`] if a
    ///   bitmap reference does not name a live owned bitmap.
    /// - [`SceneError::OutOfBounds`] if the size (or a tile grid's full
    ///   size) does not fit 16 bits, or the content would exceed
    ///   [`SceneConfig::content_budget`].
    ///
    /// On error nothing changes.
    pub fn create(
        &mut self,
        id: PrimitiveId,
        parent: PrimitiveId,
        flags: PrimitiveFlags,
        spec: PrimitiveSpec,
    ) -> Result<PrimitiveId, SceneError> {
        if id.is_root() || usize::from(id.0) >= self.live.len() {
            return Err(SceneError::InvalidId(id.0));
        }
        let idx = id.index();
        let replaced = self.live[idx as usize].then_some(idx);

        let p = self
            .slot(parent)
            .filter(|&p| !replaced.is_some_and(|r| self.is_within(p, r)))
            .ok_or(SceneError::UnknownParent(parent))?;

        let freed = replaced.map_or(0, |r| self.subtree(r).len());
        if usize::from(self.live_count) - freed >= usize::from(self.config.capacity) {
            return Err(SceneError::TableFull);
        }

        let mut spec = spec;
        if let ShapeSpec::Built(Shape::Bitmap {
            source: BitmapSource::Reference(source),
            ..
        }) = spec.shape
        {
            let s = self
                .slot(source)
                .filter(|&s| !replaced.is_some_and(|r| self.is_within(s, r)))
                .ok_or(SceneError::UnknownTarget(source))?;
            let bitmap = self.shape[s as usize]
                .owned_bitmap()
                .ok_or(SceneError::WrongKind(source))?;
            spec.size = (i32::from(bitmap.width()), i32::from(bitmap.height()));
        }
        let limit = i32::from(u16::MAX);
        if !(0..=limit).contains(&spec.size.0)
            || !(0..=limit).contains(&spec.size.1)
            || !spec.shape.content_fits()
            || spec.shape.content_bytes() > u64::from(self.config.content_budget)
        {
            return Err(SceneError::OutOfBounds(id));
        }

        if let Some(r) = replaced {
            self.destroy_subtree(r);
        }

        let i = idx as usize;
        self.live[i] = true;
        self.position[i] = spec.position;
        self.size[i] = spec.size;
        self.flags[i] = flags.with(PrimitiveFlags::DRAWABLE, false);
        self.color[i] = spec.color;
        self.motion[i] = Motion::default();
        self.shape[i] = spec.shape.build();
        self.seq[i] = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.reset_computed(i);
        self.live_count += 1;

        self.link_last(idx, p);
        let _ = self.dirty.add_dependency(idx, p, dirty::GEOMETRY);
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.mark_referencers(idx);
        self.pending_added.push(id);

        self.recompute();
        Ok(id)
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root or when `parent` lies inside
    /// `child`'s subtree, [`SceneError::UnknownTarget`] /
    /// [`SceneError::UnknownParent`] when either is not live.
    pub fn attach(&mut self, child: PrimitiveId, parent: PrimitiveId) -> Result<(), SceneError> {
        let c = self.target(child)?;
        let p = self.slot(parent).ok_or(SceneError::UnknownParent(parent))?;
        if self.is_within(p, c) {
            return Err(SceneError::InvalidId(child.0));
        }

        self.unlink(c);
        self.link_last(c, p);
        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);

        self.recompute();
        Ok(())
    }

    /// Detaches `child` from its parent. A detached subtree stays live but
    /// never draws.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root, [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn detach(&mut self, child: PrimitiveId) -> Result<(), SceneError> {
        let c = self.target(child)?;
        if self.parent[c as usize] == INVALID {
            return Ok(());
        }
        self.unlink(c);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);

        self.recompute();
        Ok(())
    }

    /// Deletes a primitive and its whole subtree.
    ///
    /// Bitmaps referencing a deleted bitmap stop drawing until a bitmap is
    /// created under that ID again.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root, [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn delete(&mut self, id: PrimitiveId) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        self.destroy_subtree(idx);
        self.recompute();
        Ok(())
    }

    /// Returns whether `id` is live.
    #[must_use]
    pub fn is_live(&self, id: PrimitiveId) -> bool {
        self.slot(id).is_some()
    }

    /// Returns the parent of a live primitive, if attached.
    #[must_use]
    pub fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        let p = self.parent[self.slot(id)? as usize];
        (p != INVALID).then(|| PrimitiveId::from_index(p))
    }

    /// Returns an iterator over the direct children of a live primitive.
    #[must_use]
    pub fn children(&self, id: PrimitiveId) -> Option<Children<'_>> {
        let idx = self.slot(id)?;
        Some(Children::new(self, self.first_child[idx as usize]))
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the flags of a live primitive, with
    /// [`DRAWABLE`](PrimitiveFlags::DRAWABLE) reflecting the last flush.
    #[must_use]
    pub fn flags(&self, id: PrimitiveId) -> Option<PrimitiveFlags> {
        let i = self.slot(id)? as usize;
        Some(self.flags[i].with(PrimitiveFlags::DRAWABLE, self.drawable[i]))
    }

    /// Returns the position relative to the parent.
    #[must_use]
    pub fn position(&self, id: PrimitiveId) -> Option<Point> {
        Some(self.position[self.slot(id)? as usize])
    }

    /// Returns the computed absolute position.
    #[must_use]
    pub fn absolute_position(&self, id: PrimitiveId) -> Option<Point> {
        Some(self.absolute[self.slot(id)? as usize])
    }

    /// Returns the width and height.
    #[must_use]
    pub fn size(&self, id: PrimitiveId) -> Option<(i32, i32)> {
        Some(self.size[self.slot(id)? as usize])
    }

    /// Returns the computed view rectangle.
    #[must_use]
    pub fn view_rect(&self, id: PrimitiveId) -> Option<PixelRect> {
        Some(self.view[self.slot(id)? as usize])
    }

    /// Returns the computed draw extent in screen coordinates.
    #[must_use]
    pub fn draw_extent(&self, id: PrimitiveId) -> Option<PixelRect> {
        Some(self.extent[self.slot(id)? as usize])
    }

    /// Returns whether the primitive currently paints; `false` when not live.
    #[must_use]
    pub fn is_drawable(&self, id: PrimitiveId) -> bool {
        self.slot(id).is_some_and(|i| self.drawable[i as usize])
    }

    /// Returns the color.
    #[must_use]
    pub fn color(&self, id: PrimitiveId) -> Option<Color> {
        Some(self.color[self.slot(id)? as usize])
    }

    /// Returns the pending automatic motion.
    #[must_use]
    pub fn motion(&self, id: PrimitiveId) -> Option<Motion> {
        Some(self.motion[self.slot(id)? as usize])
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self, id: PrimitiveId) -> Option<&Shape> {
        Some(&self.shape[self.slot(id)? as usize])
    }

    /// Returns the current painter set, if the primitive is drawable.
    #[must_use]
    pub fn painters(&self, id: PrimitiveId) -> Option<&Rc<PainterSet>> {
        self.painters[self.slot(id)? as usize].as_ref()
    }

    /// Returns the paint sequence number; higher paints later.
    #[must_use]
    pub fn paint_seq(&self, id: PrimitiveId) -> Option<u32> {
        Some(self.seq[self.slot(id)? as usize])
    }

    /// The vertical index.
    #[must_use]
    pub fn index(&self) -> &VerticalIndex {
        &self.index
    }

    /// The display this scene is laid out for.
    #[must_use]
    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// The table sizing.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of live primitives, root excluded.
    #[must_use]
    pub fn live_count(&self) -> u16 {
        self.live_count
    }

    /// The terminal receiving text, if any.
    #[must_use]
    pub fn active_terminal(&self) -> Option<PrimitiveId> {
        self.active_terminal
    }

    /// The changes of the most recent flush.
    #[must_use]
    pub fn last_changes(&self) -> &SceneChanges {
        &self.changes
    }

    /// Number of flushes run so far. Changes when
    /// [`last_changes`](Self::last_changes) does.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Paints one scan line into `buf` by running the painters of the
    /// line's index entry in paint order.
    ///
    /// Returns the number of painters run.
    pub fn paint_line(&self, line: i32, buf: &mut [Pixel]) -> usize {
        let mut ran = 0;
        for entry in self.index.entry(line) {
            let i = entry.id.index() as usize;
            if let Some(set) = &self.painters[i]
                && set.paint(buf, line, self.absolute[i])
            {
                ran += 1;
            }
        }
        ran
    }

    // -- Mutation API (auto-marks dirty, then flushes) --

    /// Replaces the caller-settable flags of a primitive.
    ///
    /// Setting the flags it already has is a no-op.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root, [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn set_flags(&mut self, id: PrimitiveId, flags: PrimitiveFlags) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        let flags = flags.with(PrimitiveFlags::DRAWABLE, false);
        if self.flags[idx as usize] == flags {
            return Ok(());
        }
        self.flags[idx as usize] = flags;
        // Flags feed clipping, paint permission and scroll phases alike.
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.recompute();
        Ok(())
    }

    /// Sets the position relative to the parent.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root, [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn move_absolute(&mut self, id: PrimitiveId, x: i32, y: i32) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        self.set_position(idx, Point::new(x, y));
        self.recompute();
        Ok(())
    }

    /// Offsets the position relative to the parent.
    ///
    /// # Errors
    ///
    /// As for [`move_absolute`](Self::move_absolute).
    pub fn move_relative(&mut self, id: PrimitiveId, dx: i32, dy: i32) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        let to = self.position[idx as usize].offset(dx, dy);
        self.set_position(idx, to);
        self.recompute();
        Ok(())
    }

    /// Sets the color and opacity.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root (see
    /// [`set_background`](Self::set_background)), [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn set_color(&mut self, id: PrimitiveId, color: Color) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        if self.color[idx as usize] != color {
            self.color[idx as usize] = color;
            self.dirty.mark(idx, dirty::APPEARANCE);
            self.recompute();
        }
        Ok(())
    }

    /// Sets the screen background color.
    pub fn set_background(&mut self, color: Color) {
        if self.color[0] != color {
            self.color[0] = color;
            self.dirty.mark(0, dirty::APPEARANCE);
            self.recompute();
        }
    }

    /// Moves the primitive by `(dx, dy)` on each of the next `count` frames.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidId`] for the root, [`SceneError::UnknownTarget`]
    /// when not live.
    pub fn set_motion(
        &mut self,
        id: PrimitiveId,
        dx: i32,
        dy: i32,
        count: u16,
    ) -> Result<(), SceneError> {
        let idx = self.target(id)?;
        self.motion[idx as usize] = Motion {
            dx,
            dy,
            remaining: count,
        };
        Ok(())
    }

    /// Applies one frame of automatic motion to every moving primitive.
    ///
    /// Returns how many primitives moved.
    pub fn advance_motion(&mut self) -> usize {
        let mut moved = 0;
        for i in 1..self.live.len() {
            let m = self.motion[i];
            if !self.live[i] || m.remaining == 0 {
                continue;
            }
            self.motion[i].remaining = m.remaining - 1;
            let Ok(idx) = u32::try_from(i) else {
                continue;
            };
            self.set_position(idx, self.position[i].offset(m.dx, m.dy));
            moved += 1;
        }
        if moved > 0 {
            self.recompute();
        }
        moved
    }

    /// Forces the painters of a primitive to be rebuilt.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownTarget`] when not live.
    pub fn regenerate_painters(&mut self, id: PrimitiveId) -> Result<(), SceneError> {
        let idx = self.slot(id).ok_or(SceneError::UnknownTarget(id))?;
        self.dirty.mark(idx, dirty::APPEARANCE);
        self.recompute();
        Ok(())
    }

    // -- Internal helpers --

    /// The slot of a live primitive.
    pub(crate) fn slot(&self, id: PrimitiveId) -> Option<u32> {
        self.live
            .get(usize::from(id.0))
            .copied()
            .unwrap_or(false)
            .then(|| id.index())
    }

    /// The slot of a live, caller-modifiable primitive.
    pub(crate) fn target(&self, id: PrimitiveId) -> Result<u32, SceneError> {
        if id.is_root() {
            return Err(SceneError::InvalidId(0));
        }
        self.slot(id).ok_or(SceneError::UnknownTarget(id))
    }

    fn set_position(&mut self, idx: u32, to: Point) {
        if self.position[idx as usize] != to {
            self.position[idx as usize] = to;
            self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        }
    }

    /// Whether `idx` is `ancestor` or lies below it.
    pub(crate) fn is_within(&self, idx: u32, ancestor: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// Number of ancestors.
    pub(crate) fn depth(&self, idx: u32) -> u32 {
        let mut depth = 0;
        let mut cur = self.parent[idx as usize];
        while cur != INVALID {
            depth += 1;
            cur = self.parent[cur as usize];
        }
        depth
    }

    /// The subtree rooted at `idx` in pre-order.
    pub(crate) fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_subtree(idx, &mut out);
        out
    }

    fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_subtree(child, out);
            child = self.next_sibling[child as usize];
        }
    }

    /// Live bitmaps that draw the pixels of `source`.
    pub(crate) fn referencers(&self, source: u32) -> Vec<u32> {
        let source = PrimitiveId::from_index(source);
        (0_u32..)
            .zip(&self.shape)
            .filter(|&(i, shape)| {
                self.live[i as usize]
                    && matches!(
                        shape,
                        Shape::Bitmap { source: BitmapSource::Reference(s), .. } if *s == source
                    )
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Referencers must re-evaluate whether they can paint and rebuild.
    fn mark_referencers(&mut self, source: u32) {
        for r in self.referencers(source) {
            self.dirty.mark_with(r, dirty::GEOMETRY, &EagerPolicy);
            self.dirty.mark(r, dirty::APPEARANCE);
        }
    }

    fn reset_computed(&mut self, i: usize) {
        self.absolute[i] = Point::default();
        self.view[i] = PixelRect::EMPTY;
        self.extent[i] = PixelRect::EMPTY;
        self.child_view[i] = PixelRect::EMPTY;
        self.attached[i] = false;
        self.children_paint[i] = false;
        self.drawable[i] = false;
        self.indexed[i] = None;
        self.painters[i] = None;
        self.paint_keys[i] = None;
    }

    /// Removes a subtree from the table, the index and the dirty tracker.
    fn destroy_subtree(&mut self, idx: u32) {
        self.unlink(idx);
        let doomed = self.subtree(idx);
        for &d in doomed.iter().rev() {
            let id = PrimitiveId::from_index(d);
            if let Some(range) = self.indexed[d as usize] {
                self.index.remove_range(range, id);
            }
            self.dirty.remove_key(d);
            let i = d as usize;
            self.live[i] = false;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.shape[i] = Shape::Group;
            self.motion[i] = Motion::default();
            self.reset_computed(i);
            self.live_count -= 1;
            if self.active_terminal == Some(id) {
                self.active_terminal = None;
            }
            self.pending_removed.push(id);
        }
        for &d in &doomed {
            self.mark_referencers(d);
        }
    }

    /// Appends `idx` to `p`'s children.
    fn link_last(&mut self, idx: u32, p: u32) {
        let last = self.last_child[p as usize];
        self.parent[idx as usize] = p;
        self.prev_sibling[idx as usize] = last;
        self.next_sibling[idx as usize] = INVALID;
        if last == INVALID {
            self.first_child[p as usize] = idx;
        } else {
            self.next_sibling[last as usize] = idx;
        }
        self.last_child[p as usize] = idx;
    }

    /// Removes `idx` from its parent's child list and drops the dependency
    /// edge. No-op when detached.
    fn unlink(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        } else {
            self.last_child[p as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;

        self.dirty.remove_dependency(idx, p, dirty::GEOMETRY);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::bitmap::PixelMode;

    fn scene() -> Scene {
        Scene::new(DisplayConfig::qvga_320x240(), SceneConfig::compact())
    }

    fn group(x: i32, y: i32, w: i32, h: i32) -> PrimitiveSpec {
        PrimitiveSpec::group(PixelRect::new(x, y, x + w, y + h))
    }

    const A: PrimitiveId = PrimitiveId(1);
    const B: PrimitiveId = PrimitiveId(2);
    const C: PrimitiveId = PrimitiveId(3);

    #[test]
    fn root_covers_screen() {
        let s = scene();
        assert!(s.is_drawable(PrimitiveId::ROOT));
        assert_eq!(
            s.draw_extent(PrimitiveId::ROOT),
            Some(PixelRect::new(0, 0, 320, 240))
        );
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn create_rejects_bad_ids() {
        let mut s = scene();
        let spec = group(0, 0, 4, 4);
        assert_eq!(
            s.create(PrimitiveId::ROOT, PrimitiveId::ROOT, PrimitiveFlags::NONE, spec.clone()),
            Err(SceneError::InvalidId(0))
        );
        assert_eq!(
            s.create(PrimitiveId(256), PrimitiveId::ROOT, PrimitiveFlags::NONE, spec.clone()),
            Err(SceneError::InvalidId(256))
        );
        assert_eq!(
            s.create(A, B, PrimitiveFlags::NONE, spec),
            Err(SceneError::UnknownParent(B))
        );
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn children_keep_creation_order() {
        let mut s = scene();
        for id in [A, B, C] {
            s.create(id, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, group(0, 0, 1, 1))
                .unwrap();
        }
        let kids: Vec<_> = s.children(PrimitiveId::ROOT).unwrap().collect();
        assert_eq!(kids, [A, B, C]);

        s.attach(A, PrimitiveId::ROOT).unwrap();
        let kids: Vec<_> = s.children(PrimitiveId::ROOT).unwrap().collect();
        assert_eq!(kids, [B, C, A], "re-attaching moves to the end");
    }

    #[test]
    fn reusing_an_id_destroys_the_subtree() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE;
        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 50, 50)).unwrap();
        s.create(B, A, flags, group(0, 0, 10, 10)).unwrap();
        s.create(C, B, flags, group(0, 0, 5, 5)).unwrap();
        assert_eq!(s.live_count(), 3);

        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 20, 20)).unwrap();
        assert!(s.is_live(A));
        assert!(!s.is_live(B));
        assert!(!s.is_live(C));
        assert_eq!(s.live_count(), 1);
        assert!(s.last_changes().removed.contains(&B));
    }

    #[test]
    fn replacement_cannot_hang_below_itself() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE;
        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 50, 50)).unwrap();
        s.create(B, A, flags, group(0, 0, 10, 10)).unwrap();
        assert_eq!(
            s.create(A, B, flags, group(0, 0, 1, 1)),
            Err(SceneError::UnknownParent(B))
        );
        assert!(s.is_live(B), "failed create leaves the scene unchanged");
    }

    #[test]
    fn table_full_counts_replaced_subtree() {
        let mut s = Scene::new(
            DisplayConfig::qvga_320x240(),
            SceneConfig {
                max_primitives: 8,
                capacity: 2,
                ..SceneConfig::compact()
            },
        );
        let flags = PrimitiveFlags::VISIBLE;
        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 1, 1)).unwrap();
        s.create(B, PrimitiveId::ROOT, flags, group(0, 0, 1, 1)).unwrap();
        assert_eq!(
            s.create(C, PrimitiveId::ROOT, flags, group(0, 0, 1, 1)),
            Err(SceneError::TableFull)
        );
        assert!(s.create(B, PrimitiveId::ROOT, flags, group(0, 0, 2, 2)).is_ok());
    }

    #[test]
    fn oversized_tile_grids_are_refused() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE;
        let wide = PrimitiveSpec::tile_array(u16::MAX, 1, 0, u16::MAX, 1);
        assert_eq!(
            s.create(A, PrimitiveId::ROOT, flags, wide),
            Err(SceneError::OutOfBounds(A))
        );
        assert_eq!(
            s.create(
                A,
                PrimitiveId::ROOT,
                flags,
                PrimitiveSpec::tile_map(u16::MAX, 1, 0, u16::MAX, 1, 10, 1)
            ),
            Err(SceneError::OutOfBounds(A)),
            "a small window does not excuse an oversized grid"
        );
        assert!(!s.is_live(A));
        assert!(
            s.create(A, PrimitiveId::ROOT, flags, PrimitiveSpec::tile_map(8, 1, 0, 8, 1, 10, 1))
                .is_ok()
        );
    }

    #[test]
    fn content_over_budget_is_refused() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE;
        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 10, 10)).unwrap();
        let huge = PrimitiveSpec::bitmap(u16::MAX, u16::MAX, PixelMode::Solid);
        assert_eq!(
            s.create(A, PrimitiveId::ROOT, flags, huge),
            Err(SceneError::OutOfBounds(A))
        );
        assert_eq!(
            s.shape(A),
            Some(&Shape::Group),
            "refused replacement keeps the old primitive"
        );

        let terminal =
            PrimitiveSpec::terminal(Point::new(0, 0), 1000, 1000, Color::WHITE, Color::BLACK);
        assert_eq!(
            s.create(B, PrimitiveId::ROOT, flags, terminal),
            Err(SceneError::OutOfBounds(B))
        );
        assert_eq!(s.live_count(), 1);

        let fits = PrimitiveSpec::bitmap(320, 240, PixelMode::Solid);
        assert!(s.create(B, PrimitiveId::ROOT, flags, fits).is_ok());
    }

    #[test]
    fn attach_refuses_cycles() {
        let mut s = scene();
        let flags = PrimitiveFlags::VISIBLE;
        s.create(A, PrimitiveId::ROOT, flags, group(0, 0, 1, 1)).unwrap();
        s.create(B, A, flags, group(0, 0, 1, 1)).unwrap();
        assert_eq!(s.attach(A, B), Err(SceneError::InvalidId(1)));
        assert_eq!(s.attach(A, A), Err(SceneError::InvalidId(1)));
        assert_eq!(s.parent(B), Some(A));
    }

    #[test]
    fn detached_subtree_stops_drawing() {
        let mut s = scene();
        let solid = PrimitiveSpec::rect(Point::new(0, 0), 4, 4, true, Color::WHITE);
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, group(0, 0, 50, 50))
            .unwrap();
        s.create(B, A, PrimitiveFlags::VISIBLE, solid).unwrap();
        assert!(s.is_drawable(B));

        s.detach(A).unwrap();
        assert!(!s.is_drawable(B));
        assert!(s.index().lines_of(B).next().is_none());
        assert_eq!(s.parent(A), None);

        s.attach(A, PrimitiveId::ROOT).unwrap();
        assert!(s.is_drawable(B));
    }

    #[test]
    fn root_is_protected() {
        let mut s = scene();
        assert_eq!(s.delete(PrimitiveId::ROOT), Err(SceneError::InvalidId(0)));
        assert_eq!(
            s.move_absolute(PrimitiveId::ROOT, 1, 1),
            Err(SceneError::InvalidId(0))
        );
        assert_eq!(s.delete(A), Err(SceneError::UnknownTarget(A)));
    }

    #[test]
    fn motion_runs_out() {
        let mut s = scene();
        s.create(A, PrimitiveId::ROOT, PrimitiveFlags::VISIBLE, group(0, 0, 1, 1))
            .unwrap();
        s.set_motion(A, 2, -1, 2).unwrap();
        assert_eq!(s.advance_motion(), 1);
        assert_eq!(s.advance_motion(), 1);
        assert_eq!(s.advance_motion(), 0);
        assert_eq!(s.position(A), Some(Point::new(4, -2)));
    }
}
