// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the compositor loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the compositor calls at each stage. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Times are measured on the *line clock*: the number of scan lines since the
//! compositor started. One line lasts
//! [`DisplayConfig::line_period_ns`](crate::display::DisplayConfig::line_period_ns).
//!
//! [`FrameSummaryBuilder`] collects phase boundaries and counters during a
//! frame and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`PainterChange`] events, the
//!   per-primitive index range events and the corresponding `TraceSink`
//!   methods.

use crate::backend::FeedOutcome;
#[cfg(feature = "trace-rich")]
use crate::scene::{PrimitiveId, RangeChange};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the compositor loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Painting ahead of the scan-out cursor through the active region.
    Fill,
    /// Vertical blanking: draining commands, motion and the blanking hook.
    Blanking,
    /// Pre-painting the first lines of the next frame.
    Prefill,
}

/// What happened to a primitive's painters.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PainterChangeKind {
    /// A new set was compiled.
    Rebuilt {
        /// Alignment phases compiled.
        phases: u8,
        /// Distinct row routines across phases.
        routines: u16,
    },
    /// The primitive moved and kept its set.
    Reused,
    /// The primitive stopped drawing.
    Dropped,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame's active region begins.
#[derive(Clone, Copy, Debug)]
pub struct FrameStartEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Line clock at the start of the frame.
    pub line: u64,
    /// Live primitives, root excluded.
    pub live_primitives: u16,
    /// Bytes the compositor may dispatch per idle poll this frame.
    pub dispatch_budget: u32,
}

/// Marks the beginning of a compositor phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Line clock at the start of the phase.
    pub line: u64,
}

/// Marks the end of a compositor phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Line clock at the end of the phase.
    pub line: u64,
}

/// Emitted when the cursor overtook a line before it was painted.
#[derive(Clone, Copy, Debug)]
pub struct LineMissEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The line that was skipped.
    pub line: u16,
    /// Where the cursor was when the miss was noticed.
    pub cursor: u16,
}

/// Emitted for every byte that completed a command or was text.
#[derive(Clone, Copy, Debug)]
pub struct CommandEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Line clock when the byte was fed.
    pub line: u64,
    /// What the byte did.
    pub outcome: FeedOutcome,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Lines painted ahead of the cursor, prefill included.
    pub lines_painted: u32,
    /// Lines the cursor reached before they were painted.
    pub lines_missed: u32,
    /// Bytes read from the source.
    pub bytes: u32,
    /// Commands that ran.
    pub commands: u32,
    /// Commands dropped as unknown.
    pub discarded: u32,
    /// Commands the scene refused.
    pub rejected: u32,
    /// Dispatch budget in force during the frame.
    pub dispatch_budget: u32,
    /// Fill phase duration in lines (0 if not measured).
    pub fill_lines: u64,
    /// Blanking phase duration in lines (0 if not measured).
    pub blanking_lines: u64,
    /// Prefill phase duration in lines (0 if not measured).
    pub prefill_lines: u64,
}

impl FrameSummary {
    /// Whether any line was missed.
    #[must_use]
    pub fn missed(&self) -> bool {
        self.lines_missed > 0
    }
}

/// A per-primitive painter record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct PainterChange {
    /// The primitive.
    pub id: PrimitiveId,
    /// What happened.
    pub kind: PainterChangeKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the compositor loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame's active region begins.
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        _ = e;
    }

    /// Called at the beginning of a compositor phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a compositor phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a line was missed.
    fn on_line_miss(&mut self, e: &LineMissEvent) {
        _ = e;
    }

    /// Called when a byte completed a command or was text.
    fn on_command(&mut self, e: &CommandEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with the vertical index updates of one scene flush (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_index_changes(&mut self, frame_index: u64, changes: &[RangeChange]) {
        _ = (frame_index, changes);
    }

    /// Called with the painter work of one scene flush (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_painter_changes(&mut self, frame_index: u64, changes: &[PainterChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether rich per-primitive events would reach a sink.
    #[inline]
    #[must_use]
    pub fn wants_rich(&self) -> bool {
        #[cfg(feature = "trace-rich")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            false
        }
    }

    /// Emits a [`FrameStartEvent`].
    #[inline]
    pub fn frame_start(&mut self, e: &FrameStartEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_start(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LineMissEvent`].
    #[inline]
    pub fn line_miss(&mut self, e: &LineMissEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_line_miss(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommandEvent`].
    #[inline]
    pub fn command(&mut self, e: &CommandEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_command(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits index range changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn index_changes(&mut self, frame_index: u64, changes: &[RangeChange]) {
        if let Some(s) = &mut self.sink {
            s.on_index_changes(frame_index, changes);
        }
    }

    /// Emits painter changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn painter_changes(&mut self, frame_index: u64, changes: &[PainterChange]) {
        if let Some(s) = &mut self.sink {
            s.on_painter_changes(frame_index, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase boundaries and counters during a frame and produces a
/// [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
    phase_starts: [Option<u64>; 3],
    phase_ends: [Option<u64>; 3],
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(start: &FrameStartEvent) -> Self {
        Self {
            summary: FrameSummary {
                frame_index: start.frame_index,
                dispatch_budget: start.dispatch_budget,
                ..FrameSummary::default()
            },
            phase_starts: [None; 3],
            phase_ends: [None; 3],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, line: u64) {
        self.phase_starts[phase_index(phase)] = Some(line);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, line: u64) {
        self.phase_ends[phase_index(phase)] = Some(line);
    }

    /// Counts one painted line.
    pub fn painted(&mut self) {
        self.summary.lines_painted += 1;
    }

    /// Counts one missed line.
    pub fn missed(&mut self) {
        self.summary.lines_missed += 1;
    }

    /// Counts one byte read and what it did.
    pub fn fed(&mut self, outcome: &FeedOutcome) {
        self.summary.bytes += 1;
        match outcome {
            FeedOutcome::Dispatched(_) => self.summary.commands += 1,
            FeedOutcome::Discarded => self.summary.discarded += 1,
            FeedOutcome::Rejected(..) => self.summary.rejected += 1,
            FeedOutcome::Pending | FeedOutcome::Text(_) => {}
        }
    }

    /// Lines missed so far.
    #[must_use]
    pub fn lines_missed(&self) -> u32 {
        self.summary.lines_missed
    }

    /// Bytes read so far.
    #[must_use]
    pub fn bytes(&self) -> u32 {
        self.summary.bytes
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            fill_lines: self.phase_duration(PhaseKind::Fill),
            blanking_lines: self.phase_duration(PhaseKind::Blanking),
            prefill_lines: self.phase_duration(PhaseKind::Prefill),
            ..self.summary
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Fill => 0,
        PhaseKind::Blanking => 1,
        PhaseKind::Prefill => 2,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Opcode;
    use crate::scene::{PrimitiveId, SceneError};

    fn sample_start() -> FrameStartEvent {
        FrameStartEvent {
            frame_index: 42,
            line: 525 * 42,
            live_primitives: 3,
            dispatch_budget: 64,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_start(&sample_start());
        sink.on_line_miss(&LineMissEvent {
            frame_index: 0,
            line: 10,
            cursor: 11,
        });
        sink.on_frame_summary(&FrameSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_start(&sample_start());
        assert!(!tracer.wants_rich());
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_start());
        builder.phase_begin(PhaseKind::Fill, 100);
        builder.phase_end(PhaseKind::Fill, 580);
        builder.phase_begin(PhaseKind::Blanking, 580);
        builder.phase_end(PhaseKind::Blanking, 590);
        builder.painted();
        builder.missed();
        builder.fed(&FeedOutcome::Pending);
        builder.fed(&FeedOutcome::Dispatched(Opcode::Primitive(3)));
        builder.fed(&FeedOutcome::Rejected(
            Opcode::Primitive(3),
            SceneError::UnknownTarget(PrimitiveId(9)),
        ));

        let summary = builder.finish();
        assert_eq!(summary.fill_lines, 480);
        assert_eq!(summary.blanking_lines, 10);
        assert_eq!(summary.prefill_lines, 0);
        assert_eq!(summary.bytes, 3);
        assert_eq!(summary.commands, 1);
        assert_eq!(summary.rejected, 1);
        assert!(summary.missed());
        assert_eq!(summary.frame_index, 42);
        assert_eq!(summary.dispatch_budget, 64);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            misses: Vec<u16>,
        }
        impl TraceSink for RecordingSink {
            fn on_line_miss(&mut self, e: &LineMissEvent) {
                self.misses.push(e.line);
            }
        }

        let mut sink = RecordingSink { misses: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.line_miss(&LineMissEvent {
            frame_index: 1,
            line: 7,
            cursor: 9,
        });
        drop(tracer);
        assert_eq!(sink.misses, &[7]);
    }
}
