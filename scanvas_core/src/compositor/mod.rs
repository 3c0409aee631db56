// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scan-synchronized compositor loop.
//!
//! The [`Compositor`] paints scan lines into the hardware ring just ahead of
//! the scan-out cursor and spends the remaining time on the command stream:
//!
//! 1. **Fill** ([`LoopState::FillingAheadOfScanout`]): line `L` is painted
//!    into slot `L % slots` only while `cursor < L < cursor + slots`. When
//!    the ring is full, up to [`DispatchBudget::bytes`] command bytes are
//!    fed. Lines the cursor reaches first are counted as misses and skipped.
//! 2. **Blanking** ([`LoopState::BlankingMaintenance`]): all waiting bytes
//!    are fed, automatic motion advances and the blanking hook runs.
//! 3. **Prefill** ([`LoopState::FrameRestart`]): the first `slots` lines of
//!    the next frame are painted, then the loop waits for the active region.
//!
//! Between frames the [`DispatchBudget`] adapts to the misses observed.

mod budget;

pub use budget::{CompositorConfig, DegradationPolicy, DispatchBudget};

use crate::backend::{ByteSource, CommandSink, FeedOutcome, ScanoutHardware};
use crate::scene::Scene;
use crate::trace::{
    CommandEvent, FrameStartEvent, FrameSummary, FrameSummaryBuilder, LineMissEvent,
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer,
};

/// Where the loop is within the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Painting the active region ahead of the cursor.
    FillingAheadOfScanout,
    /// Maintenance during vertical blanking.
    BlankingMaintenance,
    /// Prefilled and waiting for the next active region.
    FrameRestart,
}

/// Drives one [`Scene`] onto scan-out hardware.
///
/// # Usage
///
/// ```rust,ignore
/// let mut compositor = Compositor::new(CompositorConfig::standard());
/// loop {
///     let summary = compositor.run_frame(
///         &mut scene, &mut hw, &mut uart, &mut dispatcher,
///         &mut Tracer::none(), &mut |_| {},
///     );
/// }
/// ```
#[derive(Debug)]
pub struct Compositor {
    budget: DispatchBudget,
    state: LoopState,
    primed: bool,
    frame_index: u64,
    frame_base: u64,
    last_cursor: u16,
    total_lines: u16,
    #[cfg_attr(
        not(feature = "trace-rich"),
        expect(dead_code, reason = "read only by rich tracing")
    )]
    last_flush: u64,
}

impl Compositor {
    /// Creates a compositor that has not yet synchronized to the hardware.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            budget: DispatchBudget::new(config),
            state: LoopState::FrameRestart,
            primed: false,
            frame_index: 0,
            frame_base: 0,
            last_cursor: 0,
            total_lines: 0,
            last_flush: 0,
        }
    }

    /// Current loop state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames completed.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The adaptive dispatch budget.
    #[must_use]
    pub fn budget(&self) -> &DispatchBudget {
        &self.budget
    }

    /// Lines scanned since the first poll.
    #[must_use]
    pub fn line_clock(&self) -> u64 {
        self.frame_base + u64::from(self.last_cursor)
    }

    /// Runs one frame: the active region, blanking and the prefill of the
    /// next frame.
    ///
    /// The first call waits for blanking and prefills before starting.
    pub fn run_frame(
        &mut self,
        scene: &mut Scene,
        hw: &mut dyn ScanoutHardware,
        source: &mut dyn ByteSource,
        sink: &mut dyn CommandSink,
        tracer: &mut Tracer<'_>,
        blanking: &mut dyn FnMut(&mut Scene),
    ) -> FrameSummary {
        let active = scene.display().active_lines;
        let slots = hw.slot_count().max(1);
        self.total_lines = scene.display().total_lines.max(active.saturating_add(1));

        if !self.primed {
            self.wait_while(hw, |cursor| cursor < active);
            for line in 0..slots.min(active) {
                scene.paint_line(i32::from(line), hw.line_buffer(line % slots));
            }
            self.wait_while(hw, |cursor| cursor >= active);
            self.primed = true;
        }

        let start = FrameStartEvent {
            frame_index: self.frame_index,
            line: self.frame_base,
            live_primitives: scene.live_count(),
            dispatch_budget: self.budget.bytes(),
        };
        tracer.frame_start(&start);
        let mut summary = FrameSummaryBuilder::new(&start);
        let next_frame = self.frame_base + u64::from(self.total_lines);

        // Fill.
        self.state = LoopState::FillingAheadOfScanout;
        self.phase_begin(PhaseKind::Fill, &mut summary, tracer);
        let mut next = slots.min(active);
        while next < active {
            let cursor = self.poll(hw);
            if cursor >= active {
                for line in next..active {
                    self.miss(line, cursor, &mut summary, tracer);
                }
                break;
            }
            if next <= cursor {
                self.miss(next, cursor, &mut summary, tracer);
                next += 1;
            } else if u32::from(next) < u32::from(cursor) + u32::from(slots) {
                scene.paint_line(i32::from(next), hw.line_buffer(next % slots));
                summary.painted();
                next += 1;
            } else {
                for _ in 0..self.budget.bytes() {
                    let Some(byte) = source.read() else {
                        break;
                    };
                    self.feed(scene, sink, byte, &mut summary, tracer);
                }
            }
        }
        self.phase_end(PhaseKind::Fill, &mut summary, tracer);

        // Blanking.
        self.wait_while(hw, |cursor| cursor < active);
        self.state = LoopState::BlankingMaintenance;
        self.phase_begin(PhaseKind::Blanking, &mut summary, tracer);
        while let Some(byte) = source.read() {
            self.feed(scene, sink, byte, &mut summary, tracer);
        }
        scene.advance_motion();
        blanking(scene);
        #[cfg(feature = "trace-rich")]
        self.report_changes(scene, tracer);
        self.phase_end(PhaseKind::Blanking, &mut summary, tracer);

        // Prefill.
        self.state = LoopState::FrameRestart;
        self.phase_begin(PhaseKind::Prefill, &mut summary, tracer);
        for line in 0..slots.min(active) {
            self.poll(hw);
            if self.line_clock() >= next_frame + u64::from(line) {
                self.miss(line, self.last_cursor, &mut summary, tracer);
                continue;
            }
            scene.paint_line(i32::from(line), hw.line_buffer(line % slots));
            summary.painted();
        }
        self.phase_end(PhaseKind::Prefill, &mut summary, tracer);
        self.wait_while(hw, |cursor| cursor >= active);

        let summary = summary.finish();
        self.budget.observe(summary.bytes, summary.missed());
        tracer.frame_summary(&summary);
        self.frame_index += 1;
        summary
    }

    /// Reads the cursor, advancing the line clock across frame wraps.
    fn poll(&mut self, hw: &mut dyn ScanoutHardware) -> u16 {
        let cursor = hw.current_line();
        if cursor < self.last_cursor {
            self.frame_base += u64::from(self.total_lines);
        }
        self.last_cursor = cursor;
        cursor
    }

    fn wait_while(&mut self, hw: &mut dyn ScanoutHardware, mut pending: impl FnMut(u16) -> bool) {
        while pending(self.poll(hw)) {}
    }

    fn feed(
        &mut self,
        scene: &mut Scene,
        sink: &mut dyn CommandSink,
        byte: u8,
        summary: &mut FrameSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        let outcome = sink.feed(scene, byte);
        summary.fed(&outcome);
        if outcome != FeedOutcome::Pending {
            tracer.command(&CommandEvent {
                frame_index: self.frame_index,
                line: self.line_clock(),
                outcome,
            });
        }
        #[cfg(feature = "trace-rich")]
        self.report_changes(scene, tracer);
    }

    fn miss(
        &self,
        line: u16,
        cursor: u16,
        summary: &mut FrameSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        summary.missed();
        tracer.line_miss(&LineMissEvent {
            frame_index: self.frame_index,
            line,
            cursor,
        });
    }

    fn phase_begin(
        &self,
        phase: PhaseKind,
        summary: &mut FrameSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        let line = self.line_clock();
        summary.phase_begin(phase, line);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            line,
        });
    }

    fn phase_end(&self, phase: PhaseKind, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) {
        let line = self.line_clock();
        summary.phase_end(phase, line);
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            line,
        });
    }

    /// Forwards the changes of a new scene flush to a rich sink.
    #[cfg(feature = "trace-rich")]
    fn report_changes(&mut self, scene: &Scene, tracer: &mut Tracer<'_>) {
        use alloc::vec::Vec;

        use crate::trace::{PainterChange, PainterChangeKind};

        if scene.flush_count() == self.last_flush {
            return;
        }
        self.last_flush = scene.flush_count();
        if !tracer.wants_rich() {
            return;
        }
        let changes = scene.last_changes();
        if !changes.ranges.is_empty() {
            tracer.index_changes(self.frame_index, &changes.ranges);
        }
        let mut painters = Vec::new();
        for &id in &changes.rebuilt {
            if let Some(set) = scene.painters(id) {
                painters.push(PainterChange {
                    id,
                    kind: PainterChangeKind::Rebuilt {
                        phases: u8::try_from(set.phase_count()).unwrap_or(u8::MAX),
                        routines: u16::try_from(set.routine_count()).unwrap_or(u16::MAX),
                    },
                });
            }
        }
        painters.extend(changes.reused.iter().map(|&id| PainterChange {
            id,
            kind: PainterChangeKind::Reused,
        }));
        painters.extend(changes.dropped.iter().map(|&id| PainterChange {
            id,
            kind: PainterChangeKind::Dropped,
        }));
        if !painters.is_empty() {
            tracer.painter_changes(self.frame_index, &painters);
        }
    }
}
