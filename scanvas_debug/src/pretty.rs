// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Line-clock
//! values are shown as they are and converted to microseconds using the
//! line period of a [`DisplayConfig`].

use std::io::Write;

use scanvas_core::backend::FeedOutcome;
use scanvas_core::display::DisplayConfig;
use scanvas_core::scene::RangeChange;
use scanvas_core::trace::{
    CommandEvent, FrameStartEvent, FrameSummary, LineMissEvent, PainterChange,
    PainterChangeKind, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    display: DisplayConfig,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(display: DisplayConfig) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            display,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, display: DisplayConfig) -> Self {
        Self { writer, display }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, display: DisplayConfig) -> Self {
        Self { writer, display }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn lines_to_us(&self, lines: u64) -> f64 {
        lines as f64 * f64::from(self.display.line_period_ns) / 1000.0
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Fill => "fill",
        PhaseKind::Blanking => "blank",
        PhaseKind::Prefill => "prefill",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} line={} at {:.1}µs live={} budget={}",
            e.frame_index,
            e.line,
            self.lines_to_us(e.line),
            e.live_primitives,
            e.dispatch_budget,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at line {}",
            e.frame_index,
            phase_name(e.phase),
            e.line,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at line {}",
            e.frame_index,
            phase_name(e.phase),
            e.line,
        );
    }

    fn on_line_miss(&mut self, e: &LineMissEvent) {
        let _ = writeln!(
            self.writer,
            "[miss] frame={} line={} cursor={}",
            e.frame_index, e.line, e.cursor,
        );
    }

    fn on_command(&mut self, e: &CommandEvent) {
        let _ = match e.outcome {
            FeedOutcome::Pending => Ok(()),
            FeedOutcome::Dispatched(op) => writeln!(
                self.writer,
                "[cmd] frame={} line={} {op} ok",
                e.frame_index, e.line,
            ),
            FeedOutcome::Discarded => writeln!(
                self.writer,
                "[cmd] frame={} line={} discarded",
                e.frame_index, e.line,
            ),
            FeedOutcome::Rejected(op, err) => writeln!(
                self.writer,
                "[cmd] frame={} line={} {op} REJECTED: {err}",
                e.frame_index, e.line,
            ),
            FeedOutcome::Text(changed) => writeln!(
                self.writer,
                "[text] frame={} line={} {}",
                e.frame_index,
                e.line,
                if changed { "shown" } else { "no terminal" },
            ),
        };
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let missed = if s.missed() { "MISSED" } else { "ok" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} painted={} missed={} bytes={} cmds={} \
             discarded={} rejected={} budget={} fill={:.1}µs blank={:.1}µs \
             prefill={:.1}µs beam={missed}",
            s.frame_index,
            s.lines_painted,
            s.lines_missed,
            s.bytes,
            s.commands,
            s.discarded,
            s.rejected,
            s.dispatch_budget,
            self.lines_to_us(s.fill_lines),
            self.lines_to_us(s.blanking_lines),
            self.lines_to_us(s.prefill_lines),
        );
    }

    fn on_index_changes(&mut self, frame_index: u64, changes: &[RangeChange]) {
        let churn: i32 = changes.iter().map(RangeChange::churn).sum();
        let _ = writeln!(
            self.writer,
            "[index] frame={frame_index} changes={} churn={churn}",
            changes.len(),
        );
    }

    fn on_painter_changes(&mut self, frame_index: u64, changes: &[PainterChange]) {
        let rebuilt = changes
            .iter()
            .filter(|c| matches!(c.kind, PainterChangeKind::Rebuilt { .. }))
            .count();
        let _ = writeln!(
            self.writer,
            "[painters] frame={frame_index} changes={} rebuilt={rebuilt}",
            changes.len(),
        );
    }
}
