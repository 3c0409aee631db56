// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_index_changes`](TraceSink::on_index_changes),
//! [`on_painter_changes`](TraceSink::on_painter_changes)) store only counts.

use scanvas_core::backend::{FeedOutcome, Opcode};
use scanvas_core::scene::{PrimitiveId, RangeChange, SceneError};
use scanvas_core::trace::{
    CommandEvent, FrameStartEvent, FrameSummary, LineMissEvent, PainterChange,
    PainterChangeKind, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_START: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_LINE_MISS: u8 = 4;
const TAG_COMMAND: u8 = 5;
const TAG_FRAME_SUMMARY: u8 = 6;
const TAG_INDEX_CHANGES_COUNT: u8 = 7;
const TAG_PAINTER_CHANGES_COUNT: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, n: usize) {
        self.write_u32(u32::try_from(n).unwrap_or(u32::MAX));
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Fill => 0,
            PhaseKind::Blanking => 1,
            PhaseKind::Prefill => 2,
        });
    }

    fn write_opcode(&mut self, op: Opcode) {
        let (kind, code) = match op {
            Opcode::System(code) => (0, code),
            Opcode::Primitive(code) => (1, code),
        };
        self.write_u8(kind);
        self.write_u8(code);
    }

    /// Three bytes: kind, then a `u16` ID where the error carries one.
    fn write_error(&mut self, e: SceneError) {
        let (kind, id) = match e {
            SceneError::InvalidId(id) => (0, id),
            SceneError::UnknownParent(id) => (1, id.0),
            SceneError::UnknownTarget(id) => (2, id.0),
            SceneError::TableFull => (3, 0),
            SceneError::WrongKind(id) => (4, id.0),
            SceneError::OutOfBounds(id) => (5, id.0),
        };
        self.write_u8(kind);
        self.write_u16(id);
    }

    /// Always six bytes: kind, opcode, error.
    fn write_outcome(&mut self, outcome: FeedOutcome) {
        match outcome {
            FeedOutcome::Pending => {
                self.write_u8(0);
                self.buf.extend_from_slice(&[0; 5]);
            }
            FeedOutcome::Dispatched(op) => {
                self.write_u8(1);
                self.write_opcode(op);
                self.buf.extend_from_slice(&[0; 3]);
            }
            FeedOutcome::Discarded => {
                self.write_u8(2);
                self.buf.extend_from_slice(&[0; 5]);
            }
            FeedOutcome::Rejected(op, e) => {
                self.write_u8(3);
                self.write_opcode(op);
                self.write_error(e);
            }
            FeedOutcome::Text(changed) => {
                self.write_u8(4);
                self.write_u8(u8::from(changed));
                self.buf.extend_from_slice(&[0; 4]);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        self.write_u8(TAG_FRAME_START);
        self.write_u64(e.frame_index);
        self.write_u64(e.line);
        self.write_u16(e.live_primitives);
        self.write_u32(e.dispatch_budget);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.line);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.line);
    }

    fn on_line_miss(&mut self, e: &LineMissEvent) {
        self.write_u8(TAG_LINE_MISS);
        self.write_u64(e.frame_index);
        self.write_u16(e.line);
        self.write_u16(e.cursor);
    }

    fn on_command(&mut self, e: &CommandEvent) {
        self.write_u8(TAG_COMMAND);
        self.write_u64(e.frame_index);
        self.write_u64(e.line);
        self.write_outcome(e.outcome);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.lines_painted);
        self.write_u32(s.lines_missed);
        self.write_u32(s.bytes);
        self.write_u32(s.commands);
        self.write_u32(s.discarded);
        self.write_u32(s.rejected);
        self.write_u32(s.dispatch_budget);
        self.write_u64(s.fill_lines);
        self.write_u64(s.blanking_lines);
        self.write_u64(s.prefill_lines);
    }

    fn on_index_changes(&mut self, frame_index: u64, changes: &[RangeChange]) {
        self.write_u8(TAG_INDEX_CHANGES_COUNT);
        self.write_u64(frame_index);
        self.write_count(changes.len());
    }

    fn on_painter_changes(&mut self, frame_index: u64, changes: &[PainterChange]) {
        let (mut rebuilt, mut reused, mut dropped) = (0, 0, 0);
        for change in changes {
            match change.kind {
                PainterChangeKind::Rebuilt { .. } => rebuilt += 1,
                PainterChangeKind::Reused => reused += 1,
                PainterChangeKind::Dropped => dropped += 1,
            }
        }
        self.write_u8(TAG_PAINTER_CHANGES_COUNT);
        self.write_u64(frame_index);
        self.write_count(rebuilt);
        self.write_count(reused);
        self.write_count(dropped);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameStartEvent`].
    FrameStart(FrameStartEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`LineMissEvent`].
    LineMiss(LineMissEvent),
    /// A [`CommandEvent`].
    Command(CommandEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Index range changes in one flush.
    IndexChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Primitives whose line range changed.
        count: u32,
    },
    /// Painter changes in one flush, by kind.
    PainterChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Sets compiled.
        rebuilt: u32,
        /// Sets kept across a move.
        reused: u32,
        /// Sets dropped.
        dropped: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Fill,
            1 => PhaseKind::Blanking,
            _ => PhaseKind::Prefill,
        })
    }

    fn read_opcode(&mut self) -> Option<Opcode> {
        let kind = self.read_u8()?;
        let code = self.read_u8()?;
        Some(if kind == 0 {
            Opcode::System(code)
        } else {
            Opcode::Primitive(code)
        })
    }

    fn read_error(&mut self) -> Option<SceneError> {
        let kind = self.read_u8()?;
        let id = self.read_u16()?;
        Some(match kind {
            0 => SceneError::InvalidId(id),
            1 => SceneError::UnknownParent(PrimitiveId(id)),
            2 => SceneError::UnknownTarget(PrimitiveId(id)),
            3 => SceneError::TableFull,
            4 => SceneError::WrongKind(PrimitiveId(id)),
            _ => SceneError::OutOfBounds(PrimitiveId(id)),
        })
    }

    fn skip(&mut self, n: usize) -> Option<()> {
        self.data.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(())
    }

    fn read_outcome(&mut self) -> Option<FeedOutcome> {
        Some(match self.read_u8()? {
            0 => {
                self.skip(5)?;
                FeedOutcome::Pending
            }
            1 => {
                let op = self.read_opcode()?;
                self.skip(3)?;
                FeedOutcome::Dispatched(op)
            }
            2 => {
                self.skip(5)?;
                FeedOutcome::Discarded
            }
            3 => FeedOutcome::Rejected(self.read_opcode()?, self.read_error()?),
            _ => {
                let changed = self.read_u8()? != 0;
                self.skip(4)?;
                FeedOutcome::Text(changed)
            }
        })
    }

    fn decode_frame_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameStart(FrameStartEvent {
            frame_index: self.read_u64()?,
            line: self.read_u64()?,
            live_primitives: self.read_u16()?,
            dispatch_budget: self.read_u32()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            line: self.read_u64()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            line: self.read_u64()?,
        }))
    }

    fn decode_line_miss(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LineMiss(LineMissEvent {
            frame_index: self.read_u64()?,
            line: self.read_u16()?,
            cursor: self.read_u16()?,
        }))
    }

    fn decode_command(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Command(CommandEvent {
            frame_index: self.read_u64()?,
            line: self.read_u64()?,
            outcome: self.read_outcome()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            lines_painted: self.read_u32()?,
            lines_missed: self.read_u32()?,
            bytes: self.read_u32()?,
            commands: self.read_u32()?,
            discarded: self.read_u32()?,
            rejected: self.read_u32()?,
            dispatch_budget: self.read_u32()?,
            fill_lines: self.read_u64()?,
            blanking_lines: self.read_u64()?,
            prefill_lines: self.read_u64()?,
        }))
    }

    fn decode_index_changes_count(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::IndexChangesCount { frame_index, count })
    }

    fn decode_painter_changes_count(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PainterChangesCount {
            frame_index: self.read_u64()?,
            rebuilt: self.read_u32()?,
            reused: self.read_u32()?,
            dropped: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_START => self.decode_frame_start(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_LINE_MISS => self.decode_line_miss(),
            TAG_COMMAND => self.decode_command(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_INDEX_CHANGES_COUNT => self.decode_index_changes_count(),
            TAG_PAINTER_CHANGES_COUNT => self.decode_painter_changes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use scanvas_core::geometry::LineRange;
    use scanvas_core::vertical::RangeCase;

    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 7,
            lines_painted: 236,
            lines_missed: 4,
            bytes: 120,
            commands: 5,
            discarded: 1,
            rejected: 2,
            dispatch_budget: 64,
            fill_lines: 232,
            blanking_lines: 20,
            prefill_lines: 1,
        }
    }

    #[test]
    fn frame_start_and_phases_decode() {
        let mut rec = RecorderSink::new();
        rec.on_frame_start(&FrameStartEvent {
            frame_index: 3,
            line: 786,
            live_primitives: 12,
            dispatch_budget: 32,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            phase: PhaseKind::Blanking,
            line: 1026,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 3,
            phase: PhaseKind::Blanking,
            line: 1030,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        match &events[0] {
            RecordedEvent::FrameStart(e) => {
                assert_eq!(e.frame_index, 3);
                assert_eq!(e.line, 786);
                assert_eq!(e.live_primitives, 12);
                assert_eq!(e.dispatch_budget, 32);
            }
            other => panic!("expected FrameStart, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::PhaseEnd(e) => {
                assert_eq!(e.phase, PhaseKind::Blanking);
                assert_eq!(e.line, 1030);
            }
            other => panic!("expected PhaseEnd, got {other:?}"),
        }
    }

    #[test]
    fn every_outcome_survives_recording() {
        let outcomes = [
            FeedOutcome::Pending,
            FeedOutcome::Dispatched(Opcode::Primitive(41)),
            FeedOutcome::Dispatched(Opcode::System(0x80)),
            FeedOutcome::Discarded,
            FeedOutcome::Rejected(Opcode::Primitive(3), SceneError::InvalidId(0)),
            FeedOutcome::Rejected(
                Opcode::Primitive(111),
                SceneError::OutOfBounds(PrimitiveId(9)),
            ),
            FeedOutcome::Rejected(Opcode::Primitive(41), SceneError::TableFull),
            FeedOutcome::Text(true),
            FeedOutcome::Text(false),
        ];
        let mut rec = RecorderSink::new();
        for (i, &outcome) in outcomes.iter().enumerate() {
            rec.on_command(&CommandEvent {
                frame_index: 1,
                line: i as u64,
                outcome,
            });
        }
        let decoded: Vec<_> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::Command(c) => c.outcome,
                other => panic!("expected Command, got {other:?}"),
            })
            .collect();
        assert_eq!(decoded, outcomes);
    }

    #[test]
    fn summary_and_misses_decode() {
        let mut rec = RecorderSink::new();
        rec.on_line_miss(&LineMissEvent {
            frame_index: 7,
            line: 40,
            cursor: 41,
        });
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(
            events[0],
            RecordedEvent::LineMiss(LineMissEvent {
                line: 40,
                cursor: 41,
                ..
            })
        ));
        match &events[1] {
            RecordedEvent::FrameSummary(s) => assert_eq!(*s, sample_summary()),
            other => panic!("expected FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn rich_events_store_counts() {
        let mut rec = RecorderSink::new();
        rec.on_index_changes(
            4,
            &[RangeChange {
                id: PrimitiveId(2),
                old: None,
                new: Some(LineRange::new(0, 8)),
                case: RangeCase::Added,
            }],
        );
        rec.on_painter_changes(
            4,
            &[
                PainterChange {
                    id: PrimitiveId(2),
                    kind: PainterChangeKind::Rebuilt {
                        phases: 1,
                        routines: 3,
                    },
                },
                PainterChange {
                    id: PrimitiveId(3),
                    kind: PainterChangeKind::Reused,
                },
            ],
        );

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(
            events[0],
            RecordedEvent::IndexChangesCount {
                frame_index: 4,
                count: 1
            }
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::PainterChangesCount {
                frame_index: 4,
                rebuilt: 1,
                reused: 1,
                dropped: 0
            }
        ));
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
        assert_eq!(decode(&[]).count(), 0);
    }
}
