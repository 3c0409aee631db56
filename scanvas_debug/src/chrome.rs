// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scanvas_core::backend::FeedOutcome;
use scanvas_core::display::DisplayConfig;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Line-clock values are converted to microseconds with the line period of
/// `display`. Line misses carry only their line within the frame and are
/// placed relative to the preceding frame start. Events without a clock
/// value of their own take the latest one seen.
pub fn export(bytes: &[u8], display: &DisplayConfig, writer: &mut dyn Write) -> io::Result<()> {
    let line_ns = display.line_period_ns;
    let mut events: Vec<Value> = Vec::new();
    let mut frame_origin = 0_u64;
    let mut latest = 0_u64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameStart(e) => {
                frame_origin = e.line;
                latest = e.line;
                events.push(json!({
                    "ph": "i",
                    "name": "FrameStart",
                    "cat": "Frame",
                    "ts": lines_to_us(e.line, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "live_primitives": e.live_primitives,
                        "dispatch_budget": e.dispatch_budget,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                latest = e.line;
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": lines_to_us(e.line, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                latest = e.line;
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": lines_to_us(e.line, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::LineMiss(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "LineMiss",
                    "cat": "Beam",
                    "ts": lines_to_us(frame_origin + u64::from(e.line), line_ns),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "line": e.line,
                        "cursor": e.cursor,
                    }
                }));
            }
            RecordedEvent::Command(e) => {
                latest = e.line;
                let (name, detail) = match e.outcome {
                    FeedOutcome::Pending => continue,
                    FeedOutcome::Dispatched(op) => ("Command", op.to_string()),
                    FeedOutcome::Discarded => ("Discarded", String::new()),
                    FeedOutcome::Rejected(op, err) => ("Rejected", format!("{op}: {err}")),
                    FeedOutcome::Text(changed) => ("Text", changed.to_string()),
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Input",
                    "ts": lines_to_us(e.line, line_ns),
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "detail": detail,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": lines_to_us(latest, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "lines_painted": s.lines_painted,
                        "lines_missed": s.lines_missed,
                        "bytes": s.bytes,
                        "commands": s.commands,
                        "discarded": s.discarded,
                        "rejected": s.rejected,
                        "dispatch_budget": s.dispatch_budget,
                        "fill_us": lines_to_us(s.fill_lines, line_ns),
                        "blanking_us": lines_to_us(s.blanking_lines, line_ns),
                        "prefill_us": lines_to_us(s.prefill_lines, line_ns),
                    }
                }));
            }
            RecordedEvent::IndexChangesCount { frame_index, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "IndexChanges",
                    "cat": "Rich",
                    "ts": lines_to_us(latest, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "count": count,
                    }
                }));
            }
            RecordedEvent::PainterChangesCount {
                frame_index,
                rebuilt,
                reused,
                dropped,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "PainterChanges",
                    "cat": "Rich",
                    "ts": lines_to_us(latest, line_ns),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "rebuilt": rebuilt,
                        "reused": reused,
                        "dropped": dropped,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn lines_to_us(lines: u64, line_ns: u32) -> f64 {
    lines as f64 * f64::from(line_ns) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scanvas_core::backend::Opcode;
    use scanvas_core::trace::{
        CommandEvent, FrameStartEvent, LineMissEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
        TraceSink,
    };

    fn display() -> DisplayConfig {
        DisplayConfig {
            line_period_ns: 2_000,
            ..DisplayConfig::qvga_320x240()
        }
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_start(&FrameStartEvent {
            frame_index: 0,
            line: 100,
            live_primitives: 3,
            dispatch_budget: 16,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Fill,
            line: 100,
        });
        rec.on_line_miss(&LineMissEvent {
            frame_index: 0,
            line: 5,
            cursor: 6,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Fill,
            line: 340,
        });
        rec.on_command(&CommandEvent {
            frame_index: 0,
            line: 341,
            outcome: FeedOutcome::Dispatched(Opcode::Primitive(41)),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &display(), &mut out).unwrap();

        let parsed: Value = serde_json::from_slice(&out).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 5);

        assert_eq!(arr[0]["name"], "FrameStart");
        assert_eq!(arr[0]["ts"], 200.0);
        assert_eq!(arr[1]["ph"], "B");
        assert_eq!(arr[1]["name"], "Fill");
        assert_eq!(arr[2]["name"], "LineMiss");
        assert_eq!(arr[2]["ts"], 210.0, "misses sit at the frame origin plus their line");
        assert_eq!(arr[3]["ph"], "E");
        assert_eq!(arr[3]["ts"], 680.0);
        assert_eq!(arr[4]["args"]["detail"], "op:41");
    }

    #[test]
    fn pending_bytes_are_skipped() {
        let mut rec = RecorderSink::new();
        rec.on_command(&CommandEvent {
            frame_index: 0,
            line: 1,
            outcome: FeedOutcome::Pending,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), &display(), &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert!(parsed.as_array().unwrap().is_empty(), "{parsed}");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &display(), &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 0);
    }
}
