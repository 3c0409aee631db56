// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scan-out run that exercises the tracing and diagnostics pipeline.
//!
//! Builds a small scene over the wire, runs 60 frames on simulated hardware
//! while recording events to both a
//! [`PrettyPrintSink`](scanvas_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](scanvas_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use scanvas_core::color::{Color, Opacity};
use scanvas_core::geometry::Point;
use scanvas_core::scene::{PrimitiveFlags, PrimitiveId, RangeChange};
use scanvas_core::trace::{
    CommandEvent, FrameStartEvent, FrameSummary, LineMissEvent, PainterChange, PhaseBeginEvent,
    PhaseEndEvent, TraceSink,
};
use scanvas_protocol::{Command, ShapeCommand};
use scanvas_sim::{SimConfig, Simulator};

use scanvas_debug::pretty::PrettyPrintSink;
use scanvas_debug::recorder::RecorderSink;

const FRAME_COUNT: usize = 60;

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        self.pretty.on_frame_start(e);
        self.recorder.on_frame_start(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_line_miss(&mut self, e: &LineMissEvent) {
        self.pretty.on_line_miss(e);
        self.recorder.on_line_miss(e);
    }

    fn on_command(&mut self, e: &CommandEvent) {
        self.pretty.on_command(e);
        self.recorder.on_command(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.recorder.on_frame_summary(s);
    }

    fn on_index_changes(&mut self, frame_index: u64, changes: &[RangeChange]) {
        self.pretty.on_index_changes(frame_index, changes);
        self.recorder.on_index_changes(frame_index, changes);
    }

    fn on_painter_changes(&mut self, frame_index: u64, changes: &[PainterChange]) {
        self.pretty.on_painter_changes(frame_index, changes);
        self.recorder.on_painter_changes(frame_index, changes);
    }
}

fn create(id: u16, parent: PrimitiveId, flags: PrimitiveFlags, shape: ShapeCommand) -> Command {
    Command::Create {
        id: PrimitiveId(id),
        parent,
        flags,
        shape,
    }
}

fn main() {
    let config = SimConfig::qvga();
    let display = config.display;
    let mut sim = Simulator::new(config);

    // -- scene -------------------------------------------------------------
    let visible = PrimitiveFlags::VISIBLE;
    let scrolling = visible | PrimitiveFlags::H_SCROLL_1;
    let panel = PrimitiveId(1);
    sim.send(&create(
        1,
        PrimitiveId::ROOT,
        visible | PrimitiveFlags::CLIP_CHILDREN,
        ShapeCommand::Rect {
            solid: true,
            origin: Point::new(20, 20),
            width: 280,
            height: 200,
            color: Color::opaque_rgb(0, 0, 1),
        },
    ));
    sim.send(&create(
        2,
        panel,
        scrolling,
        ShapeCommand::Ellipse {
            solid: true,
            origin: Point::new(10, 10),
            width: 40,
            height: 30,
            color: Color::opaque_rgb(3, 1, 0),
        },
    ));
    sim.send(&create(
        3,
        panel,
        visible,
        ShapeCommand::Triangle {
            solid: false,
            color: Color::WHITE,
            points: [Point::new(150, 20), Point::new(250, 180), Point::new(60, 150)],
        },
    ));
    sim.send(&create(
        4,
        panel,
        visible,
        ShapeCommand::Rect {
            solid: true,
            origin: Point::new(100, 60),
            width: 80,
            height: 50,
            color: Color::new(Opacity::Half, Color::opaque_rgb(0, 3, 0).rgb()),
        },
    ));
    sim.send(&Command::SetMotion {
        id: PrimitiveId(2),
        dx: 3,
        dy: 2,
        count: 40,
    });

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), display);
    let mut recorder = RecorderSink::new();

    // -- simulated loop ----------------------------------------------------
    for frame in 0..FRAME_COUNT {
        if frame == 30 {
            sim.send(&Command::MoveRelative {
                id: PrimitiveId(3),
                dx: -20,
                dy: 0,
            });
            sim.hardware_mut().inject_stall(200);
        }
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        sim.run_frame_traced(&mut tee);
    }

    if let Some(report) = sim.report() {
        println!(
            "grade={} misses/1000={:.1} history={}",
            report.grade.as_str(),
            report.miss_rate_per_1000,
            sim.tracker().sparkline_ascii(8),
        );
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    scanvas_debug::chrome::export(recorder.as_bytes(), &display, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames)");
}
