// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side simulation of scanvas hardware.
//!
//! [`SimScanout`] is a line ring read by a simulated beam on a deterministic
//! tick clock; [`ByteQueue`] is the command link. [`Simulator`] wires both to
//! a scene, a [`Dispatcher`] and a [`Compositor`] so whole frames can be run
//! and the scanned image inspected:
//!
//! ```
//! use scanvas_core::color::Color;
//! use scanvas_core::geometry::Point;
//! use scanvas_core::scene::{PrimitiveFlags, PrimitiveId};
//! use scanvas_protocol::{Command, ShapeCommand};
//! use scanvas_sim::{SimConfig, Simulator};
//!
//! let mut sim = Simulator::new(SimConfig::qvga());
//! sim.send(&Command::Create {
//!     id: PrimitiveId(1),
//!     parent: PrimitiveId::ROOT,
//!     flags: PrimitiveFlags::VISIBLE,
//!     shape: ShapeCommand::Point { at: Point::new(5, 5), color: Color::WHITE },
//! });
//! sim.run_frames(2);
//! assert_eq!(sim.hardware().pixel(5, 5), Some(Color::WHITE.to_pixel(0xC0)));
//! ```

mod hardware;
mod source;
mod stats;

pub use hardware::{SimClock, SimScanout, SimTiming};
pub use source::ByteQueue;
pub use stats::{FrameGrade, FrameReport, MissTracker};

use scanvas_core::backend::CommandSink;
use scanvas_core::compositor::{Compositor, CompositorConfig};
use scanvas_core::display::DisplayConfig;
use scanvas_core::scene::{Scene, SceneConfig};
use scanvas_core::trace::{FrameSummary, TraceSink, Tracer};
use scanvas_protocol::{Command, Dispatcher, IgnoreSystem, SystemCommand, SystemHandler};

/// Frames kept by the simulator's [`MissTracker`].
pub const REPORT_WINDOW: usize = 60;

/// Everything needed to build a [`Simulator`].
#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    /// Video mode.
    pub display: DisplayConfig,
    /// Scene capacity.
    pub scene: SceneConfig,
    /// Dispatch budget policy.
    pub compositor: CompositorConfig,
    /// Line buffers in the ring.
    pub slots: u16,
    /// Hardware tick costs.
    pub timing: SimTiming,
    /// Ticks charged per command byte read. Zero makes commands free.
    pub byte_ticks: u64,
}

impl SimConfig {
    /// 320×240 with an eight-line ring and free commands.
    #[must_use]
    pub const fn qvga() -> Self {
        Self::with_display(DisplayConfig::qvga_320x240())
    }

    /// `display` with the defaults of [`qvga`](Self::qvga).
    #[must_use]
    pub const fn with_display(display: DisplayConfig) -> Self {
        Self {
            display,
            scene: SceneConfig::compact(),
            compositor: CompositorConfig::standard(),
            slots: 8,
            timing: SimTiming::relaxed(),
            byte_ticks: 0,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::qvga()
    }
}

/// A scene running on simulated hardware.
#[derive(Debug)]
pub struct Simulator<H = IgnoreSystem> {
    scene: Scene,
    compositor: Compositor,
    hardware: SimScanout,
    source: ByteQueue,
    dispatcher: Dispatcher<H>,
    tracker: MissTracker<REPORT_WINDOW>,
    report: Option<FrameReport>,
}

impl Simulator {
    /// Builds a simulator that ignores system commands.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self::with_system(config, IgnoreSystem)
    }
}

impl<H: SystemHandler> Simulator<H> {
    /// Builds a simulator forwarding system commands to `system`.
    #[must_use]
    pub fn with_system(config: SimConfig, system: H) -> Self {
        let hardware = SimScanout::new(config.display, config.slots, config.timing);
        let source = if config.byte_ticks == 0 {
            ByteQueue::new()
        } else {
            ByteQueue::timed(hardware.clock().clone(), config.byte_ticks)
        };
        Self {
            scene: Scene::new(config.display, config.scene),
            compositor: Compositor::new(config.compositor),
            hardware,
            source,
            dispatcher: Dispatcher::with_system(system),
            tracker: MissTracker::new(),
            report: None,
        }
    }

    /// Queues a command on the link.
    pub fn send(&mut self, command: &Command) {
        self.source.push(command);
    }

    /// Queues a system command on the link.
    pub fn send_system(&mut self, command: SystemCommand) {
        self.source.push_system(command);
    }

    /// Queues raw bytes on the link.
    pub fn send_bytes(&mut self, bytes: &[u8]) {
        self.source.push_bytes(bytes);
    }

    /// Runs one frame.
    pub fn run_frame(&mut self) -> FrameSummary {
        self.step(&mut Tracer::none(), &mut |_| {})
    }

    /// Runs one frame, reporting to `sink`.
    pub fn run_frame_traced(&mut self, sink: &mut dyn TraceSink) -> FrameSummary {
        self.step(&mut Tracer::new(sink), &mut |_| {})
    }

    /// Runs one frame with a hook called during blanking.
    pub fn run_frame_with(&mut self, blanking: &mut dyn FnMut(&mut Scene)) -> FrameSummary {
        self.step(&mut Tracer::none(), blanking)
    }

    /// Runs `frames` frames.
    pub fn run_frames(&mut self, frames: usize) -> Vec<FrameSummary> {
        (0..frames).map(|_| self.run_frame()).collect()
    }

    /// Runs frames until the link is empty and no command is half-received.
    ///
    /// Returns the number of frames run, or `None` if that took more than
    /// `max_frames`.
    pub fn run_until_drained(&mut self, max_frames: usize) -> Option<usize> {
        for frames in 0..=max_frames {
            if self.source.is_empty() && self.dispatcher.is_idle() {
                return Some(frames);
            }
            if frames < max_frames {
                self.run_frame();
            }
        }
        None
    }

    fn step(
        &mut self,
        tracer: &mut Tracer<'_>,
        blanking: &mut dyn FnMut(&mut Scene),
    ) -> FrameSummary {
        let summary = self.compositor.run_frame(
            &mut self.scene,
            &mut self.hardware,
            &mut self.source,
            &mut self.dispatcher,
            tracer,
            blanking,
        );
        self.report = Some(self.tracker.observe(&summary));
        summary
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, for direct edits between frames.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The simulated scan-out.
    #[must_use]
    pub fn hardware(&self) -> &SimScanout {
        &self.hardware
    }

    /// The simulated scan-out, for injecting stalls.
    pub fn hardware_mut(&mut self) -> &mut SimScanout {
        &mut self.hardware
    }

    /// The compositor.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    /// The command link.
    #[must_use]
    pub fn source(&self) -> &ByteQueue {
        &self.source
    }

    /// The report after the most recent frame.
    #[must_use]
    pub fn report(&self) -> Option<FrameReport> {
        self.report
    }

    /// Missed-line history of recent frames.
    #[must_use]
    pub fn tracker(&self) -> &MissTracker<REPORT_WINDOW> {
        &self.tracker
    }
}
