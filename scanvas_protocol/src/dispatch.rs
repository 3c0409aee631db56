// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The incremental byte parser.
//!
//! An unknown sub-protocol or opcode has no known length, so only its
//! header is dropped. Any body bytes the host sent after it arrive outside
//! a command and are shown as text on the active terminal, unless they
//! contain the category byte, which starts a new command.

use alloc::vec::Vec;

use scanvas_core::backend::{CommandSink, FeedOutcome, Opcode};
use scanvas_core::color::Color;
use scanvas_core::scene::{Scene, SceneError};

use crate::command::SystemCommand;
use crate::decode::{StreamTarget, decode, decode_stream, decode_system};
use crate::table::{
    CATEGORY, CommandShape, HEADER_LEN, SUB_PRIMITIVE, SUB_SYSTEM, primitive_shape, system_len,
};

/// Receives legacy system commands.
///
/// Replies travel over a link this crate does not own, so handlers are
/// expected to queue them.
pub trait SystemHandler {
    /// Handles one complete system command.
    fn handle(&mut self, command: SystemCommand);
}

/// A [`SystemHandler`] that ignores every command.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreSystem;

impl SystemHandler for IgnoreSystem {
    fn handle(&mut self, command: SystemCommand) {
        _ = command;
    }
}

/// What the buffered bytes are known to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    /// Nothing buffered.
    Idle,
    /// Header incomplete.
    Header,
    /// A command of known shape; `len` is its total once known.
    Body {
        op: Opcode,
        shape: CommandShape,
        len: Option<usize>,
    },
    /// Pixels of a streaming command. Only the first refusal is kept.
    Stream {
        op: u8,
        target: StreamTarget,
        count: u16,
        index: u16,
        error: Option<SceneError>,
    },
}

/// Turns the command byte stream into scene operations.
///
/// Bytes outside a command are text for the active terminal. A command is
/// buffered until its last byte arrives and then runs exactly once;
/// streaming pixel commands apply each pixel as it arrives and flush when
/// the last one lands. Unknown sub-protocols and opcodes are dropped as
/// soon as they are recognized.
#[derive(Debug)]
pub struct Dispatcher<H = IgnoreSystem> {
    buf: Vec<u8>,
    state: Pending,
    system: H,
}

impl Dispatcher {
    /// Creates a dispatcher that ignores system commands.
    #[must_use]
    pub fn new() -> Self {
        Self::with_system(IgnoreSystem)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SystemHandler> Dispatcher<H> {
    /// Creates a dispatcher forwarding system commands to `system`.
    #[must_use]
    pub fn with_system(system: H) -> Self {
        Self {
            buf: Vec::new(),
            state: Pending::Idle,
            system,
        }
    }

    /// The system command handler.
    #[must_use]
    pub fn system(&self) -> &H {
        &self.system
    }

    /// Bytes buffered for the current command.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.state = Pending::Idle;
    }

    fn discard(&mut self) -> FeedOutcome {
        self.reset();
        FeedOutcome::Discarded
    }

    /// Resolves the command shape once the opcode has arrived.
    fn start(&mut self, scene: &mut Scene) -> FeedOutcome {
        let (sub, code) = (self.buf[1], self.buf[2]);
        let resolved = match sub {
            SUB_SYSTEM => system_len(code).map(|len| (Opcode::System(code), CommandShape::Fixed(len))),
            _ => primitive_shape(code).map(|shape| (Opcode::Primitive(code), shape)),
        };
        let Some((op, shape)) = resolved else {
            return self.discard();
        };
        let len = match shape {
            CommandShape::Fixed(len) => Some(len),
            _ => None,
        };
        self.advance(scene, op, shape, len)
    }

    /// Runs the command if the buffer completes it.
    fn advance(
        &mut self,
        scene: &mut Scene,
        op: Opcode,
        shape: CommandShape,
        mut len: Option<usize>,
    ) -> FeedOutcome {
        if len.is_none()
            && let Some(end) = shape.count_end()
            && self.buf.len() == end
        {
            let count = u16::from_le_bytes([self.buf[end - 2], self.buf[end - 1]]);
            if let (CommandShape::Streaming { .. }, Opcode::Primitive(code)) = (shape, op) {
                return self.start_stream(code, count);
            }
            len = Some(shape.total_len(count));
        }
        match len {
            Some(len) if self.buf.len() >= len => self.run(scene, op),
            _ => {
                self.state = Pending::Body { op, shape, len };
                FeedOutcome::Pending
            }
        }
    }

    fn start_stream(&mut self, code: u8, count: u16) -> FeedOutcome {
        let Some((target, _)) = decode_stream(code, &self.buf) else {
            return self.discard();
        };
        self.buf.clear();
        if count == 0 {
            self.reset();
            return FeedOutcome::Dispatched(Opcode::Primitive(code));
        }
        self.state = Pending::Stream {
            op: code,
            target,
            count,
            index: 0,
            error: None,
        };
        FeedOutcome::Pending
    }

    /// Decodes and runs the complete buffered command, then clears the
    /// buffer.
    fn run(&mut self, scene: &mut Scene, op: Opcode) -> FeedOutcome {
        let outcome = match op {
            Opcode::System(code) => match decode_system(code, &self.buf) {
                Some(command) => {
                    self.system.handle(command);
                    FeedOutcome::Dispatched(op)
                }
                None => FeedOutcome::Discarded,
            },
            Opcode::Primitive(code) => match decode(code, &self.buf) {
                Some(command) => match command.apply(scene) {
                    Ok(()) => FeedOutcome::Dispatched(op),
                    Err(e) => FeedOutcome::Rejected(op, e),
                },
                None => FeedOutcome::Discarded,
            },
        };
        self.reset();
        outcome
    }

    fn stream_pixel(
        &mut self,
        scene: &mut Scene,
        byte: u8,
        (op, target, count, index, error): (u8, StreamTarget, u16, u16, Option<SceneError>),
    ) -> FeedOutcome {
        let written = match target {
            StreamTarget::Bitmap { id, at } => {
                scene.write_bitmap_run(id, at.x, at.y, usize::from(index), Color(byte))
            }
            StreamTarget::Tile { id, tile, at } => {
                scene.write_tile_run(id, tile, at.x, at.y, usize::from(index), Color(byte))
            }
        };
        let error = error.or(written.err());
        let index = index + 1;
        if index < count {
            self.state = Pending::Stream {
                op,
                target,
                count,
                index,
                error,
            };
            return FeedOutcome::Pending;
        }
        scene.finish_stream();
        self.reset();
        let op = Opcode::Primitive(op);
        match error {
            None => FeedOutcome::Dispatched(op),
            Some(e) => FeedOutcome::Rejected(op, e),
        }
    }
}

impl<H: SystemHandler> CommandSink for Dispatcher<H> {
    fn feed(&mut self, scene: &mut Scene, byte: u8) -> FeedOutcome {
        match self.state {
            Pending::Idle => {
                if byte != CATEGORY {
                    return FeedOutcome::Text(scene.terminal_text(byte));
                }
                self.buf.push(byte);
                self.state = Pending::Header;
                FeedOutcome::Pending
            }
            Pending::Header => {
                self.buf.push(byte);
                match self.buf.len() {
                    2 if byte != SUB_SYSTEM && byte != SUB_PRIMITIVE => self.discard(),
                    n if n < HEADER_LEN => FeedOutcome::Pending,
                    _ => self.start(scene),
                }
            }
            Pending::Body { op, shape, len } => {
                self.buf.push(byte);
                self.advance(scene, op, shape, len)
            }
            Pending::Stream {
                op,
                target,
                count,
                index,
                error,
            } => self.stream_pixel(scene, byte, (op, target, count, index, error)),
        }
    }

    fn is_idle(&self) -> bool {
        self.state == Pending::Idle
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use scanvas_core::bitmap::PixelMode;
    use scanvas_core::display::DisplayConfig;
    use scanvas_core::geometry::{LineRange, Point};
    use scanvas_core::scene::{BitmapSource, PrimitiveFlags, PrimitiveId, SceneConfig, Shape};

    use super::*;
    use crate::command::{Command, ShapeCommand};

    const A: PrimitiveId = PrimitiveId(1);

    fn scene() -> Scene {
        Scene::new(DisplayConfig::qvga_320x240(), SceneConfig::compact())
    }

    fn feed_all(d: &mut Dispatcher<impl SystemHandler>, s: &mut Scene, bytes: &[u8]) -> Vec<FeedOutcome> {
        bytes.iter().map(|&b| d.feed(s, b)).collect()
    }

    fn create_rect() -> Command {
        Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::Rect {
                solid: true,
                origin: Point::new(10, 20),
                width: 30,
                height: 5,
                color: Color::WHITE,
            },
        }
    }

    #[test]
    fn fixed_command_dispatches_on_its_last_byte() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let bytes = create_rect().to_bytes();
        assert_eq!(bytes.len(), 18);

        let outcomes = feed_all(&mut d, &mut s, &bytes);
        let (last, rest) = outcomes.split_last().unwrap();
        assert!(rest.iter().all(|o| *o == FeedOutcome::Pending));
        assert_eq!(*last, FeedOutcome::Dispatched(Opcode::Primitive(41)));
        assert!(d.is_idle());
        assert_eq!(
            s.draw_extent(A).and_then(|r| r.line_range()),
            Some(LineRange::new(20, 25))
        );
    }

    #[test]
    fn variable_command_waits_for_all_records() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let array = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::TileArray {
                columns: 8,
                rows: 1,
                bitmaps: 3,
                tile_width: 8,
                tile_height: 8,
            },
        };
        feed_all(&mut d, &mut s, &array.to_bytes());

        let row = Command::SetTileRow {
            id: A,
            column: 1,
            row: 0,
            tiles: vec![2, 1, 0, 1, 2],
        }
        .to_bytes();
        let base = 11;
        assert_eq!(row.len(), base + 10);

        let outcomes = feed_all(&mut d, &mut s, &row);
        for (i, outcome) in outcomes.iter().enumerate() {
            let expected = if i + 1 == base + 10 {
                FeedOutcome::Dispatched(Opcode::Primitive(85))
            } else {
                FeedOutcome::Pending
            };
            assert_eq!(*outcome, expected, "byte {i}");
        }
        let Some(Shape::Tiles(tiles)) = s.shape(A) else {
            panic!("expected tiles");
        };
        assert_eq!(tiles.tile(3, 0), Some(0));
        assert_eq!(tiles.tile(5, 0), Some(2));
    }

    #[test]
    fn stream_applies_pixels_as_they_arrive() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let bitmap = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::Bitmap {
                width: 2,
                height: 2,
                mode: PixelMode::Solid,
            },
        };
        feed_all(&mut d, &mut s, &bitmap.to_bytes());

        let pixels = Command::SetBitmapPixels {
            id: A,
            at: Point::new(0, 0),
            colors: vec![Color(0xC1), Color(0xC2), Color(0xC3)],
        }
        .to_bytes();
        let header = 11;
        let outcomes = feed_all(&mut d, &mut s, &pixels[..header + 2]);
        assert!(outcomes.iter().all(|o| *o == FeedOutcome::Pending));
        let Some(Shape::Bitmap {
            source: BitmapSource::Owned(b),
            ..
        }) = s.shape(A)
        else {
            panic!("expected a bitmap");
        };
        assert_eq!(b.row(0), Some(&[0xC1, 0xC2][..]), "pixels land before the end");

        assert_eq!(
            d.feed(&mut s, pixels[header + 2]),
            FeedOutcome::Dispatched(Opcode::Primitive(111))
        );
        assert!(s.last_changes().rebuilt.contains(&A));
        assert!(d.is_idle());
    }

    #[test]
    fn stream_reports_first_refusal_and_stays_in_sync() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let pixels = Command::SetBitmapPixels {
            id: A,
            at: Point::new(0, 0),
            colors: vec![Color(1), Color(2)],
        }
        .to_bytes();
        let outcomes = feed_all(&mut d, &mut s, &pixels);
        assert_eq!(
            outcomes.last(),
            Some(&FeedOutcome::Rejected(
                Opcode::Primitive(111),
                SceneError::UnknownTarget(A)
            ))
        );
        assert!(d.is_idle());
        assert_eq!(d.feed(&mut s, b'x'), FeedOutcome::Text(false));
    }

    #[test]
    fn unknown_commands_are_dropped() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        assert_eq!(
            feed_all(&mut d, &mut s, &[CATEGORY, SUB_PRIMITIVE, 150]),
            [FeedOutcome::Pending, FeedOutcome::Pending, FeedOutcome::Discarded]
        );
        assert_eq!(
            feed_all(&mut d, &mut s, &[CATEGORY, 7]),
            [FeedOutcome::Pending, FeedOutcome::Discarded]
        );
        assert!(d.is_idle());
        // The stream stays usable.
        let outcomes = feed_all(&mut d, &mut s, &create_rect().to_bytes());
        assert_eq!(
            outcomes.last(),
            Some(&FeedOutcome::Dispatched(Opcode::Primitive(41)))
        );
    }

    #[test]
    fn unknown_command_body_becomes_text() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let terminal = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::Terminal {
                origin: Point::new(0, 0),
                columns: 4,
                rows: 1,
                fg: Color::WHITE,
                bg: Color::BLACK,
            },
        };
        feed_all(&mut d, &mut s, &terminal.to_bytes());
        feed_all(&mut d, &mut s, &Command::SelectTerminal { id: A }.to_bytes());

        let outcomes = feed_all(&mut d, &mut s, &[CATEGORY, SUB_PRIMITIVE, 150, b'o', b'k']);
        assert_eq!(outcomes[2], FeedOutcome::Discarded);
        assert_eq!(outcomes[3..], [FeedOutcome::Text(true), FeedOutcome::Text(true)]);
        let Some(Shape::Terminal(t)) = s.shape(A) else {
            panic!("expected a terminal");
        };
        assert_eq!(t.cell(0, 0), Some(b'o'));
        assert_eq!(t.cell(1, 0), Some(b'k'));
    }

    #[test]
    fn oversized_creates_are_refused_without_allocating() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let grid = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::TileArray {
                columns: u16::MAX,
                rows: 1,
                bitmaps: 0,
                tile_width: u16::MAX,
                tile_height: 1,
            },
        };
        let outcomes = feed_all(&mut d, &mut s, &grid.to_bytes());
        assert_eq!(
            outcomes.last(),
            Some(&FeedOutcome::Rejected(
                Opcode::Primitive(81),
                SceneError::OutOfBounds(A)
            ))
        );

        let bitmap = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::Bitmap {
                width: u16::MAX,
                height: u16::MAX,
                mode: PixelMode::Solid,
            },
        };
        let outcomes = feed_all(&mut d, &mut s, &bitmap.to_bytes());
        assert_eq!(
            outcomes.last(),
            Some(&FeedOutcome::Rejected(
                Opcode::Primitive(100),
                SceneError::OutOfBounds(A)
            ))
        );
        assert!(!s.is_live(A));
        assert!(d.is_idle());
    }

    #[test]
    fn refused_commands_leave_the_scene_alone() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let delete_root = Command::Delete {
            id: PrimitiveId::ROOT,
        }
        .to_bytes();
        let outcomes = feed_all(&mut d, &mut s, &delete_root);
        assert_eq!(
            outcomes.last(),
            Some(&FeedOutcome::Rejected(
                Opcode::Primitive(3),
                SceneError::InvalidId(0)
            ))
        );
        assert!(s.is_live(PrimitiveId::ROOT));
    }

    #[test]
    fn text_reaches_the_active_terminal() {
        let mut s = scene();
        let mut d = Dispatcher::new();
        let terminal = Command::Create {
            id: A,
            parent: PrimitiveId::ROOT,
            flags: PrimitiveFlags::VISIBLE,
            shape: ShapeCommand::Terminal {
                origin: Point::new(0, 0),
                columns: 10,
                rows: 2,
                fg: Color::WHITE,
                bg: Color::BLACK,
            },
        };
        feed_all(&mut d, &mut s, &terminal.to_bytes());
        feed_all(&mut d, &mut s, &Command::SelectTerminal { id: A }.to_bytes());
        assert_eq!(
            feed_all(&mut d, &mut s, b"hi"),
            [FeedOutcome::Text(true), FeedOutcome::Text(true)]
        );
        let Some(Shape::Terminal(t)) = s.shape(A) else {
            panic!("expected a terminal");
        };
        assert_eq!(t.cell(1, 0), Some(b'i'));
    }

    #[test]
    fn system_commands_reach_the_handler() {
        #[derive(Default)]
        struct Log(Vec<SystemCommand>);
        impl SystemHandler for Log {
            fn handle(&mut self, command: SystemCommand) {
                self.0.push(command);
            }
        }

        let mut s = scene();
        let mut d = Dispatcher::with_system(Log::default());
        let poll = SystemCommand::GeneralPoll { echo: 0x5A }.to_bytes();
        assert_eq!(poll, [CATEGORY, SUB_SYSTEM, 0x80, 0x5A]);
        let outcomes = feed_all(&mut d, &mut s, &poll);
        assert_eq!(outcomes[3], FeedOutcome::Dispatched(Opcode::System(0x80)));
        feed_all(&mut d, &mut s, &SystemCommand::QueryModeInfo.to_bytes());
        assert_eq!(
            feed_all(&mut d, &mut s, &[CATEGORY, SUB_SYSTEM, 0x99]),
            [FeedOutcome::Pending, FeedOutcome::Pending, FeedOutcome::Discarded]
        );
        assert_eq!(
            d.system().0,
            [
                SystemCommand::GeneralPoll { echo: 0x5A },
                SystemCommand::QueryModeInfo
            ]
        );
    }

    #[test]
    fn every_encoded_shape_creates_a_primitive() {
        let p = Point::new;
        let shapes = [
            ShapeCommand::Point { at: p(5, 5), color: Color::WHITE },
            ShapeCommand::Line { color: Color::WHITE, from: p(0, 0), to: p(9, 4) },
            ShapeCommand::Triangle { solid: true, color: Color::WHITE, points: [p(0, 0), p(8, 0), p(4, 6)] },
            ShapeCommand::TriangleList {
                solid: false,
                color: Color::WHITE,
                triangles: vec![[p(0, 0), p(8, 0), p(4, 6)], [p(20, 0), p(28, 0), p(24, 6)]],
            },
            ShapeCommand::TriangleFan { solid: true, color: Color::WHITE, points: vec![p(0, 0), p(9, 0), p(9, 9), p(0, 9)] },
            ShapeCommand::TriangleStrip { solid: false, color: Color::WHITE, points: vec![p(0, 0), p(0, 9), p(9, 0), p(9, 9)] },
            ShapeCommand::Ellipse { solid: true, origin: p(3, 3), width: 12, height: 7, color: Color::WHITE },
            ShapeCommand::Quad { solid: true, color: Color::WHITE, points: [p(0, 0), p(9, 1), p(8, 9), p(1, 8)] },
            ShapeCommand::QuadList { solid: false, color: Color::WHITE, quads: vec![[p(0, 0), p(9, 0), p(9, 9), p(0, 9)]] },
            ShapeCommand::QuadStrip { solid: true, color: Color::WHITE, points: vec![p(0, 0), p(0, 5), p(5, 0), p(5, 5), p(9, 0), p(9, 5)] },
            ShapeCommand::TileMap { columns: 4, rows: 4, bitmaps: 2, tile_width: 8, tile_height: 8, width: 16, height: 16 },
            ShapeCommand::Bitmap { width: 4, height: 4, mode: PixelMode::Masked(Color(0xC3)) },
            ShapeCommand::Group { origin: p(1, 1), width: 30, height: 30 },
        ];
        let mut s = scene();
        let mut d = Dispatcher::new();
        for (i, shape) in shapes.into_iter().enumerate() {
            let id = PrimitiveId(u16::try_from(i + 1).unwrap());
            let op = shape.opcode();
            let bytes = Command::Create {
                id,
                parent: PrimitiveId::ROOT,
                flags: PrimitiveFlags::VISIBLE,
                shape,
            }
            .to_bytes();
            let outcomes = feed_all(&mut d, &mut s, &bytes);
            assert_eq!(
                outcomes.last(),
                Some(&FeedOutcome::Dispatched(Opcode::Primitive(op))),
                "opcode {op}"
            );
            assert!(outcomes[..outcomes.len() - 1].iter().all(|o| *o == FeedOutcome::Pending), "opcode {op}");
            assert!(s.is_live(id), "opcode {op}");
        }
    }
}
