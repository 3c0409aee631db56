// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed commands.

use alloc::vec::Vec;

use scanvas_core::bitmap::PixelMode;
use scanvas_core::color::Color;
use scanvas_core::geometry::Point;
use scanvas_core::scene::{PrimitiveFlags, PrimitiveId};

/// One primitive command.
///
/// Coordinates travel as `i16` and are widened on decode; encoding
/// saturates out-of-range values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Op 0.
    SetFlags {
        /// Target.
        id: PrimitiveId,
        /// New caller-settable flags.
        flags: PrimitiveFlags,
    },
    /// Op 1.
    MoveAbsolute {
        /// Target.
        id: PrimitiveId,
        /// New position relative to the parent.
        to: Point,
    },
    /// Op 2.
    MoveRelative {
        /// Target.
        id: PrimitiveId,
        /// Horizontal step.
        dx: i32,
        /// Vertical step.
        dy: i32,
    },
    /// Op 3.
    Delete {
        /// Target.
        id: PrimitiveId,
    },
    /// Op 4.
    RegeneratePainters {
        /// Target.
        id: PrimitiveId,
    },
    /// Op 5.
    SetMotion {
        /// Target.
        id: PrimitiveId,
        /// Horizontal step per frame.
        dx: i32,
        /// Vertical step per frame.
        dy: i32,
        /// Frames to move.
        count: u16,
    },
    /// Op 6.
    SetColor {
        /// Target.
        id: PrimitiveId,
        /// New color.
        color: Color,
    },
    /// Op 7.
    Attach {
        /// Primitive to move.
        id: PrimitiveId,
        /// New parent.
        parent: PrimitiveId,
    },
    /// Op 8.
    Detach {
        /// Primitive to unlink.
        id: PrimitiveId,
    },
    /// Ops 10–65, 80, 81, 90, 100–102, 120–122 and 140.
    Create {
        /// ID of the new primitive.
        id: PrimitiveId,
        /// Parent.
        parent: PrimitiveId,
        /// Initial flags.
        flags: PrimitiveFlags,
        /// What to create.
        shape: ShapeCommand,
    },
    /// Op 82.
    SetTile {
        /// Target tile set.
        id: PrimitiveId,
        /// Cell column.
        column: u16,
        /// Cell row.
        row: u16,
        /// Tile bitmap index.
        tile: u16,
    },
    /// Op 83.
    SetTilePixel {
        /// Target tile set.
        id: PrimitiveId,
        /// Tile bitmap index.
        tile: u16,
        /// Pixel position in the tile.
        at: Point,
        /// Pixel value.
        color: Color,
    },
    /// Op 84.
    SetTilePixels {
        /// Target tile set.
        id: PrimitiveId,
        /// Tile bitmap index.
        tile: u16,
        /// First pixel.
        at: Point,
        /// Pixels, row-major, wrapping at the tile width.
        colors: Vec<Color>,
    },
    /// Op 85.
    SetTileRow {
        /// Target tile set.
        id: PrimitiveId,
        /// First cell column.
        column: u16,
        /// Cell row.
        row: u16,
        /// Tile bitmap indices.
        tiles: Vec<u16>,
    },
    /// Op 86.
    SetTileOffset {
        /// Target tile map.
        id: PrimitiveId,
        /// Pan offset.
        offset: Point,
    },
    /// Op 91.
    SelectTerminal {
        /// Target terminal.
        id: PrimitiveId,
    },
    /// Op 92.
    DefineGlyph {
        /// Target terminal.
        id: PrimitiveId,
        /// Character code.
        code: u8,
        /// Eight rows, most significant bit leftmost.
        rows: [u8; 8],
    },
    /// Op 93.
    SetTerminalCursor {
        /// Target terminal.
        id: PrimitiveId,
        /// Cursor column.
        column: u16,
        /// Cursor row.
        row: u16,
    },
    /// Op 110.
    SetBitmapPixel {
        /// Target bitmap.
        id: PrimitiveId,
        /// Pixel position.
        at: Point,
        /// Pixel value.
        color: Color,
    },
    /// Op 111.
    SetBitmapPixels {
        /// Target bitmap.
        id: PrimitiveId,
        /// First pixel.
        at: Point,
        /// Pixels, row-major, wrapping at the bitmap width.
        colors: Vec<Color>,
    },
}

/// The shape half of a creation command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeCommand {
    /// Op 10.
    Point {
        /// Pixel position.
        at: Point,
        /// Color.
        color: Color,
    },
    /// Op 20.
    Line {
        /// Color.
        color: Color,
        /// Start.
        from: Point,
        /// End.
        to: Point,
    },
    /// Ops 30/31.
    Triangle {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Vertices.
        points: [Point; 3],
    },
    /// Ops 32/33.
    TriangleList {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Independent triangles.
        triangles: Vec<[Point; 3]>,
    },
    /// Ops 34/35.
    TriangleFan {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Hub, first rim point, then one point per triangle.
        points: Vec<Point>,
    },
    /// Ops 36/37.
    TriangleStrip {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Two seed points, then one point per triangle.
        points: Vec<Point>,
    },
    /// Ops 40/41.
    Rect {
        /// Filled rather than outlined.
        solid: bool,
        /// Top-left corner.
        origin: Point,
        /// Width.
        width: u16,
        /// Height.
        height: u16,
        /// Color.
        color: Color,
    },
    /// Ops 50/51.
    Ellipse {
        /// Filled rather than outlined.
        solid: bool,
        /// Top-left corner of the bounding box.
        origin: Point,
        /// Width.
        width: u16,
        /// Height.
        height: u16,
        /// Color.
        color: Color,
    },
    /// Ops 60/61.
    Quad {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Vertices.
        points: [Point; 4],
    },
    /// Ops 62/63.
    QuadList {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Independent quads.
        quads: Vec<[Point; 4]>,
    },
    /// Ops 64/65.
    QuadStrip {
        /// Filled rather than outlined.
        solid: bool,
        /// Color.
        color: Color,
        /// Two seed points, then two points per quad.
        points: Vec<Point>,
    },
    /// Op 80.
    TileMap {
        /// Grid columns.
        columns: u16,
        /// Grid rows.
        rows: u16,
        /// Tile bitmaps.
        bitmaps: u16,
        /// Tile width.
        tile_width: u16,
        /// Tile height.
        tile_height: u16,
        /// Window width.
        width: u16,
        /// Window height.
        height: u16,
    },
    /// Op 81.
    TileArray {
        /// Grid columns.
        columns: u16,
        /// Grid rows.
        rows: u16,
        /// Tile bitmaps.
        bitmaps: u16,
        /// Tile width.
        tile_width: u16,
        /// Tile height.
        tile_height: u16,
    },
    /// Op 90.
    Terminal {
        /// Top-left corner.
        origin: Point,
        /// Character columns.
        columns: u16,
        /// Character rows.
        rows: u16,
        /// Text color.
        fg: Color,
        /// Cell background.
        bg: Color,
    },
    /// Ops 100–102.
    Bitmap {
        /// Width.
        width: u16,
        /// Height.
        height: u16,
        /// Pixel combination.
        mode: PixelMode,
    },
    /// Ops 120–122.
    BitmapReference {
        /// Bitmap whose pixels are drawn.
        source: PrimitiveId,
        /// Pixel combination.
        mode: PixelMode,
    },
    /// Op 140.
    Group {
        /// Top-left corner.
        origin: Point,
        /// Width.
        width: u16,
        /// Height.
        height: u16,
    },
}

/// A legacy system command, forwarded to a [`SystemHandler`](crate::SystemHandler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemCommand {
    /// `0x80`: the host checks the link; the byte should be echoed.
    GeneralPoll {
        /// Byte to echo.
        echo: u8,
    },
    /// `0x81`.
    SetKeyboardLayout {
        /// Layout number.
        layout: u8,
    },
    /// `0x82`.
    QueryCursorPosition,
    /// `0x86`.
    QueryModeInfo,
}

impl Command {
    /// The wire opcode.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        match self {
            Self::SetFlags { .. } => 0,
            Self::MoveAbsolute { .. } => 1,
            Self::MoveRelative { .. } => 2,
            Self::Delete { .. } => 3,
            Self::RegeneratePainters { .. } => 4,
            Self::SetMotion { .. } => 5,
            Self::SetColor { .. } => 6,
            Self::Attach { .. } => 7,
            Self::Detach { .. } => 8,
            Self::Create { shape, .. } => shape.opcode(),
            Self::SetTile { .. } => 82,
            Self::SetTilePixel { .. } => 83,
            Self::SetTilePixels { .. } => 84,
            Self::SetTileRow { .. } => 85,
            Self::SetTileOffset { .. } => 86,
            Self::SelectTerminal { .. } => 91,
            Self::DefineGlyph { .. } => 92,
            Self::SetTerminalCursor { .. } => 93,
            Self::SetBitmapPixel { .. } => 110,
            Self::SetBitmapPixels { .. } => 111,
        }
    }
}

impl ShapeCommand {
    /// The wire opcode of the creation command.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        let solid = |s: bool, outline: u8| outline + u8::from(s);
        match self {
            Self::Point { .. } => 10,
            Self::Line { .. } => 20,
            Self::Triangle { solid: s, .. } => solid(*s, 30),
            Self::TriangleList { solid: s, .. } => solid(*s, 32),
            Self::TriangleFan { solid: s, .. } => solid(*s, 34),
            Self::TriangleStrip { solid: s, .. } => solid(*s, 36),
            Self::Rect { solid: s, .. } => solid(*s, 40),
            Self::Ellipse { solid: s, .. } => solid(*s, 50),
            Self::Quad { solid: s, .. } => solid(*s, 60),
            Self::QuadList { solid: s, .. } => solid(*s, 62),
            Self::QuadStrip { solid: s, .. } => solid(*s, 64),
            Self::TileMap { .. } => 80,
            Self::TileArray { .. } => 81,
            Self::Terminal { .. } => 90,
            Self::Bitmap { mode, .. } => 100 + mode_offset(*mode),
            Self::BitmapReference { mode, .. } => 120 + mode_offset(*mode),
            Self::Group { .. } => 140,
        }
    }
}

impl SystemCommand {
    /// The wire opcode.
    #[must_use]
    pub fn opcode(self) -> u8 {
        match self {
            Self::GeneralPoll { .. } => 0x80,
            Self::SetKeyboardLayout { .. } => 0x81,
            Self::QueryCursorPosition => 0x82,
            Self::QueryModeInfo => 0x86,
        }
    }
}

fn mode_offset(mode: PixelMode) -> u8 {
    match mode {
        PixelMode::Solid => 0,
        PixelMode::Masked(_) => 1,
        PixelMode::Transparent => 2,
    }
}
