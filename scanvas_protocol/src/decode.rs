// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field decoding of complete command buffers.

use alloc::vec::Vec;

use scanvas_core::bitmap::PixelMode;
use scanvas_core::color::Color;
use scanvas_core::geometry::Point;
use scanvas_core::scene::PrimitiveId;

use crate::command::{Command, ShapeCommand, SystemCommand};
use crate::table::HEADER_LEN;
use crate::wire::Fields;

/// Decodes a complete primitive command, header included.
///
/// Streaming commands decode with every pixel present. Returns `None` for
/// unknown opcodes and short buffers.
#[must_use]
pub fn decode(op: u8, buf: &[u8]) -> Option<Command> {
    let mut f = Fields::at(buf, HEADER_LEN);
    let id = f.id()?;
    Some(match op {
        0 => Command::SetFlags {
            id,
            flags: f.flags()?,
        },
        1 => Command::MoveAbsolute { id, to: f.point()? },
        2 => Command::MoveRelative {
            id,
            dx: f.i16()?,
            dy: f.i16()?,
        },
        3 => Command::Delete { id },
        4 => Command::RegeneratePainters { id },
        5 => Command::SetMotion {
            id,
            dx: f.i16()?,
            dy: f.i16()?,
            count: f.u16()?,
        },
        6 => Command::SetColor {
            id,
            color: f.color()?,
        },
        7 => Command::Attach {
            id,
            parent: f.id()?,
        },
        8 => Command::Detach { id },
        82 => Command::SetTile {
            id,
            column: f.u16()?,
            row: f.u16()?,
            tile: f.u16()?,
        },
        83 => Command::SetTilePixel {
            id,
            tile: f.u16()?,
            at: f.point()?,
            color: f.color()?,
        },
        84 => {
            let tile = f.u16()?;
            let at = f.point()?;
            let n = f.u16()?;
            Command::SetTilePixels {
                id,
                tile,
                at,
                colors: colors(&mut f, n)?,
            }
        }
        85 => {
            let column = f.u16()?;
            let row = f.u16()?;
            let n = f.u16()?;
            Command::SetTileRow {
                id,
                column,
                row,
                tiles: (0..n).map(|_| f.u16()).collect::<Option<Vec<_>>>()?,
            }
        }
        86 => Command::SetTileOffset {
            id,
            offset: f.point()?,
        },
        91 => Command::SelectTerminal { id },
        92 => Command::DefineGlyph {
            id,
            code: f.u8()?,
            rows: f.array()?,
        },
        93 => Command::SetTerminalCursor {
            id,
            column: f.u16()?,
            row: f.u16()?,
        },
        110 => Command::SetBitmapPixel {
            id,
            at: f.point()?,
            color: f.color()?,
        },
        111 => {
            let at = f.point()?;
            let n = f.u16()?;
            Command::SetBitmapPixels {
                id,
                at,
                colors: colors(&mut f, n)?,
            }
        }
        _ => {
            let parent = f.id()?;
            let flags = f.flags()?;
            Command::Create {
                id,
                parent,
                flags,
                shape: decode_shape(op, &mut f)?,
            }
        }
    })
}

fn decode_shape(op: u8, f: &mut Fields<'_>) -> Option<ShapeCommand> {
    let solid = op % 2 == 1;
    Some(match op {
        10 => ShapeCommand::Point {
            at: f.point()?,
            color: f.color()?,
        },
        20 => ShapeCommand::Line {
            color: f.color()?,
            from: f.point()?,
            to: f.point()?,
        },
        30 | 31 => ShapeCommand::Triangle {
            solid,
            color: f.color()?,
            points: [f.point()?, f.point()?, f.point()?],
        },
        32 | 33 => {
            let n = f.u16()?;
            let color = f.color()?;
            let triangles = (0..n)
                .map(|_| Some([f.point()?, f.point()?, f.point()?]))
                .collect::<Option<Vec<_>>>()?;
            ShapeCommand::TriangleList {
                solid,
                color,
                triangles,
            }
        }
        34..=37 => {
            let n = f.u16()?;
            let color = f.color()?;
            let points = f.points(usize::from(n) + 2)?;
            if op < 36 {
                ShapeCommand::TriangleFan {
                    solid,
                    color,
                    points,
                }
            } else {
                ShapeCommand::TriangleStrip {
                    solid,
                    color,
                    points,
                }
            }
        }
        40 | 41 | 50 | 51 => {
            let origin = f.point()?;
            let width = f.u16()?;
            let height = f.u16()?;
            let color = f.color()?;
            if op < 50 {
                ShapeCommand::Rect {
                    solid,
                    origin,
                    width,
                    height,
                    color,
                }
            } else {
                ShapeCommand::Ellipse {
                    solid,
                    origin,
                    width,
                    height,
                    color,
                }
            }
        }
        60 | 61 => ShapeCommand::Quad {
            solid,
            color: f.color()?,
            points: [f.point()?, f.point()?, f.point()?, f.point()?],
        },
        62 | 63 => {
            let n = f.u16()?;
            let color = f.color()?;
            let quads = (0..n)
                .map(|_| Some([f.point()?, f.point()?, f.point()?, f.point()?]))
                .collect::<Option<Vec<_>>>()?;
            ShapeCommand::QuadList {
                solid,
                color,
                quads,
            }
        }
        64 | 65 => {
            let n = f.u16()?;
            let color = f.color()?;
            ShapeCommand::QuadStrip {
                solid,
                color,
                points: f.points(2 + 2 * usize::from(n))?,
            }
        }
        80 => ShapeCommand::TileMap {
            columns: f.u16()?,
            rows: f.u16()?,
            bitmaps: f.u16()?,
            tile_width: f.u16()?,
            tile_height: f.u16()?,
            width: f.u16()?,
            height: f.u16()?,
        },
        81 => ShapeCommand::TileArray {
            columns: f.u16()?,
            rows: f.u16()?,
            bitmaps: f.u16()?,
            tile_width: f.u16()?,
            tile_height: f.u16()?,
        },
        90 => ShapeCommand::Terminal {
            origin: f.point()?,
            columns: f.u16()?,
            rows: f.u16()?,
            fg: f.color()?,
            bg: f.color()?,
        },
        100..=102 => {
            let width = f.u16()?;
            let height = f.u16()?;
            let mode = match op {
                100 => PixelMode::Solid,
                101 => PixelMode::Masked(f.color()?),
                _ => PixelMode::Transparent,
            };
            ShapeCommand::Bitmap {
                width,
                height,
                mode,
            }
        }
        120..=122 => {
            let source = f.id()?;
            let mode = match op {
                120 => PixelMode::Solid,
                121 => PixelMode::Masked(f.color()?),
                _ => PixelMode::Transparent,
            };
            ShapeCommand::BitmapReference { source, mode }
        }
        140 => ShapeCommand::Group {
            origin: f.point()?,
            width: f.u16()?,
            height: f.u16()?,
        },
        _ => return None,
    })
}

fn colors(f: &mut Fields<'_>, n: u16) -> Option<Vec<Color>> {
    (0..n).map(|_| f.color()).collect()
}

/// Where the pixels of a streaming command go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StreamTarget {
    Bitmap {
        id: PrimitiveId,
        at: Point,
    },
    Tile {
        id: PrimitiveId,
        tile: u16,
        at: Point,
    },
}

/// Decodes a streaming header, returning the target and the pixel count.
pub(crate) fn decode_stream(op: u8, buf: &[u8]) -> Option<(StreamTarget, u16)> {
    let mut f = Fields::at(buf, HEADER_LEN);
    let id = f.id()?;
    let target = match op {
        84 => {
            let tile = f.u16()?;
            StreamTarget::Tile {
                id,
                tile,
                at: f.point()?,
            }
        }
        111 => StreamTarget::Bitmap { id, at: f.point()? },
        _ => return None,
    };
    Some((target, f.u16()?))
}

/// Decodes a complete legacy system command.
pub(crate) fn decode_system(op: u8, buf: &[u8]) -> Option<SystemCommand> {
    let mut f = Fields::at(buf, HEADER_LEN);
    Some(match op {
        0x80 => SystemCommand::GeneralPoll { echo: f.u8()? },
        0x81 => SystemCommand::SetKeyboardLayout { layout: f.u8()? },
        0x82 => SystemCommand::QueryCursorPosition,
        0x86 => SystemCommand::QueryModeInfo,
        _ => return None,
    })
}
