// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command encoding for hosts and tests.

use alloc::vec::Vec;

use scanvas_core::bitmap::PixelMode;

use crate::command::{Command, ShapeCommand, SystemCommand};
use crate::table::{CATEGORY, SUB_PRIMITIVE, SUB_SYSTEM};
use crate::wire::Writer;

impl Command {
    /// Appends the wire bytes of this command to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut w = Writer::new(out);
        w.u8(CATEGORY).u8(SUB_PRIMITIVE).u8(self.opcode());
        match self {
            Self::SetFlags { id, flags } => {
                w.id(*id).flags(*flags);
            }
            Self::MoveAbsolute { id, to } => {
                w.id(*id).point(*to);
            }
            Self::MoveRelative { id, dx, dy } => {
                w.id(*id).i16(*dx).i16(*dy);
            }
            Self::Delete { id }
            | Self::RegeneratePainters { id }
            | Self::Detach { id }
            | Self::SelectTerminal { id } => {
                w.id(*id);
            }
            Self::SetMotion { id, dx, dy, count } => {
                w.id(*id).i16(*dx).i16(*dy).u16(*count);
            }
            Self::SetColor { id, color } => {
                w.id(*id).color(*color);
            }
            Self::Attach { id, parent } => {
                w.id(*id).id(*parent);
            }
            Self::Create {
                id,
                parent,
                flags,
                shape,
            } => {
                w.id(*id).id(*parent).flags(*flags);
                encode_shape(&mut w, shape);
            }
            Self::SetTile {
                id,
                column,
                row,
                tile,
            } => {
                w.id(*id).u16(*column).u16(*row).u16(*tile);
            }
            Self::SetTilePixel {
                id,
                tile,
                at,
                color,
            } => {
                w.id(*id).u16(*tile).point(*at).color(*color);
            }
            Self::SetTilePixels {
                id,
                tile,
                at,
                colors,
            } => {
                w.id(*id).u16(*tile).point(*at).count(colors.len());
                for &c in colors.iter().take(usize::from(u16::MAX)) {
                    w.color(c);
                }
            }
            Self::SetTileRow {
                id,
                column,
                row,
                tiles,
            } => {
                w.id(*id).u16(*column).u16(*row).count(tiles.len());
                for &t in tiles.iter().take(usize::from(u16::MAX)) {
                    w.u16(t);
                }
            }
            Self::SetTileOffset { id, offset } => {
                w.id(*id).point(*offset);
            }
            Self::DefineGlyph { id, code, rows } => {
                w.id(*id).u8(*code).bytes(rows);
            }
            Self::SetTerminalCursor { id, column, row } => {
                w.id(*id).u16(*column).u16(*row);
            }
            Self::SetBitmapPixel { id, at, color } => {
                w.id(*id).point(*at).color(*color);
            }
            Self::SetBitmapPixels { id, at, colors } => {
                w.id(*id).point(*at).count(colors.len());
                for &c in colors.iter().take(usize::from(u16::MAX)) {
                    w.color(c);
                }
            }
        }
    }

    /// The wire bytes of this command.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

fn encode_shape(w: &mut Writer<'_>, shape: &ShapeCommand) {
    match shape {
        ShapeCommand::Point { at, color } => {
            w.point(*at).color(*color);
        }
        ShapeCommand::Line { color, from, to } => {
            w.color(*color).point(*from).point(*to);
        }
        ShapeCommand::Triangle { color, points, .. } => {
            w.color(*color).points(points);
        }
        ShapeCommand::TriangleList {
            color, triangles, ..
        } => {
            let triangles = &triangles[..triangles.len().min(usize::from(u16::MAX))];
            w.count(triangles.len()).color(*color);
            for t in triangles {
                w.points(t);
            }
        }
        ShapeCommand::TriangleFan { color, points, .. }
        | ShapeCommand::TriangleStrip { color, points, .. } => {
            let points = &points[..points.len().min(usize::from(u16::MAX) + 2)];
            w.count(points.len().saturating_sub(2))
                .color(*color)
                .points(points);
        }
        ShapeCommand::Rect {
            origin,
            width,
            height,
            color,
            ..
        }
        | ShapeCommand::Ellipse {
            origin,
            width,
            height,
            color,
            ..
        } => {
            w.point(*origin).u16(*width).u16(*height).color(*color);
        }
        ShapeCommand::Quad { color, points, .. } => {
            w.color(*color).points(points);
        }
        ShapeCommand::QuadList { color, quads, .. } => {
            let quads = &quads[..quads.len().min(usize::from(u16::MAX))];
            w.count(quads.len()).color(*color);
            for q in quads {
                w.points(q);
            }
        }
        ShapeCommand::QuadStrip { color, points, .. } => {
            let quads = points.len().saturating_sub(2) / 2;
            let quads = quads.min(usize::from(u16::MAX));
            w.count(quads)
                .color(*color)
                .points(&points[..(2 + 2 * quads).min(points.len())]);
        }
        ShapeCommand::TileMap {
            columns,
            rows,
            bitmaps,
            tile_width,
            tile_height,
            width,
            height,
        } => {
            w.u16(*columns)
                .u16(*rows)
                .u16(*bitmaps)
                .u16(*tile_width)
                .u16(*tile_height)
                .u16(*width)
                .u16(*height);
        }
        ShapeCommand::TileArray {
            columns,
            rows,
            bitmaps,
            tile_width,
            tile_height,
        } => {
            w.u16(*columns)
                .u16(*rows)
                .u16(*bitmaps)
                .u16(*tile_width)
                .u16(*tile_height);
        }
        ShapeCommand::Terminal {
            origin,
            columns,
            rows,
            fg,
            bg,
        } => {
            w.point(*origin)
                .u16(*columns)
                .u16(*rows)
                .color(*fg)
                .color(*bg);
        }
        ShapeCommand::Bitmap {
            width,
            height,
            mode,
        } => {
            w.u16(*width).u16(*height);
            if let PixelMode::Masked(mask) = mode {
                w.color(*mask);
            }
        }
        ShapeCommand::BitmapReference { source, mode } => {
            w.id(*source);
            if let PixelMode::Masked(mask) = mode {
                w.color(*mask);
            }
        }
        ShapeCommand::Group {
            origin,
            width,
            height,
        } => {
            w.point(*origin).u16(*width).u16(*height);
        }
    }
}

impl SystemCommand {
    /// The wire bytes of this command.
    #[must_use]
    pub fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut w = Writer::new(&mut out);
        w.u8(CATEGORY).u8(SUB_SYSTEM).u8(self.opcode());
        match self {
            Self::GeneralPoll { echo: b } | Self::SetKeyboardLayout { layout: b } => {
                w.u8(b);
            }
            Self::QueryCursorPosition | Self::QueryModeInfo => {}
        }
        out
    }
}
