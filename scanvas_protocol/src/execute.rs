// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running decoded commands against a scene.

use scanvas_core::geometry::PixelRect;
use scanvas_core::scene::{PrimitiveSpec, Scene, SceneError};

use crate::command::{Command, ShapeCommand};

impl Command {
    /// Runs the command as one scene operation.
    ///
    /// Pixel lists run as one stream and flush once at the end.
    ///
    /// # Errors
    ///
    /// Whatever the scene operation refuses with; the scene is unchanged
    /// except for pixels a list wrote before the failing one.
    pub fn apply(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match self {
            Self::SetFlags { id, flags } => scene.set_flags(*id, *flags),
            Self::MoveAbsolute { id, to } => scene.move_absolute(*id, to.x, to.y),
            Self::MoveRelative { id, dx, dy } => scene.move_relative(*id, *dx, *dy),
            Self::Delete { id } => scene.delete(*id),
            Self::RegeneratePainters { id } => scene.regenerate_painters(*id),
            Self::SetMotion { id, dx, dy, count } => scene.set_motion(*id, *dx, *dy, *count),
            Self::SetColor { id, color } => scene.set_color(*id, *color),
            Self::Attach { id, parent } => scene.attach(*id, *parent),
            Self::Detach { id } => scene.detach(*id),
            Self::Create {
                id,
                parent,
                flags,
                shape,
            } => scene.create(*id, *parent, *flags, shape.spec()).map(|_| ()),
            Self::SetTile {
                id,
                column,
                row,
                tile,
            } => scene.set_tile(*id, *column, *row, *tile),
            Self::SetTilePixel {
                id,
                tile,
                at,
                color,
            } => scene.set_tile_pixel(*id, *tile, at.x, at.y, *color),
            Self::SetTilePixels {
                id,
                tile,
                at,
                colors,
            } => {
                let result = colors
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, &c)| scene.write_tile_run(*id, *tile, at.x, at.y, i, c));
                scene.finish_stream();
                result
            }
            Self::SetTileRow {
                id,
                column,
                row,
                tiles,
            } => scene.set_tile_row(*id, *column, *row, tiles),
            Self::SetTileOffset { id, offset } => scene.set_tile_offset(*id, offset.x, offset.y),
            Self::SelectTerminal { id } => scene.select_terminal(*id),
            Self::DefineGlyph { id, code, rows } => scene.define_glyph(*id, *code, *rows),
            Self::SetTerminalCursor { id, column, row } => {
                scene.set_terminal_cursor(*id, *column, *row)
            }
            Self::SetBitmapPixel { id, at, color } => {
                scene.set_bitmap_pixel(*id, at.x, at.y, *color)
            }
            Self::SetBitmapPixels { id, at, colors } => {
                let result = colors
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, &c)| scene.write_bitmap_run(*id, at.x, at.y, i, c));
                scene.finish_stream();
                result
            }
        }
    }
}

impl ShapeCommand {
    /// The creation description this command asks for.
    #[must_use]
    pub fn spec(&self) -> PrimitiveSpec {
        match self {
            Self::Point { at, color } => PrimitiveSpec::point(*at, *color),
            Self::Line { color, from, to } => PrimitiveSpec::line(*from, *to, *color),
            Self::Triangle {
                solid,
                color,
                points,
            } => PrimitiveSpec::triangle(*points, *solid, *color),
            Self::TriangleList {
                solid,
                color,
                triangles,
            } => PrimitiveSpec::triangle_list(triangles, *solid, *color),
            Self::TriangleFan {
                solid,
                color,
                points,
            } => PrimitiveSpec::triangle_fan(points, *solid, *color),
            Self::TriangleStrip {
                solid,
                color,
                points,
            } => PrimitiveSpec::triangle_strip(points, *solid, *color),
            Self::Rect {
                solid,
                origin,
                width,
                height,
                color,
            } => PrimitiveSpec::rect(
                *origin,
                i32::from(*width),
                i32::from(*height),
                *solid,
                *color,
            ),
            Self::Ellipse {
                solid,
                origin,
                width,
                height,
                color,
            } => PrimitiveSpec::ellipse(
                *origin,
                i32::from(*width),
                i32::from(*height),
                *solid,
                *color,
            ),
            Self::Quad {
                solid,
                color,
                points,
            } => PrimitiveSpec::quad(*points, *solid, *color),
            Self::QuadList {
                solid,
                color,
                quads,
            } => PrimitiveSpec::quad_list(quads, *solid, *color),
            Self::QuadStrip {
                solid,
                color,
                points,
            } => PrimitiveSpec::quad_strip(points, *solid, *color),
            Self::TileMap {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
                width,
                height,
            } => PrimitiveSpec::tile_map(
                *columns,
                *rows,
                *bitmaps,
                *tile_width,
                *tile_height,
                *width,
                *height,
            ),
            Self::TileArray {
                columns,
                rows,
                bitmaps,
                tile_width,
                tile_height,
            } => PrimitiveSpec::tile_array(*columns, *rows, *bitmaps, *tile_width, *tile_height),
            Self::Terminal {
                origin,
                columns,
                rows,
                fg,
                bg,
            } => PrimitiveSpec::terminal(*origin, *columns, *rows, *fg, *bg),
            Self::Bitmap {
                width,
                height,
                mode,
            } => PrimitiveSpec::bitmap(*width, *height, *mode),
            Self::BitmapReference { source, mode } => {
                PrimitiveSpec::bitmap_reference(*source, *mode)
            }
            Self::Group {
                origin,
                width,
                height,
            } => PrimitiveSpec::group(PixelRect::from_origin_size(
                *origin,
                i32::from(*width),
                i32::from(*height),
            )),
        }
    }
}
