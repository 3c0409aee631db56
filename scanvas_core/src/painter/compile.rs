// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painter compilation.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;

use super::routine::{self, PixelOp, RowPlan, RoutineContext, Run};
use super::{CompiledPainter, PaintContent, PaintJob, PainterSet, ScrollMode};
use crate::bitmap::{PixelMode, TRANSPARENT};
use crate::color::{BlendTable, Color, OPACITY_MASK, Pixel, RGB_MASK};

/// Compiles the painter set for one primitive.
#[must_use]
pub fn compile_set(job: &PaintJob<'_>) -> PainterSet {
    let color = match job.content {
        PaintContent::Fill(color) | PaintContent::Spans { color, .. } => color,
        PaintContent::Image { .. } => Color::BLACK,
    };
    let ctx = RoutineContext {
        pixel: color.to_pixel(job.sync_bits),
        word: color.replicated_word(job.sync_bits).to_ne_bytes(),
        table: Rc::new(BlendTable::new(color, job.sync_bits)),
        sync_bits: job.sync_bits,
    };

    let mut phases: [Option<CompiledPainter>; 4] = [None, None, None, None];
    match job.scroll {
        ScrollMode::Fine => {
            for (phase, slot) in (0_u8..).zip(phases.iter_mut()) {
                *slot = Some(compile_phase(job, phase, &ctx));
            }
        }
        ScrollMode::Stationary | ScrollMode::Coarse => {
            let phase = job.origin.x.rem_euclid(4);
            if let (Ok(i), Ok(p)) = (usize::try_from(phase), u8::try_from(phase)) {
                phases[i] = Some(compile_phase(job, p, &ctx));
            }
        }
    }

    PainterSet {
        phases,
        size: job.size,
        unclipped: job.is_unclipped(),
        scroll: job.scroll,
    }
}

fn compile_phase(job: &PaintJob<'_>, phase: u8, ctx: &RoutineContext) -> CompiledPainter {
    let window = job.window;
    let mut known: BTreeMap<RowPlan, u16> = BTreeMap::new();
    let mut distinct: Vec<RowPlan> = Vec::new();
    let mut table = Vec::with_capacity(usize::try_from(window.height()).unwrap_or(0));

    for row in window.y0..window.y1 {
        let slot = row_plan(job, row, i32::from(phase)).map(|plan| {
            if let Some(&i) = known.get(&plan) {
                i
            } else {
                let i = u16::try_from(distinct.len()).unwrap_or(u16::MAX);
                known.insert(plan.clone(), i);
                distinct.push(plan);
                i
            }
        });
        table.push(slot);
    }

    CompiledPainter {
        phase,
        first_row: window.y0,
        table,
        routines: distinct
            .into_iter()
            .map(|plan| routine::build(plan, ctx))
            .collect(),
    }
}

/// Describes what row `row` writes, with x relative to the phase base.
fn row_plan(job: &PaintJob<'_>, row: i32, phase: i32) -> Option<RowPlan> {
    let (wx0, wx1) = (job.window.x0, job.window.x1);
    match job.content {
        PaintContent::Fill(color) => color_plan(
            color,
            Vec::from([Run {
                x: wx0 + phase,
                len: wx1 - wx0,
            }]),
        ),
        PaintContent::Spans { detail, color } => {
            let runs = detail
                .row(row)
                .iter()
                .filter_map(|s| s.clip(wx0, wx1))
                .map(|s| Run {
                    x: s.x + phase,
                    len: s.width,
                })
                .collect();
            color_plan(color, runs)
        }
        PaintContent::Image { bitmap, mode } => {
            let pixels = bitmap.row(row)?;
            let x0 = usize::try_from(wx0.max(0)).ok()?;
            let x1 = usize::try_from(wx1).ok()?.min(pixels.len());
            if x1 <= x0 {
                return None;
            }
            image_plan(&pixels[x0..x1], wx0.max(0) + phase, mode, job.sync_bits)
        }
    }
}

fn color_plan(color: Color, runs: Vec<Run>) -> Option<RowPlan> {
    if runs.iter().all(|r| r.len <= 0) {
        return None;
    }
    Some(if color.opacity().is_opaque() {
        RowPlan::Fill(runs)
    } else {
        RowPlan::Blend(runs)
    })
}

/// Plans one image row whose first visible pixel lands at `x`.
fn image_plan(pixels: &[u8], x: i32, mode: PixelMode, sync_bits: u8) -> Option<RowPlan> {
    let out = |b: u8| -> Pixel { (b & RGB_MASK) | (sync_bits & OPACITY_MASK) };
    match mode {
        PixelMode::Solid => Some(RowPlan::Copy(Vec::from([(
            x,
            pixels.iter().map(|&b| out(b)).collect(),
        )]))),
        PixelMode::Masked(mask) => {
            let runs = opaque_runs(pixels, x, |b| b != mask.0, out);
            (!runs.is_empty()).then_some(RowPlan::Copy(runs))
        }
        PixelMode::Transparent => {
            let mut ops = Vec::new();
            let mut run: Option<(i32, Vec<Pixel>)> = None;
            for (px_x, &b) in (x..).zip(pixels) {
                let color = Color(b);
                if b != TRANSPARENT && color.opacity().is_opaque() {
                    run.get_or_insert_with(|| (px_x, Vec::new())).1.push(out(b));
                    continue;
                }
                if let Some((rx, bytes)) = run.take() {
                    ops.push(PixelOp::Copy { x: rx, bytes });
                }
                if b != TRANSPARENT {
                    ops.push(PixelOp::Blend {
                        x: px_x,
                        rgb: color.rgb(),
                        opacity: color.opacity(),
                    });
                }
            }
            if let Some((rx, bytes)) = run {
                ops.push(PixelOp::Copy { x: rx, bytes });
            }
            (!ops.is_empty()).then_some(RowPlan::Mixed(ops))
        }
    }
}

/// Maximal runs of pixels accepted by `keep`, converted with `out`.
fn opaque_runs(
    pixels: &[u8],
    x: i32,
    keep: impl Fn(u8) -> bool,
    out: impl Fn(u8) -> Pixel,
) -> Vec<(i32, Vec<Pixel>)> {
    let mut runs = Vec::new();
    let mut current: Option<(i32, Vec<Pixel>)> = None;
    for (px_x, &b) in (x..).zip(pixels) {
        if keep(b) {
            current.get_or_insert_with(|| (px_x, Vec::new())).1.push(out(b));
        } else if let Some(run) = current.take() {
            runs.push(run);
        }
    }
    runs.extend(current);
    runs
}
