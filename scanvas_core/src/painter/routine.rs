// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row plans and the closures they compile into.
//!
//! A [`RowPlan`] is the plain-data description of what one painter row
//! writes, with x positions relative to the painter's 4-aligned base. Equal
//! plans share one routine.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::ops::Range;

use crate::color::{BlendTable, Opacity, Pixel, blend};

/// A compiled row writer: `(line_buffer, base_x)`.
pub(crate) type Routine = Box<dyn Fn(&mut [Pixel], i32)>;

/// A horizontal run relative to the painter base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Run {
    pub(crate) x: i32,
    pub(crate) len: i32,
}

/// One step of a per-pixel image row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum PixelOp {
    /// Overwrite with the given bytes.
    Copy { x: i32, bytes: Vec<Pixel> },
    /// Blend six color bits at an opacity.
    Blend { x: i32, rgb: u8, opacity: Opacity },
}

/// What a row writes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum RowPlan {
    /// Opaque solid color.
    Fill(Vec<Run>),
    /// Translucent solid color through the painter's blend table.
    Blend(Vec<Run>),
    /// Literal bytes (solid and masked images).
    Copy(Vec<(i32, Vec<Pixel>)>),
    /// Copies and per-pixel blends (transparent images).
    Mixed(Vec<PixelOp>),
}

/// State shared by every routine of one painter.
pub(crate) struct RoutineContext {
    pub(crate) pixel: Pixel,
    pub(crate) word: [u8; 4],
    pub(crate) table: Rc<BlendTable>,
    pub(crate) sync_bits: u8,
}

/// Precomputed split of a fill run into a byte lead and whole words.
#[derive(Clone, Copy, Debug)]
struct FillRun {
    x: i32,
    len: i32,
    lead: usize,
}

impl FillRun {
    fn new(run: Run) -> Self {
        // The base is 4-aligned, so alignment depends only on the offset.
        let lead = usize::try_from((4 - run.x.rem_euclid(4)) % 4)
            .unwrap_or(0)
            .min(usize::try_from(run.len).unwrap_or(0));
        Self {
            x: run.x,
            len: run.len,
            lead,
        }
    }
}

/// Turns a plan into a callable routine.
pub(crate) fn build(plan: RowPlan, ctx: &RoutineContext) -> Routine {
    match plan {
        RowPlan::Fill(runs) => {
            let runs: Vec<FillRun> = runs.into_iter().map(FillRun::new).collect();
            let (pixel, word) = (ctx.pixel, ctx.word);
            Box::new(move |buf, base| {
                for run in &runs {
                    fill_run(buf, base + run.x, run, pixel, word);
                }
            })
        }
        RowPlan::Blend(runs) => {
            let table = Rc::clone(&ctx.table);
            Box::new(move |buf, base| {
                for run in &runs {
                    if let Some(range) = guard(buf.len(), base + run.x, run.len) {
                        for px in &mut buf[range] {
                            *px = table.apply(*px);
                        }
                    }
                }
            })
        }
        RowPlan::Copy(runs) => Box::new(move |buf, base| {
            for (x, bytes) in &runs {
                copy_run(buf, base + x, bytes);
            }
        }),
        RowPlan::Mixed(ops) => {
            let sync_bits = ctx.sync_bits;
            Box::new(move |buf, base| {
                for op in &ops {
                    match op {
                        PixelOp::Copy { x, bytes } => copy_run(buf, base + x, bytes),
                        PixelOp::Blend { x, rgb, opacity } => {
                            if let Some(range) = guard(buf.len(), base + x, 1) {
                                let px = &mut buf[range.start];
                                *px = blend(*rgb, *px, *opacity, sync_bits);
                            }
                        }
                    }
                }
            })
        }
    }
}

/// The part of `[start, start + len)` inside a buffer of `buf_len` bytes.
fn guard(buf_len: usize, start: i32, len: i32) -> Option<Range<usize>> {
    let end = start.checked_add(len)?;
    let s = usize::try_from(start.max(0)).ok()?;
    let e = usize::try_from(end.max(0)).ok()?.min(buf_len);
    (e > s).then_some(s..e)
}

fn fill_run(buf: &mut [Pixel], start: i32, run: &FillRun, pixel: Pixel, word: [u8; 4]) {
    let Some(range) = guard(buf.len(), start, run.len) else {
        return;
    };
    let whole = usize::try_from(run.len).is_ok_and(|len| len == range.len());
    let dst = &mut buf[range];
    if whole {
        let (lead, rest) = dst.split_at_mut(run.lead);
        lead.fill(pixel);
        let mut words = rest.chunks_exact_mut(4);
        for w in &mut words {
            w.copy_from_slice(&word);
        }
        words.into_remainder().fill(pixel);
    } else {
        dst.fill(pixel);
    }
}

fn copy_run(buf: &mut [Pixel], start: i32, bytes: &[Pixel]) {
    let Ok(len) = i32::try_from(bytes.len()) else {
        return;
    };
    let Some(range) = guard(buf.len(), start, len) else {
        return;
    };
    // Bytes left of the buffer are skipped.
    let skip = usize::try_from(start.min(0).unsigned_abs()).unwrap_or(0);
    let n = range.len();
    buf[range].copy_from_slice(&bytes[skip..skip + n]);
}
