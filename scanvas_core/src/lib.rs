// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph, scan-line index and compositor loop for scan-line video.
//!
//! `scanvas_core` keeps a tree of drawable primitives, reduces their
//! geometry to per-line pixel work and paints that work into a hardware
//! line ring just ahead of the scan-out cursor. It is `no_std` compatible
//! (with `alloc`) and uses array-based struct-of-arrays storage indexed by
//! primitive ID.
//!
//! # Architecture
//!
//! ```text
//!   ByteSource ──► CommandSink::feed() ──► Scene mutation
//!                                              │
//!                                              ▼
//!                  Scene::recompute() ──► VerticalIndex + PainterSets
//!                                              │
//!                 ┌────────────────────────────┘
//!                 ▼
//!   Compositor::run_frame() ──► Scene::paint_line() ──► ScanoutHardware
//! ```
//!
//! **[`scene`]**: Struct-of-arrays primitive tree. Positions, flags, colors
//! and shapes are set by the caller; absolute geometry, clipping and
//! `drawable` are computed by the flush that ends every mutation.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//! GEOMETRY propagates to descendants; APPEARANCE and TOPOLOGY are local.
//!
//! **[`vertical`]**: Per-line lists of drawable primitives in paint order,
//! updated with the difference between old and new line ranges.
//!
//! **[`decompose`]**: Reduction of lines, triangles, quads, rectangles and
//! ellipses to per-row pixel sections.
//!
//! **[`painter`]**: Compilation of a primitive into per-row routines, with
//! up to four horizontal alignment phases for smooth scrolling.
//!
//! **[`compositor`]**: The scan-synchronized frame loop and its adaptive
//! command budget.
//!
//! **[`backend`]**: Traits that hardware and protocol crates implement.
//!
//! **[`color`]**, **[`bitmap`]**, **[`geometry`]**, **[`display`]**: Pixel
//! formats, pixel grids, integer geometry and video modes.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-primitive
//!   index and painter events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod bitmap;
pub mod color;
pub mod compositor;
pub mod decompose;
pub mod dirty;
pub mod display;
pub mod geometry;
pub mod painter;
pub mod scene;
pub mod trace;
pub mod vertical;
