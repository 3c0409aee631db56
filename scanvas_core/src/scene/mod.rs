// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive tree data model.
//!
//! A *primitive* is a node in the scene tree. Each primitive has:
//!
//! - An identity ([`PrimitiveId`]) chosen by the command stream. Creating a
//!   primitive under a live ID replaces it along with its subtree.
//! - Topology: parent, first/last child and sibling links forming an
//!   ordered tree hanging from the full-screen root.
//! - **Local properties** set by the caller: position relative to the
//!   parent, [`flags`](Scene::set_flags), [`color`](Scene::set_color),
//!   automatic [`motion`](Scene::set_motion) and the [`Shape`] with its
//!   pixel content.
//! - **Computed properties** produced by [`recompute`](Scene::recompute):
//!   absolute position, view rectangle, draw extent, `drawable`, the
//!   primitive's lines in the [`VerticalIndex`](crate::vertical::VerticalIndex)
//!   and its compiled [`PainterSet`](crate::painter::PainterSet).
//!
//! Primitives are stored in struct-of-arrays layout indexed by ID.
//!
//! # Dirty tracking
//!
//! Mutations mark the channels described in [`dirty`](crate::dirty) and
//! flush before returning, so callers always observe a consistent scene.

mod content;
mod error;
mod evaluate;
mod flags;
mod id;
mod shape;
mod store;
mod terminal;
mod tiles;
mod traverse;

pub use error::SceneError;
pub use evaluate::{RangeChange, SceneChanges};
pub use flags::PrimitiveFlags;
pub use id::{INVALID, PrimitiveId};
pub use shape::{BitmapSource, PrimitiveSpec, Shape};
pub use store::{Motion, Scene, SceneConfig};
pub use terminal::{CELL_SIZE, Terminal};
pub use tiles::{NO_TILE, TileSet};
pub use traverse::Children;
