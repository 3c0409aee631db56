// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Scene mutations mark channels in an [`understory_dirty`] tracker and every
//! mutation ends with a flush that drains them.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`GEOMETRY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges
//!   from child to parent. Marking a primitive marks its whole subtree, since
//!   absolute position, view rectangle and `drawable` are inherited.
//!   Flag changes are routed through [`GEOMETRY`] because clipping, paint
//!   permission and scroll phases all feed the same recomputation.
//!
//! - **Local-only**: [`APPEARANCE`] covers color and pixel content. Only the
//!   marked primitive has its painters rebuilt.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on create, attach, detach and
//!   delete. It is drained for the change report and does not propagate.
//!
//! # Consumption
//!
//! [`Scene::recompute`](crate::scene::Scene::recompute) drains all channels
//! and records the outcome in
//! [`SceneChanges`](crate::scene::SceneChanges).

use understory_dirty::Channel;

/// Position, size, clipping or flags changed; descendants recompute too.
pub const GEOMETRY: Channel = Channel::new(0);

/// Color or pixel content changed; painters must be rebuilt.
pub const APPEARANCE: Channel = Channel::new(1);

/// Tree shape changed.
pub const TOPOLOGY: Channel = Channel::new(2);
