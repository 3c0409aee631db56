// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene operation errors.

use core::fmt;

use super::id::PrimitiveId;

/// Why a scene operation was refused.
///
/// A refused operation leaves the scene exactly as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneError {
    /// The ID is the root, lies outside the ID space, or would create a cycle.
    InvalidId(u16),
    /// The named parent is not live.
    UnknownParent(PrimitiveId),
    /// The target primitive (or a referenced source) is not live.
    UnknownTarget(PrimitiveId),
    /// The live-primitive capacity is exhausted.
    TableFull,
    /// The primitive's shape does not support the operation.
    WrongKind(PrimitiveId),
    /// A coordinate, index or size lies outside the primitive's content.
    OutOfBounds(PrimitiveId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "primitive ID {id} is not usable here"),
            Self::UnknownParent(id) => write!(f, "parent {id} is not live"),
            Self::UnknownTarget(id) => write!(f, "primitive {id} is not live"),
            Self::TableFull => f.write_str("primitive table is full"),
            Self::WrongKind(id) => write!(f, "primitive {id} does not support this operation"),
            Self::OutOfBounds(id) => write!(f, "coordinates out of bounds for primitive {id}"),
        }
    }
}

impl core::error::Error for SceneError {}
