// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive identity.

use core::fmt;

/// Sentinel value indicating "no primitive" in link fields.
pub const INVALID: u32 = u32::MAX;

/// A primitive's wire identity and slot in the [`Scene`](super::Scene).
///
/// IDs are chosen by the command stream, not allocated by the scene:
/// creating a primitive under an ID that is already live replaces it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveId(pub u16);

impl PrimitiveId {
    /// The full-screen root every tree hangs from.
    pub const ROOT: Self = Self(0);

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Whether this is the root.
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn from_index(idx: u32) -> Self {
        debug_assert!(idx <= u16::MAX as u32, "slot index exceeds the ID space");
        #[expect(
            clippy::cast_possible_truncation,
            reason = "slots are bounded by the u16 ID space"
        )]
        let id = idx as u16;
        Self(id)
    }
}

impl fmt::Debug for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveId({})", self.0)
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
