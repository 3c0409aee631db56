// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command lengths.
//!
//! Every command starts with the three header bytes `[CATEGORY, sub, op]`.
//! Its total length follows from the opcode alone, or from the opcode and a
//! little-endian `u16` count stored at a fixed offset.

/// The byte that starts every command. Other bytes are terminal text.
pub const CATEGORY: u8 = 23;

/// Sub-protocol of the legacy system commands.
pub const SUB_SYSTEM: u8 = 0;

/// Sub-protocol of the primitive command set.
pub const SUB_PRIMITIVE: u8 = 30;

/// Bytes before the first field.
pub const HEADER_LEN: usize = 3;

/// How the length of a command is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandShape {
    /// Always this many bytes.
    Fixed(usize),
    /// `base + n * record` bytes, where `n` is the `u16` at `count_at`.
    /// Dispatched once complete.
    Variable {
        /// Length with no records.
        base: usize,
        /// Offset of the record count.
        count_at: usize,
        /// Bytes per record.
        record: usize,
    },
    /// A `header`-byte command followed by `n` one-byte pixels, where `n` is
    /// the `u16` at `count_at`. Each pixel is applied as it arrives.
    Streaming {
        /// Length of the header, count included.
        header: usize,
        /// Offset of the pixel count.
        count_at: usize,
    },
}

impl CommandShape {
    /// Offset just past the count field, if the shape has one.
    #[must_use]
    pub const fn count_end(self) -> Option<usize> {
        match self {
            Self::Fixed(_) => None,
            Self::Variable { count_at, .. } | Self::Streaming { count_at, .. } => {
                Some(count_at + 2)
            }
        }
    }

    /// Total length once the count is known. Streaming commands report
    /// their header length.
    #[must_use]
    pub const fn total_len(self, count: u16) -> usize {
        match self {
            Self::Fixed(len) => len,
            Self::Variable { base, record, .. } => base + count as usize * record,
            Self::Streaming { header, .. } => header,
        }
    }
}

/// Looks up the shape of a primitive command. `None` for reserved and
/// unassigned opcodes.
#[must_use]
pub const fn primitive_shape(op: u8) -> Option<CommandShape> {
    use CommandShape::{Fixed, Streaming, Variable};
    Some(match op {
        0 => Fixed(7),
        1 | 2 => Fixed(9),
        3 | 4 => Fixed(5),
        5 => Fixed(11),
        6 => Fixed(6),
        7 => Fixed(7),
        8 => Fixed(5),
        10 => Fixed(14),
        20 => Fixed(18),
        30 | 31 => Fixed(22),
        32 | 33 => Variable {
            base: 12,
            count_at: 9,
            record: 12,
        },
        34..=37 => Variable {
            base: 20,
            count_at: 9,
            record: 4,
        },
        40 | 41 | 50 | 51 => Fixed(18),
        60 | 61 => Fixed(26),
        62 | 63 => Variable {
            base: 12,
            count_at: 9,
            record: 16,
        },
        64 | 65 => Variable {
            base: 20,
            count_at: 9,
            record: 8,
        },
        80 => Fixed(23),
        81 => Fixed(19),
        82 => Fixed(11),
        83 => Fixed(12),
        84 => Streaming {
            header: 13,
            count_at: 11,
        },
        85 => Variable {
            base: 11,
            count_at: 9,
            record: 2,
        },
        86 => Fixed(9),
        90 => Fixed(19),
        91 => Fixed(5),
        92 => Fixed(14),
        93 => Fixed(9),
        100 | 102 => Fixed(13),
        101 => Fixed(14),
        110 => Fixed(10),
        111 => Streaming {
            header: 11,
            count_at: 9,
        },
        120 | 122 => Fixed(11),
        121 => Fixed(12),
        140 => Fixed(17),
        _ => return None,
    })
}

/// Looks up the length of a legacy system command. `None` for commands
/// that are not forwarded.
#[must_use]
pub const fn system_len(op: u8) -> Option<usize> {
    match op {
        0x80 | 0x81 => Some(4),
        0x82 | 0x86 => Some(3),
        _ => None,
    }
}
