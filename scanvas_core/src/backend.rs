// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for hardware integrations.
//!
//! Scanvas splits the hardware-specific work away from the compositor.
//! A board integration provides the following pieces:
//!
//! - **Scan-out**: Implements [`ScanoutHardware`]: a ring of line buffers
//!   that a DMA-driven timing generator reads one per scan line, and a
//!   counter reporting which line is being read right now. Setting up the
//!   timing generator and its descriptors is outside this crate.
//!
//! - **Byte input**: Implements [`ByteSource`] over whatever carries the
//!   command stream (UART, USB, a test buffer).
//!
//! - **Command interpretation**: A [`CommandSink`] turns bytes into scene
//!   operations. The wire protocol lives in its own crate; the compositor
//!   only needs to know whether a command is half-received.
//!
//! # Crate boundaries
//!
//! `scanvas_core` owns the scene, the painters, the compositor loop and this
//! contract module. Protocol and hardware crates depend on `scanvas_core`
//! and plug into [`Compositor::run_frame`](crate::compositor::Compositor::run_frame).

use core::fmt;

use crate::color::Pixel;
use crate::scene::{Scene, SceneError};

/// The scan-out side of the display hardware.
///
/// The timing generator reads line `L` from slot `L % slot_count()`. The
/// compositor must finish writing a line before [`current_line`] reaches it.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// loop {
///     let cursor = hw.current_line();
///     if next < active && cursor < next && next < cursor + slots {
///         let buf = hw.line_buffer(next % slots);
///         scene.paint_line(next, buf);
///         next += 1;
///     } else {
///         // Ring full: spend the idle time on the command stream.
///     }
/// }
/// ```
///
/// [`current_line`]: Self::current_line
pub trait ScanoutHardware {
    /// The line being scanned, in `0..total_lines`. Values at or past the
    /// active height are in vertical blanking.
    fn current_line(&mut self) -> u16;

    /// Number of line buffers in the ring.
    fn slot_count(&self) -> u16;

    /// The writable buffer of one slot, one byte per pixel.
    fn line_buffer(&mut self, slot: u16) -> &mut [Pixel];
}

/// A non-blocking source of command bytes.
pub trait ByteSource {
    /// Returns the next byte if one is waiting.
    fn read(&mut self) -> Option<u8>;
}

/// Which command a dispatched byte completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// A legacy system command.
    System(u8),
    /// A primitive command.
    Primitive(u8),
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System(op) => write!(f, "sys:{op:#04x}"),
            Self::Primitive(op) => write!(f, "op:{op}"),
        }
    }
}

/// What feeding one byte did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The byte was buffered; the command is not complete yet.
    Pending,
    /// The byte completed a command and it ran.
    Dispatched(Opcode),
    /// The byte completed a command that is not recognized; it was dropped.
    Discarded,
    /// The byte completed a command that the scene refused.
    Rejected(Opcode, SceneError),
    /// The byte was terminal text. Carries whether the terminal changed.
    Text(bool),
}

/// Interprets a byte stream as scene operations.
pub trait CommandSink {
    /// Feeds one byte, running a command when it completes one.
    fn feed(&mut self, scene: &mut Scene, byte: u8) -> FeedOutcome;

    /// Whether no command is partially received.
    fn is_idle(&self) -> bool;
}
