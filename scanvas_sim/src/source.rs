// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated command link.

use std::collections::VecDeque;

use scanvas_core::backend::ByteSource;
use scanvas_protocol::{Command, SystemCommand};

use crate::hardware::SimClock;

/// A queue of command bytes, optionally charging clock ticks per byte read.
#[derive(Debug, Default)]
pub struct ByteQueue {
    bytes: VecDeque<u8>,
    clock: Option<(SimClock, u64)>,
    read: u64,
}

impl ByteQueue {
    /// A queue whose reads take no time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue where each successful read advances `clock` by
    /// `ticks_per_byte`.
    #[must_use]
    pub fn timed(clock: SimClock, ticks_per_byte: u64) -> Self {
        Self {
            clock: Some((clock, ticks_per_byte)),
            ..Self::default()
        }
    }

    /// Queues raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes);
    }

    /// Queues an encoded command.
    pub fn push(&mut self, command: &Command) {
        self.push_bytes(&command.to_bytes());
    }

    /// Queues an encoded system command.
    pub fn push_system(&mut self, command: SystemCommand) {
        self.push_bytes(&command.to_bytes());
    }

    /// Bytes waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes read so far.
    #[must_use]
    pub fn total_read(&self) -> u64 {
        self.read
    }
}

impl ByteSource for ByteQueue {
    fn read(&mut self) -> Option<u8> {
        let byte = self.bytes.pop_front()?;
        if let Some((clock, ticks)) = &self.clock {
            clock.advance(*ticks);
        }
        self.read += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_order_and_charges_time() {
        let clock = SimClock::new();
        let mut q = ByteQueue::timed(clock.clone(), 3);
        q.push_bytes(b"ab");
        q.push_system(SystemCommand::QueryModeInfo);
        assert_eq!(q.len(), 5);
        assert_eq!(q.read(), Some(b'a'));
        assert_eq!(q.read(), Some(b'b'));
        assert_eq!(q.read(), Some(23));
        assert_eq!(clock.now(), 9);
        q.read();
        q.read();
        assert_eq!(q.read(), None);
        assert_eq!(clock.now(), 15, "empty reads are free");
        assert_eq!(q.total_read(), 5);
        assert!(q.is_empty());
    }
}
