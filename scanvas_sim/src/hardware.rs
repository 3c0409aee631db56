// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scan-out.

use std::cell::Cell;
use std::rc::Rc;

use scanvas_core::backend::ScanoutHardware;
use scanvas_core::color::Pixel;
use scanvas_core::display::DisplayConfig;

/// Deterministic tick clock shared by the simulated devices.
///
/// Every hardware access advances it by a fixed cost, so a run depends only
/// on the sequence of calls.
#[derive(Clone, Debug, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    /// A clock at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    /// Moves the clock forward.
    pub fn advance(&self, ticks: u64) {
        self.0.set(self.0.get().saturating_add(ticks));
    }
}

/// Tick costs of the simulated hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimTiming {
    /// Ticks the beam spends on one line.
    pub ticks_per_line: u64,
    /// Cost of reading the line counter.
    pub poll_ticks: u64,
    /// Cost of painting one line.
    pub paint_ticks: u64,
}

impl SimTiming {
    /// Painting is cheap next to scanning a line.
    #[must_use]
    pub const fn relaxed() -> Self {
        Self {
            ticks_per_line: 8,
            poll_ticks: 1,
            paint_ticks: 2,
        }
    }

    /// Painting a line takes longer than scanning it.
    #[must_use]
    pub const fn overloaded() -> Self {
        Self {
            ticks_per_line: 8,
            poll_ticks: 1,
            paint_ticks: 12,
        }
    }
}

impl Default for SimTiming {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// A line ring read by a simulated beam.
///
/// The beam reads line `L` from slot `L % slots` at the moment it reaches
/// the line; the result is kept in [`frame`](Self::frame), so a test sees
/// exactly what a monitor would have shown. Writes to the slot being read
/// are counted in [`torn_writes`](Self::torn_writes).
#[derive(Debug)]
pub struct SimScanout {
    display: DisplayConfig,
    timing: SimTiming,
    clock: SimClock,
    ring: Vec<Vec<Pixel>>,
    scanned: u64,
    frame: Vec<Vec<Pixel>>,
    frames_scanned: u64,
    torn_writes: u64,
    stall: u64,
}

impl SimScanout {
    /// Creates a ring of `slots` line buffers with the beam at the top of
    /// vertical blanking.
    #[must_use]
    pub fn new(display: DisplayConfig, slots: u16, timing: SimTiming) -> Self {
        let width = usize::from(display.width);
        let clock = SimClock::new();
        let ticks_per_line = timing.ticks_per_line.max(1);
        clock.advance(u64::from(display.active_lines) * ticks_per_line);
        Self {
            display,
            timing: SimTiming {
                ticks_per_line,
                ..timing
            },
            clock,
            ring: vec![vec![0; width]; usize::from(slots.max(1))],
            scanned: u64::from(display.active_lines),
            frame: vec![vec![0; width]; usize::from(display.active_lines)],
            frames_scanned: 0,
            torn_writes: 0,
            stall: 0,
        }
    }

    /// The clock driving the beam.
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The last scanned image, one row per active line.
    #[must_use]
    pub fn frame(&self) -> &[Vec<Pixel>] {
        &self.frame
    }

    /// One pixel of the last scanned image.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        self.frame.get(y)?.get(x).copied()
    }

    /// Frames whose last active line has been scanned.
    #[must_use]
    pub fn frames_scanned(&self) -> u64 {
        self.frames_scanned
    }

    /// Slot writes that happened while the beam was reading that slot.
    #[must_use]
    pub fn torn_writes(&self) -> u64 {
        self.torn_writes
    }

    /// Makes the next paint take `ticks` longer.
    pub fn inject_stall(&mut self, ticks: u64) {
        self.stall = self.stall.saturating_add(ticks);
    }

    fn line_now(&self) -> u64 {
        self.clock.now() / self.timing.ticks_per_line
    }

    fn cursor(&self) -> u16 {
        let line = self.line_now() % u64::from(self.display.total_lines.max(1));
        u16::try_from(line).unwrap_or(u16::MAX)
    }

    /// Lets the beam catch up with the clock.
    fn scan(&mut self) {
        let now = self.line_now();
        let total = u64::from(self.display.total_lines.max(1));
        let active = u64::from(self.display.active_lines);
        let slots = self.ring.len();
        while self.scanned <= now {
            let line = self.scanned % total;
            if line < active {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "active lines fit in u16"
                )]
                let line = line as usize;
                self.frame[line].clone_from(&self.ring[line % slots]);
                if line + 1 == self.frame.len() {
                    self.frames_scanned += 1;
                }
            }
            self.scanned += 1;
        }
    }
}

impl ScanoutHardware for SimScanout {
    fn current_line(&mut self) -> u16 {
        self.clock.advance(self.timing.poll_ticks);
        self.scan();
        self.cursor()
    }

    fn slot_count(&self) -> u16 {
        u16::try_from(self.ring.len()).unwrap_or(u16::MAX)
    }

    fn line_buffer(&mut self, slot: u16) -> &mut [Pixel] {
        self.scan();
        let cursor = self.cursor();
        let slot = usize::from(slot) % self.ring.len();
        if cursor < self.display.active_lines && usize::from(cursor) % self.ring.len() == slot {
            self.torn_writes += 1;
        }
        self.clock
            .advance(self.timing.paint_ticks + core::mem::take(&mut self.stall));
        self.scan();
        &mut self.ring[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> DisplayConfig {
        DisplayConfig {
            width: 4,
            active_lines: 6,
            total_lines: 8,
            line_period_ns: 1_000,
            sync_bits: 0xC0,
        }
    }

    #[test]
    fn beam_starts_in_blanking_and_wraps() {
        let mut hw = SimScanout::new(tiny(), 2, SimTiming::relaxed());
        assert_eq!(hw.current_line(), 6);
        hw.clock().advance(2 * 8);
        assert_eq!(hw.current_line(), 0);
        assert_eq!(hw.frames_scanned(), 0);
        hw.clock().advance(6 * 8);
        assert_eq!(hw.current_line(), 6);
        assert_eq!(hw.frames_scanned(), 1);
    }

    #[test]
    fn scanned_lines_come_from_their_slot() {
        let mut hw = SimScanout::new(tiny(), 2, SimTiming::relaxed());
        hw.line_buffer(0).fill(0xC1);
        hw.line_buffer(1).fill(0xC2);
        hw.clock().advance(8 * 8);
        hw.current_line();
        for y in 0..6 {
            let expected = if y % 2 == 0 { 0xC1 } else { 0xC2 };
            assert_eq!(hw.pixel(3, y), Some(expected), "line {y}");
        }
        assert_eq!(hw.torn_writes(), 0);
    }

    #[test]
    fn writing_the_scanned_slot_is_torn() {
        let mut hw = SimScanout::new(tiny(), 2, SimTiming::relaxed());
        hw.clock().advance(2 * 8);
        assert_eq!(hw.current_line(), 0);
        hw.line_buffer(0);
        assert_eq!(hw.torn_writes(), 1);
    }

    #[test]
    fn stalls_apply_once() {
        let mut hw = SimScanout::new(tiny(), 2, SimTiming::relaxed());
        let before = hw.clock().now();
        hw.inject_stall(40);
        hw.line_buffer(0);
        hw.line_buffer(1);
        assert_eq!(hw.clock().now() - before, 40 + 2 * 2);
    }
}
