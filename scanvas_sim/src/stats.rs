// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frame statistics and grading.

use scanvas_core::trace::FrameSummary;

/// Letter grade for how reliably frames were painted ahead of the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameGrade {
    /// No misses in the window.
    A,
    /// Occasional misses.
    B,
    /// Frequent misses.
    C,
    /// Most frames missed lines.
    D,
}

impl FrameGrade {
    /// Returns a short label for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`MissTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Grade over the history window.
    pub grade: FrameGrade,
    /// Frames with misses per 1000 observed frames.
    pub miss_rate_per_1000: f64,
    /// Lines missed in the current frame.
    pub lines_missed: u32,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total frames with misses.
    pub missed_frames: u64,
}

/// Rolling tracker with a fixed-size history of missed lines per frame.
#[derive(Debug)]
pub struct MissTracker<const N: usize> {
    missed_lines: [u32; N],
    cursor: usize,
    total_frames: u64,
    missed_frames: u64,
}

impl<const N: usize> Default for MissTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MissTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            missed_lines: [0; N],
            cursor: 0,
            total_frames: 0,
            missed_frames: 0,
        }
    }

    /// Observes one frame and returns an updated report.
    pub fn observe(&mut self, summary: &FrameSummary) -> FrameReport {
        self.total_frames = self.total_frames.saturating_add(1);
        if N > 0 {
            self.missed_lines[self.cursor % N] = summary.lines_missed;
            self.cursor = (self.cursor + 1) % N;
        }
        if summary.missed() {
            self.missed_frames = self.missed_frames.saturating_add(1);
        }

        let miss_rate = self.missed_frames as f64 * 1000.0 / self.total_frames as f64;

        FrameReport {
            grade: self.grade(),
            miss_rate_per_1000: miss_rate,
            lines_missed: summary.lines_missed,
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Grade over the frames in the window.
    #[must_use]
    pub fn grade(&self) -> FrameGrade {
        let window = self.window();
        let missed = window.iter().filter(|&&m| m > 0).count();
        if missed == 0 {
            FrameGrade::A
        } else if missed * 20 <= window.len() {
            FrameGrade::B
        } else if missed * 2 <= window.len() {
            FrameGrade::C
        } else {
            FrameGrade::D
        }
    }

    /// Missed lines per frame, oldest to newest, over the frames observed
    /// so far.
    #[must_use]
    pub fn history(&self) -> Vec<u32> {
        let filled = usize::try_from(self.total_frames).map_or(N, |t| t.min(N));
        (0..filled)
            .map(|i| self.missed_lines[(self.cursor + N - filled + i) % N])
            .collect()
    }

    /// An ASCII sparkline of [`history`](Self::history), saturating at
    /// `max_lines`.
    #[must_use]
    pub fn sparkline_ascii(&self, max_lines: u32) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let top = LEVELS.len() - 1;
        let max = max_lines.max(1);
        self.history()
            .into_iter()
            .map(|m| {
                let level = usize::try_from(m.min(max)).unwrap_or(0) * top
                    / usize::try_from(max).unwrap_or(1);
                char::from(LEVELS[level])
            })
            .collect()
    }

    fn window(&self) -> &[u32] {
        let filled = usize::try_from(self.total_frames).map_or(N, |t| t.min(N));
        if filled < N {
            &self.missed_lines[..filled]
        } else {
            &self.missed_lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines_missed: u32) -> FrameSummary {
        FrameSummary {
            lines_missed,
            ..FrameSummary::default()
        }
    }

    #[test]
    fn miss_rate_accumulates() {
        let mut t = MissTracker::<8>::new();
        let mut report = None;
        for i in 0..10 {
            report = Some(t.observe(&frame(u32::from(i < 2))));
        }
        let report = report.unwrap();
        assert!((report.miss_rate_per_1000 - 200.0).abs() < 1e-6);
        assert_eq!(report.missed_frames, 2);
        assert_eq!(report.grade, FrameGrade::A, "misses left the window");
    }

    #[test]
    fn grade_follows_the_window() {
        let mut t = MissTracker::<4>::new();
        assert_eq!(t.observe(&frame(0)).grade, FrameGrade::A);
        assert_eq!(t.observe(&frame(3)).grade, FrameGrade::C);
        assert_eq!(t.observe(&frame(3)).grade, FrameGrade::D);
    }

    #[test]
    fn history_is_oldest_first() {
        let mut t = MissTracker::<3>::new();
        for m in [1, 2, 3, 4] {
            t.observe(&frame(m));
        }
        assert_eq!(t.history(), [2, 3, 4]);
        assert_eq!(t.sparkline_ascii(4), "=*@");
    }
}
