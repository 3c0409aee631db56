// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video mode configuration.
//!
//! A [`DisplayConfig`] describes the scan-out geometry the compositor paints
//! for. Presets cover the modes the timing generator is normally programmed
//! with; other modes can be built field by field.

use crate::geometry::{PixelRect, Point};

/// Scan-out geometry and timing of one video mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Visible pixels per line (bytes per line buffer).
    pub width: u16,
    /// Visible lines per frame.
    pub active_lines: u16,
    /// Lines per frame including vertical blanking.
    pub total_lines: u16,
    /// Duration of one line in nanoseconds.
    pub line_period_ns: u32,
    /// Levels of the two sync signals carried in the top bits of every
    /// visible pixel.
    pub sync_bits: u8,
}

impl DisplayConfig {
    /// 640×480 at 60 Hz.
    #[must_use]
    pub const fn vga_640x480() -> Self {
        Self {
            width: 640,
            active_lines: 480,
            total_lines: 525,
            line_period_ns: 31_778,
            sync_bits: 0xC0,
        }
    }

    /// 800×600 at 60 Hz.
    #[must_use]
    pub const fn svga_800x600() -> Self {
        Self {
            width: 800,
            active_lines: 600,
            total_lines: 628,
            line_period_ns: 26_400,
            sync_bits: 0xC0,
        }
    }

    /// 320×240, line-doubled from the 640×480 timing.
    #[must_use]
    pub const fn qvga_320x240() -> Self {
        Self {
            width: 320,
            active_lines: 240,
            total_lines: 262,
            line_period_ns: 63_556,
            sync_bits: 0xC0,
        }
    }

    /// The visible screen as a rectangle at the origin.
    #[must_use]
    pub const fn screen_rect(&self) -> PixelRect {
        PixelRect::from_origin_size(
            Point::new(0, 0),
            self.width as i32,
            self.active_lines as i32,
        )
    }

    /// Whether `line` lies in vertical blanking.
    #[must_use]
    pub const fn is_blanking(&self, line: u16) -> bool {
        line >= self.active_lines
    }

    /// Duration of one frame in nanoseconds.
    #[must_use]
    pub const fn frame_period_ns(&self) -> u64 {
        self.line_period_ns as u64 * self.total_lines as u64
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::vga_640x480()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_blanking() {
        for config in [
            DisplayConfig::vga_640x480(),
            DisplayConfig::svga_800x600(),
            DisplayConfig::qvga_320x240(),
        ] {
            assert!(config.total_lines > config.active_lines, "{config:?}");
            assert!(config.is_blanking(config.active_lines));
            assert!(!config.is_blanking(config.active_lines - 1));
        }
    }

    #[test]
    fn vga_frame_is_about_sixty_hertz() {
        let ns = DisplayConfig::vga_640x480().frame_period_ns();
        assert!((16_600_000..16_800_000).contains(&ns), "{ns}");
    }

    #[test]
    fn screen_rect_matches_mode() {
        let rect = DisplayConfig::svga_800x600().screen_rect();
        assert_eq!(rect, PixelRect::new(0, 0, 800, 600));
    }
}
