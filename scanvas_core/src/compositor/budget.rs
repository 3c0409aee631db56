// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive dispatch budget.
//!
//! While painting ahead of the cursor, the compositor spends ring-full polls
//! on the command stream. [`DispatchBudget`] decides how many bytes one poll
//! may consume, shrinking it when frames miss lines and growing it back
//! after sustained clean frames.

/// Controls how the dispatch budget adapts to missed lines.
///
/// Passed to the compositor via [`CompositorConfig::policy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DegradationPolicy {
    /// Adapt the budget automatically.
    ///
    /// Halves the budget after `miss_threshold` consecutive frames with
    /// misses. Doubles it after `recovery_threshold` consecutive clean
    /// frames. Bounded by [`CompositorConfig::min_budget`] and
    /// [`CompositorConfig::max_budget`].
    Adaptive {
        /// Consecutive missing frames before shrinking.
        miss_threshold: u32,
        /// Consecutive clean frames before growing.
        recovery_threshold: u32,
    },
    /// Keep the budget at [`CompositorConfig::initial_budget`].
    ///
    /// The byte-rate EMA is still tracked.
    Fixed,
}

/// Configuration for the compositor loop.
#[derive(Clone, Copy, Debug)]
pub struct CompositorConfig {
    /// Bytes per idle poll at start.
    pub initial_budget: u32,
    /// Smallest budget.
    pub min_budget: u32,
    /// Largest budget.
    pub max_budget: u32,
    /// EMA smoothing factor for bytes per frame (0.0–1.0).
    pub ema_alpha: f32,
    /// Policy for adapting the budget.
    pub policy: DegradationPolicy,
}

impl CompositorConfig {
    /// Adaptive budget starting at 64 bytes per poll.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            initial_budget: 64,
            min_budget: 8,
            max_budget: 512,
            ema_alpha: 0.2,
            policy: DegradationPolicy::Adaptive {
                miss_threshold: 3,
                recovery_threshold: 30,
            },
        }
    }

    /// A budget that never changes.
    #[must_use]
    pub const fn fixed(bytes: u32) -> Self {
        Self {
            initial_budget: bytes,
            min_budget: bytes,
            max_budget: bytes,
            ema_alpha: 0.2,
            policy: DegradationPolicy::Fixed,
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Exponential moving average tracker.
#[derive(Clone, Copy, Debug)]
struct Ema {
    value: f32,
    alpha: f32,
    initialized: bool,
}

impl Ema {
    const fn new(alpha: f32) -> Self {
        Self {
            value: 0.0,
            alpha,
            initialized: false,
        }
    }

    fn update(&mut self, sample: f32) {
        if self.initialized {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        } else {
            self.value = sample;
            self.initialized = true;
        }
    }

    const fn get(&self) -> f32 {
        self.value
    }
}

/// Per-poll byte allowance, adapted once per frame.
#[derive(Debug)]
pub struct DispatchBudget {
    config: CompositorConfig,
    bytes: u32,
    rate: Ema,
    consecutive_misses: u32,
    consecutive_hits: u32,
}

impl DispatchBudget {
    /// Creates a budget at the configured initial value.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            bytes: config
                .initial_budget
                .clamp(config.min_budget, config.max_budget.max(config.min_budget)),
            rate: Ema::new(config.ema_alpha),
            consecutive_misses: 0,
            consecutive_hits: 0,
            config,
        }
    }

    /// Bytes one idle poll may consume.
    #[must_use]
    pub fn bytes(&self) -> u32 {
        self.bytes
    }

    /// Smoothed bytes consumed per frame.
    #[must_use]
    pub fn bytes_per_frame(&self) -> u32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "EMA of u32 samples fits in u32"
        )]
        let rate = self.rate.get() as u32;
        rate
    }

    /// Feeds the outcome of one frame.
    pub fn observe(&mut self, bytes: u32, missed: bool) {
        self.rate.update(bytes as f32);

        match self.config.policy {
            DegradationPolicy::Adaptive {
                miss_threshold,
                recovery_threshold,
            } => {
                if missed {
                    self.consecutive_misses += 1;
                    self.consecutive_hits = 0;
                    if self.consecutive_misses >= miss_threshold
                        && self.bytes > self.config.min_budget
                    {
                        self.bytes = (self.bytes / 2).max(self.config.min_budget);
                        self.consecutive_misses = 0;
                    }
                } else {
                    self.consecutive_hits += 1;
                    self.consecutive_misses = 0;
                    if self.consecutive_hits >= recovery_threshold
                        && self.bytes < self.config.max_budget
                    {
                        self.bytes = self.bytes.saturating_mul(2).min(self.config.max_budget);
                        self.consecutive_hits = 0;
                    }
                }
            }
            DegradationPolicy::Fixed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_halves_after_misses() {
        let mut budget = DispatchBudget::new(CompositorConfig::standard());
        assert_eq!(budget.bytes(), 64);
        budget.observe(10, true);
        budget.observe(10, true);
        assert_eq!(budget.bytes(), 64, "two misses are tolerated");
        budget.observe(10, true);
        assert_eq!(budget.bytes(), 32);
    }

    #[test]
    fn miss_counter_resets_on_clean_frame() {
        let mut budget = DispatchBudget::new(CompositorConfig::standard());
        budget.observe(0, true);
        budget.observe(0, true);
        budget.observe(0, false);
        budget.observe(0, true);
        budget.observe(0, true);
        assert_eq!(budget.bytes(), 64);
    }

    #[test]
    fn budget_recovers_and_respects_bounds() {
        let mut config = CompositorConfig::standard();
        config.initial_budget = 8;
        let mut budget = DispatchBudget::new(config);
        for _ in 0..3 {
            budget.observe(0, true);
        }
        assert_eq!(budget.bytes(), 8, "never below the minimum");

        for _ in 0..29 {
            budget.observe(0, false);
        }
        assert_eq!(budget.bytes(), 8);
        budget.observe(0, false);
        assert_eq!(budget.bytes(), 16);

        for _ in 0..30 * 10 {
            budget.observe(0, false);
        }
        assert_eq!(budget.bytes(), 512, "never above the maximum");
    }

    #[test]
    fn fixed_policy_tracks_rate_only() {
        let mut budget = DispatchBudget::new(CompositorConfig::fixed(100));
        for _ in 0..10 {
            budget.observe(40, true);
        }
        assert_eq!(budget.bytes(), 100);
        assert_eq!(budget.bytes_per_frame(), 40);
    }
}
