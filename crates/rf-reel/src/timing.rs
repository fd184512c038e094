//! Timing profiles for spin scheduling

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Timing profile for a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (no stagger, short spins for testing)
    Studio,
    /// Custom timing multiplier
    Custom,
}

/// Spin schedule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Delay between consecutive reel starts (ms)
    pub reel_start_interval_ms: f64,

    /// Delay between consecutive reel stops (ms)
    pub reel_stop_interval_ms: f64,

    /// Shortest free-spin time before the first stop command (ms)
    pub spin_duration_min_ms: f64,

    /// Longest free-spin time before the first stop command (ms)
    pub spin_duration_max_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reel_start_interval_ms: 100.0,
            reel_stop_interval_ms: 100.0,
            spin_duration_min_ms: 2000.0,
            spin_duration_max_ms: 4000.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            reel_start_interval_ms: 50.0,
            reel_stop_interval_ms: 50.0,
            spin_duration_min_ms: 800.0,
            spin_duration_max_ms: 1200.0,
        }
    }

    /// Studio mode
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            reel_start_interval_ms: 0.0,
            reel_stop_interval_ms: 0.0,
            spin_duration_min_ms: 500.0,
            spin_duration_max_ms: 500.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            reel_start_interval_ms: self.reel_start_interval_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            spin_duration_min_ms: self.spin_duration_min_ms * factor,
            spin_duration_max_ms: self.spin_duration_max_ms * factor,
        }
    }

    /// Draw a free-spin duration from the configured range
    pub fn sample_spin_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.spin_duration_max_ms <= self.spin_duration_min_ms {
            return self.spin_duration_min_ms;
        }
        rng.random_range(self.spin_duration_min_ms..self.spin_duration_max_ms)
    }

    /// Longest time from spin start until the last stop command is issued
    pub fn total_spin_duration(&self, reel_count: u8) -> f64 {
        let stagger = reel_count.saturating_sub(1) as f64;
        let last_start = stagger * self.reel_start_interval_ms;
        let last_stop = self.spin_duration_max_ms + stagger * self.reel_stop_interval_ms;
        last_start.max(last_stop)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let values = [
            self.reel_start_interval_ms,
            self.reel_stop_interval_ms,
            self.spin_duration_min_ms,
            self.spin_duration_max_ms,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ReelError::InvalidConfig(
                "timing values must be finite and non-negative".into(),
            ));
        }
        if self.spin_duration_min_ms > self.spin_duration_max_ms {
            return Err(ReelError::InvalidConfig(format!(
                "spin duration range is empty: {}..{}",
                self.spin_duration_min_ms, self.spin_duration_max_ms
            )));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
