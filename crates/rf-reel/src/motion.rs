//! Reel motion states and tuning

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Duration of one reference frame (60 fps), in milliseconds
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Motion state of a single reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionState {
    /// At rest, aligned on the last target list
    #[default]
    Idle = 0,
    /// Speeding up toward max speed
    Accelerating = 1,
    /// Scrolling at max speed
    Cruising = 2,
    /// Slowing down while injecting target symbols
    Decelerating = 3,
    /// Easing every instance onto its grid slot
    Snapping = 4,
}

impl MotionState {
    /// Reel is moving under its own velocity
    #[inline]
    pub fn is_scrolling(&self) -> bool {
        matches!(
            self,
            MotionState::Accelerating | MotionState::Cruising | MotionState::Decelerating
        )
    }

    /// A target list may be committed in this state
    #[inline]
    pub fn accepts_targets(&self) -> bool {
        matches!(self, MotionState::Accelerating | MotionState::Cruising)
    }
}

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Symbols travel toward the bottom, new ones enter at the top
    #[default]
    Down,
    /// Symbols travel toward the top, new ones enter at the bottom
    Up,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down => 1.0,
            Direction::Up => -1.0,
        }
    }

    /// Pick a direction with equal probability
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// Default [`MotionConfig::creep_cutoff`]
pub const DEFAULT_CREEP_CUTOFF: f64 = 0.25;

fn default_creep_cutoff() -> f64 {
    DEFAULT_CREEP_CUTOFF
}

/// Reel motion tuning
///
/// Speeds are in pixels per reference frame, accelerations in pixels per
/// frame per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Height of one symbol slot (pixels)
    pub symbol_height: f64,
    /// Hidden instances above the visible window
    pub lookahead_above: usize,
    /// Hidden instances below the visible window
    pub lookahead_below: usize,
    /// Velocity gained per frame while accelerating
    pub acceleration: f64,
    /// Velocity lost per frame while decelerating
    pub deceleration: f64,
    /// Cruising speed
    pub max_speed: f64,
    /// Floor speed while targets are still being brought in
    pub creep_speed: f64,
    /// Fraction of a slot left to travel under which the creep floor lifts
    /// and the reel may come to rest early, leaving the rest to snapping
    #[serde(default = "default_creep_cutoff")]
    pub creep_cutoff: f64,
    /// Fraction of the remaining distance covered per frame when snapping
    pub easing: f64,
    /// Distance under which an instance counts as aligned
    pub epsilon: f64,
}

impl MotionConfig {
    /// Normal reel feel
    pub fn normal() -> Self {
        Self {
            symbol_height: 100.0,
            lookahead_above: 1,
            lookahead_below: 1,
            acceleration: 2.0,
            deceleration: 1.0,
            max_speed: 40.0,
            creep_speed: 5.0,
            creep_cutoff: DEFAULT_CREEP_CUTOFF,
            easing: 0.35,
            epsilon: 0.5,
        }
    }

    /// Snappier tuning for turbo play
    pub fn turbo() -> Self {
        Self {
            acceleration: 6.0,
            deceleration: 3.0,
            max_speed: 60.0,
            creep_speed: 10.0,
            easing: 0.6,
            ..Self::normal()
        }
    }

    /// Instances per reel for a given visible row count
    pub fn buffer_len(&self, rows: usize) -> usize {
        rows + self.lookahead_above + self.lookahead_below
    }

    pub fn validate(&self) -> ReelResult<()> {
        let fail = |msg: String| Err(ReelError::InvalidConfig(msg));

        if !(self.symbol_height.is_finite() && self.symbol_height > 0.0) {
            return fail(format!("symbol_height must be positive, got {}", self.symbol_height));
        }
        if self.lookahead_above == 0 || self.lookahead_below == 0 {
            return fail("reels need at least one hidden instance above and below".into());
        }
        if !(self.max_speed > 0.0 && self.max_speed < self.symbol_height) {
            return fail(format!(
                "max_speed must be in (0, symbol_height), got {}",
                self.max_speed
            ));
        }
        if !(self.creep_speed > 0.0 && self.creep_speed <= self.max_speed) {
            return fail(format!(
                "creep_speed must be in (0, max_speed], got {}",
                self.creep_speed
            ));
        }
        // Resting past half a slot would snap onto the wrong boundary
        if !(self.creep_cutoff >= 0.0 && self.creep_cutoff < 0.5) {
            return fail(format!(
                "creep_cutoff must be in [0, 0.5), got {}",
                self.creep_cutoff
            ));
        }
        if !(self.acceleration > 0.0 && self.deceleration > 0.0) {
            return fail("acceleration and deceleration must be positive".into());
        }
        if !(self.easing > 0.0 && self.easing <= 1.0) {
            return fail(format!("easing must be in (0, 1], got {}", self.easing));
        }
        if !(self.epsilon > 0.0 && self.epsilon < self.symbol_height / 4.0) {
            return fail(format!(
                "epsilon must be in (0, symbol_height / 4), got {}",
                self.epsilon
            ));
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// One easing step toward a slot
///
/// Covers `easing * delta` of the remaining gap, capped at the whole gap, so
/// the distance to the slot shrinks on every call with a positive delta.
#[inline]
pub fn snap_step(position: f64, slot: f64, easing: f64, delta: f64) -> f64 {
    let factor = (easing * delta).clamp(0.0, 1.0);
    position + (slot - position) * factor
}

/// Nearest slot boundary for a position
#[inline]
pub fn nearest_slot(position: f64, symbol_height: f64) -> f64 {
    (position / symbol_height).round() * symbol_height
}
