//! Reel — one vertical strip and its motion state machine
//!
//! ```text
//! Idle ──spin()──> Accelerating ──(max speed)──> Cruising
//!                       │                           │
//!                       └──set_target_symbols()─────┤
//!                                                   v
//!                                             Decelerating
//!                                                   │ velocity 0 / landed
//!                                                   v
//!                                  Idle <──aligned── Snapping
//! ```
//!
//! Geometry: instance `i` of the ring rests at `(i - lookahead_above) * h`,
//! so the visible window is `[0, rows * h)` and the buffer span is
//! `[-above * h, (rows + below) * h)`. Instances leaving the span on the
//! leading side are rebound and moved to the trailing end.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rf_slot::{SymbolCatalog, SymbolId};

use crate::assets::{SymbolTextures, TextureHandle};
use crate::error::{ReelError, ReelResult};
use crate::instance::{InstanceRing, SymbolInstance};
use crate::motion::{Direction, MotionConfig, MotionState, nearest_slot, snap_step};

/// Placeholder texture for ids the texture table does not know
const MISSING_TEXTURE: TextureHandle = TextureHandle(0);

/// A single animated reel
pub struct Reel {
    index: u8,
    rows: usize,
    motion: MotionConfig,
    catalog: Arc<SymbolCatalog>,
    textures: Arc<SymbolTextures>,
    rng: StdRng,
    instances: InstanceRing,
    state: MotionState,
    velocity: f64,
    direction: Direction,
    /// Committed visible symbols, top to bottom
    targets: Vec<SymbolId>,
    /// Targets already placed on the strip this spin
    injected: usize,
    /// Distance left until the target block sits on the visible rows
    landing: Option<f64>,
    visible: bool,
    recycled: u64,
}

impl Reel {
    /// Create a reel filled with random symbols at rest
    pub fn new(
        index: u8,
        rows: usize,
        motion: MotionConfig,
        catalog: Arc<SymbolCatalog>,
        textures: Arc<SymbolTextures>,
        seed: u64,
    ) -> ReelResult<Self> {
        motion.validate()?;
        if rows == 0 {
            return Err(ReelError::InvalidConfig(format!(
                "reel {index} needs at least one visible row"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let h = motion.symbol_height;
        let above = motion.lookahead_above as f64;

        let slots = (0..motion.buffer_len(rows))
            .map(|i| {
                let id = catalog.weighted_sample(&mut rng);
                let texture = textures.get(id).unwrap_or(MISSING_TEXTURE);
                SymbolInstance::new(id, (i as f64 - above) * h, texture)
            })
            .collect();

        Ok(Self {
            index,
            rows,
            motion,
            catalog,
            textures,
            rng,
            instances: InstanceRing::new(slots),
            state: MotionState::Idle,
            velocity: 0.0,
            direction: Direction::Down,
            targets: Vec::new(),
            injected: 0,
            landing: None,
            visible: true,
            recycled: 0,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == MotionState::Idle
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    /// Last committed target list (top to bottom)
    pub fn targets(&self) -> &[SymbolId] {
        &self.targets
    }

    /// Number of instances in the buffer
    pub fn buffer_len(&self) -> usize {
        self.instances.len()
    }

    /// Instances, top to bottom
    pub fn instances(&self) -> impl Iterator<Item = &SymbolInstance> {
        self.instances.iter()
    }

    /// Instance positions, top to bottom
    pub fn positions(&self) -> Vec<f64> {
        self.instances.iter().map(|inst| inst.position).collect()
    }

    /// Total recycle events since construction
    pub fn recycle_count(&self) -> u64 {
        self.recycled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Symbols currently occupying the visible rows, top to bottom
    pub fn visible_symbols(&self) -> Vec<SymbolId> {
        let h = self.motion.symbol_height;
        let mut shown: Vec<(f64, SymbolId)> = self
            .instances
            .iter()
            .filter(|inst| {
                let row = (inst.position / h).round();
                row >= 0.0 && row < self.rows as f64
            })
            .map(|inst| (inst.position, inst.symbol_id))
            .collect();
        shown.sort_by(|a, b| a.0.total_cmp(&b.0));
        shown.into_iter().map(|(_, id)| id).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start spinning from rest
    pub fn spin(&mut self, direction: Direction) -> ReelResult<()> {
        if self.state != MotionState::Idle {
            log::warn!("Reel {}: spin ignored while {:?}", self.index, self.state);
            return Err(ReelError::InvalidTransition {
                reel: self.index,
                action: "spin",
                state: self.state,
            });
        }

        self.velocity = 0.0;
        self.direction = direction;
        self.targets.clear();
        self.injected = 0;
        self.landing = None;
        self.state = MotionState::Accelerating;
        log::debug!("Reel {}: spinning {:?}", self.index, direction);
        Ok(())
    }

    /// Commit the symbols this reel must show at rest, top to bottom
    ///
    /// Rejected without touching the reel if the list has the wrong length,
    /// names an unknown symbol, or the reel is not spinning freely.
    pub fn set_target_symbols(&mut self, targets: &[SymbolId]) -> ReelResult<()> {
        if targets.len() != self.rows {
            log::warn!(
                "Reel {}: target list has {} symbols, expected {}",
                self.index,
                targets.len(),
                self.rows
            );
            return Err(ReelError::TargetLength {
                reel: self.index,
                expected: self.rows,
                actual: targets.len(),
            });
        }
        if !self.state.accepts_targets() {
            log::warn!(
                "Reel {}: targets ignored while {:?}",
                self.index,
                self.state
            );
            return Err(ReelError::InvalidTransition {
                reel: self.index,
                action: "set target symbols",
                state: self.state,
            });
        }
        if let Some(&unknown) = targets.iter().find(|&&id| !self.catalog.contains(id)) {
            log::warn!("Reel {}: unknown target symbol {}", self.index, unknown);
            return Err(rf_slot::SlotError::SymbolNotFound(unknown).into());
        }

        self.targets = targets.to_vec();
        self.injected = 0;
        self.landing = None;
        self.state = MotionState::Decelerating;
        log::debug!("Reel {}: stopping on {:?}", self.index, self.targets);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME UPDATE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance by `delta` reference frames
    ///
    /// Long frames are split into steps of at most one frame so a single step
    /// never travels a whole slot.
    pub fn tick(&mut self, delta: f64) {
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }
        let mut remaining = delta;
        while remaining > 0.0 && self.state != MotionState::Idle {
            let step = remaining.min(1.0);
            self.step(step);
            remaining -= step;
        }
    }

    fn step(&mut self, delta: f64) {
        match self.state {
            MotionState::Idle => {}
            MotionState::Accelerating => {
                self.velocity = (self.velocity + self.motion.acceleration * delta)
                    .min(self.motion.max_speed);
                if self.velocity >= self.motion.max_speed {
                    self.state = MotionState::Cruising;
                }
                self.advance(self.velocity * delta);
            }
            MotionState::Cruising => self.advance(self.velocity * delta),
            MotionState::Decelerating => self.decelerate(delta),
            MotionState::Snapping => self.snap(delta),
        }
    }

    fn decelerate(&mut self, delta: f64) {
        let h = self.motion.symbol_height;
        let mut velocity = (self.velocity - self.motion.deceleration * delta).max(0.0);

        match self.landing {
            // Targets still queued: keep moving so they get pulled in
            None => velocity = velocity.max(self.motion.creep_speed),
            Some(remaining) => {
                velocity = velocity.min((2.0 * self.motion.deceleration * remaining).sqrt());
                if remaining >= h * self.motion.creep_cutoff {
                    velocity = velocity.max(self.motion.creep_speed);
                }
            }
        }
        self.velocity = velocity;

        let mut distance = velocity * delta;
        if let Some(remaining) = self.landing.as_mut() {
            distance = distance.min(*remaining);
            *remaining -= distance;
        }
        if distance > 0.0 {
            self.advance(distance);
        }

        if let Some(remaining) = self.landing {
            if remaining <= 0.0 || self.velocity <= 0.0 {
                self.velocity = 0.0;
                self.state = MotionState::Snapping;
            }
        }
    }

    fn snap(&mut self, delta: f64) {
        let h = self.motion.symbol_height;
        let easing = self.motion.easing;
        let epsilon = self.motion.epsilon;

        let mut settled = true;
        for inst in self.instances.iter_mut() {
            let slot = nearest_slot(inst.position, h);
            inst.position = snap_step(inst.position, slot, easing, delta);
            if (slot - inst.position).abs() > epsilon {
                settled = false;
            }
        }

        if settled {
            for inst in self.instances.iter_mut() {
                inst.position = nearest_slot(inst.position, h);
            }
            self.velocity = 0.0;
            self.landing = None;
            self.state = MotionState::Idle;

            let shown = self.visible_symbols();
            if shown != self.targets {
                log::error!(
                    "Reel {}: settled on {:?}, expected {:?}",
                    self.index,
                    shown,
                    self.targets
                );
            } else {
                log::debug!("Reel {}: settled on {:?}", self.index, shown);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SCROLLING & RECYCLING
    // ═══════════════════════════════════════════════════════════════════════════

    fn span_top(&self) -> f64 {
        -(self.motion.lookahead_above as f64) * self.motion.symbol_height
    }

    fn span_bottom(&self) -> f64 {
        (self.rows + self.motion.lookahead_below) as f64 * self.motion.symbol_height
    }

    fn advance(&mut self, distance: f64) {
        debug_assert!(self.state.is_scrolling(), "advance while {:?}", self.state);
        let dy = distance * self.direction.sign();
        for inst in self.instances.iter_mut() {
            inst.position += dy;
        }
        self.recycle();
    }

    /// Positions of the top and bottom instances
    fn edges(&self) -> Option<(f64, f64)> {
        let front = self.instances.front()?.position;
        let back = self.instances.back()?.position;
        Some((front, back))
    }

    fn recycle(&mut self) {
        let h = self.motion.symbol_height;
        match self.direction {
            Direction::Down => {
                let bottom = self.span_bottom();
                while let Some((front, back)) = self.edges() {
                    if back < bottom {
                        break;
                    }
                    let position = front - h;
                    let id = self.next_symbol(position);
                    let texture = self.textures.get(id).unwrap_or(MISSING_TEXTURE);
                    if let Some(slot) = self.instances.rotate_to_front() {
                        slot.rebind(id, texture);
                        slot.position = position;
                    }
                    self.recycled += 1;
                }
            }
            Direction::Up => {
                let top = self.span_top();
                while let Some((front, back)) = self.edges() {
                    if front + h > top {
                        break;
                    }
                    let position = back + h;
                    let id = self.next_symbol(position);
                    let texture = self.textures.get(id).unwrap_or(MISSING_TEXTURE);
                    if let Some(slot) = self.instances.rotate_to_back() {
                        slot.rebind(id, texture);
                        slot.position = position;
                    }
                    self.recycled += 1;
                }
            }
        }
    }

    /// Symbol for an instance entering the strip at `position`
    ///
    /// While decelerating, targets come first: bottom row first when
    /// scrolling down (new symbols enter on top), top row first when
    /// scrolling up. Placing the last target fixes the landing distance.
    fn next_symbol(&mut self, position: f64) -> SymbolId {
        if self.state != MotionState::Decelerating || self.injected >= self.targets.len() {
            return self.catalog.weighted_sample(&mut self.rng);
        }

        let rows = self.targets.len();
        let (target_index, final_row) = match self.direction {
            Direction::Down => (rows - 1 - self.injected, 0),
            Direction::Up => (self.injected, rows - 1),
        };
        self.injected += 1;

        if self.injected == rows {
            let rest = final_row as f64 * self.motion.symbol_height;
            self.landing = Some(((rest - position) * self.direction.sign()).max(0.0));
        }

        self.targets[target_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;

    fn reel(rows: usize, seed: u64) -> Reel {
        let catalog = Arc::new(SymbolCatalog::reference());
        let assets = InMemoryAssets::for_catalog("symbols", &catalog);
        let textures = Arc::new(SymbolTextures::resolve(&assets, "symbols", &catalog).unwrap());
        Reel::new(0, rows, MotionConfig::normal(), catalog, textures, seed).unwrap()
    }

    fn run_until_idle(reel: &mut Reel, max_frames: usize) -> usize {
        for frame in 0..max_frames {
            if reel.is_idle() {
                return frame;
            }
            reel.tick(1.0);
        }
        panic!("reel did not settle within {max_frames} frames");
    }

    #[test]
    fn test_new_reel_rests_on_slots() {
        let reel = reel(3, 1);
        assert_eq!(reel.buffer_len(), 5);
        assert!(reel.is_idle());
        let positions: Vec<_> = reel.instances().map(|i| i.position).collect();
        assert_eq!(positions, vec![-100.0, 0.0, 100.0, 200.0, 300.0]);
        assert_eq!(reel.visible_symbols().len(), 3);
    }

    #[test]
    fn test_accelerates_to_cruise() {
        let mut reel = reel(3, 2);
        reel.spin(Direction::Down).unwrap();
        assert_eq!(reel.state(), MotionState::Accelerating);
        reel.tick(1.0);
        assert_eq!(reel.velocity(), 2.0);
        for _ in 0..30 {
            reel.tick(1.0);
        }
        assert_eq!(reel.state(), MotionState::Cruising);
        assert_eq!(reel.velocity(), 40.0);
    }

    #[test]
    fn test_lands_on_targets_both_directions() {
        for (seed, direction) in [(3, Direction::Down), (4, Direction::Up)] {
            let mut reel = reel(3, seed);
            reel.spin(direction).unwrap();
            for _ in 0..90 {
                reel.tick(1.0);
            }
            reel.set_target_symbols(&[2, 7, 1]).unwrap();
            run_until_idle(&mut reel, 2_000);

            assert_eq!(reel.visible_symbols(), vec![2, 7, 1]);
            for inst in reel.instances() {
                assert_eq!(inst.position % 100.0, 0.0);
            }
        }
    }

    #[test]
    fn test_stop_while_accelerating() {
        let mut reel = reel(3, 5);
        reel.spin(Direction::Up).unwrap();
        reel.tick(1.0);
        reel.set_target_symbols(&[5, 5, 6]).unwrap();
        run_until_idle(&mut reel, 2_000);
        assert_eq!(reel.visible_symbols(), vec![5, 5, 6]);
    }

    #[test]
    fn test_bad_target_length_is_noop() {
        let mut reel = reel(3, 6);
        reel.spin(Direction::Down).unwrap();
        reel.tick(1.0);
        let velocity = reel.velocity();
        let err = reel.set_target_symbols(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            ReelError::TargetLength {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert_eq!(reel.state(), MotionState::Accelerating);
        assert_eq!(reel.velocity(), velocity);
        assert!(reel.targets().is_empty());
    }

    #[test]
    fn test_unknown_target_symbol_is_noop() {
        let mut reel = reel(3, 7);
        reel.spin(Direction::Down).unwrap();
        assert!(reel.set_target_symbols(&[1, 2, 404]).is_err());
        assert_eq!(reel.state(), MotionState::Accelerating);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut reel = reel(3, 8);
        assert!(matches!(
            reel.set_target_symbols(&[1, 2, 3]),
            Err(ReelError::InvalidTransition { .. })
        ));
        reel.spin(Direction::Down).unwrap();
        assert!(reel.spin(Direction::Up).is_err());
        assert_eq!(reel.direction(), Direction::Down);
        reel.set_target_symbols(&[1, 2, 3]).unwrap();
        assert!(reel.set_target_symbols(&[3, 2, 1]).is_err());
        assert_eq!(reel.targets(), &[1, 2, 3]);
    }

    #[test]
    fn test_buffer_length_constant_while_cruising() {
        let mut reel = reel(3, 9);
        reel.spin(Direction::Down).unwrap();
        for _ in 0..10_000 {
            reel.tick(1.0);
            assert_eq!(reel.buffer_len(), 5);
        }
        assert!(reel.recycle_count() > 3_000);
        // Instances stay contiguous
        let positions: Vec<_> = reel.instances().map(|i| i.position).collect();
        for pair in positions.windows(2) {
            assert!((pair[1] - pair[0] - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_large_delta_is_subdivided() {
        let mut reel = reel(3, 10);
        reel.spin(Direction::Up).unwrap();
        reel.tick(120.0);
        assert_eq!(reel.state(), MotionState::Cruising);
        reel.set_target_symbols(&[4, 4, 4]).unwrap();
        reel.tick(600.0);
        assert!(reel.is_idle());
        assert_eq!(reel.visible_symbols(), vec![4, 4, 4]);
    }
}
