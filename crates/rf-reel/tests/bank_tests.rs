//! Reel bank and slot machine integration tests
//!
//! Full spins on the bank clock: exact rest state, re-entrancy, event order
//! and column-win routing to the bonus presenter.

use std::sync::{Arc, Mutex};

use rf_reel::{
    AnimationHandle, AnimationParams, BankEvent, BankEventKind, InMemoryAssets, MachineConfig,
    ReelBank, RenderError, SkeletonData, SkeletonRenderer, SlotMachine, TimingConfig, FRAME_MS,
};
use rf_slot::{CatalogEntry, SpinResult, SymbolCatalog};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assets_for(config: &MachineConfig) -> InMemoryAssets {
    let catalog = config.slot.build_catalog().unwrap();
    InMemoryAssets::for_catalog(config.symbol_sheet.clone(), &catalog)
        .with_skeleton("man", ["win", "idle"])
        .with_skeleton("woman", ["win"])
}

fn make_bank(config: &MachineConfig, seed: u64) -> ReelBank {
    let catalog = Arc::new(config.slot.build_catalog().unwrap());
    ReelBank::with_seed(config, catalog, &assets_for(config), seed).unwrap()
}

fn run_bank(bank: &mut ReelBank) -> SpinResult {
    for _ in 0..5_000 {
        if let Some(result) = bank.tick(FRAME_MS) {
            return result;
        }
    }
    panic!("spin never resolved");
}

#[derive(Debug, Default)]
struct RenderLog {
    created: Vec<(String, AnimationParams)>,
    destroyed: Vec<AnimationHandle>,
}

struct RecordingRenderer {
    log: Arc<Mutex<RenderLog>>,
    next: u64,
    fail: bool,
}

impl RecordingRenderer {
    fn boxed(fail: bool) -> (Box<dyn SkeletonRenderer>, Arc<Mutex<RenderLog>>) {
        let log = Arc::new(Mutex::new(RenderLog::default()));
        let renderer = Self {
            log: Arc::clone(&log),
            next: 0,
            fail,
        };
        (Box::new(renderer), log)
    }
}

impl SkeletonRenderer for RecordingRenderer {
    fn create(
        &mut self,
        character_id: &str,
        _skeleton: &SkeletonData,
        params: &AnimationParams,
    ) -> Result<AnimationHandle, RenderError> {
        if self.fail {
            return Err(RenderError::Instantiation {
                character: character_id.to_string(),
                reason: "renderer offline".into(),
            });
        }
        self.next += 1;
        self.log
            .lock()
            .unwrap()
            .created
            .push((character_id.to_string(), params.clone()));
        Ok(AnimationHandle(self.next))
    }

    fn destroy(&mut self, handle: AnimationHandle) {
        self.log.lock().unwrap().destroyed.push(handle);
    }
}

/// Only MAN can land: every column is a column win
fn all_man_config() -> MachineConfig {
    let mut config = MachineConfig::default();
    config.timing = TimingConfig::studio();
    config.slot.symbols = vec![CatalogEntry::character(1, "MAN", "man.png", 1.0, 8.0, "man")];
    config
}

fn run_machine(machine: &mut SlotMachine) -> SpinResult {
    for _ in 0..5_000 {
        if let Some(result) = machine.tick(FRAME_MS) {
            return result;
        }
    }
    panic!("spin never resolved");
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL BANK
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_every_reel_rests_on_its_column() {
    init_logger();
    for (seed, timing) in [
        (1, TimingConfig::normal()),
        (2, TimingConfig::turbo()),
        (3, TimingConfig::studio()),
    ] {
        let config = MachineConfig {
            timing,
            ..MachineConfig::default()
        };
        let mut bank = make_bank(&config, seed);
        for _ in 0..3 {
            let ticket = bank.spin();
            let result = run_bank(&mut bank);
            assert_eq!(ticket.try_result().as_ref(), Some(&result));

            for (index, reel) in bank.reels().iter().enumerate() {
                assert!(reel.is_idle());
                assert_eq!(reel.targets(), result.grid[index].as_slice());
                assert_eq!(reel.visible_symbols(), result.grid[index]);
                let h = reel.motion().symbol_height;
                for p in reel.positions() {
                    assert_eq!(p, (p / h).round() * h);
                }
            }
        }
        assert_eq!(bank.outcome_stats().total_spins, 3);
    }
}

#[test]
fn test_spin_resolves_within_timing_bound() {
    let config = MachineConfig::default();
    let mut bank = make_bank(&config, 4);
    bank.spin();
    let bound = config.timing.total_spin_duration(5);
    let mut resolved_at = None;
    for _ in 0..5_000 {
        if bank.tick(FRAME_MS).is_some() {
            resolved_at = Some(bank.clock_ms());
            break;
        }
    }
    let resolved_at = resolved_at.unwrap();
    assert!(resolved_at >= config.timing.spin_duration_min_ms);
    // Stopping from full speed takes well under two seconds
    assert!(resolved_at < bound + 2_000.0);
}

#[test]
fn test_reentrant_spin_does_not_disturb_first() {
    let config = MachineConfig::default();

    // Reference run without interference
    let mut quiet = make_bank(&config, 5);
    quiet.spin();
    let expected = run_bank(&mut quiet);

    let mut bank = make_bank(&config, 5);
    let first = bank.spin();
    for _ in 0..30 {
        bank.tick(FRAME_MS);
    }
    let second = bank.spin();
    assert!(second.is_rejected());
    assert_eq!(second.try_result(), Some(SpinResult::empty()));

    let result = run_bank(&mut bank);
    assert_eq!(result, expected);
    assert_eq!(first.try_result(), Some(expected));
    assert_eq!(bank.outcome_stats().total_spins, 1);
}

#[test]
fn test_event_sequence() {
    let config = MachineConfig::default();
    let mut bank = make_bank(&config, 6);
    let events = bank.subscribe();
    let ticket = bank.spin();
    let result = run_bank(&mut bank);
    let spin_id = ticket.spin_id().unwrap();

    let events: Vec<BankEvent> = events.try_iter().collect();
    assert!(events.iter().all(|e| e.spin_id == spin_id));
    assert_eq!(events.first().map(|e| &e.kind), Some(&BankEventKind::SpinStarted));
    assert_eq!(
        events.last().map(|e| &e.kind),
        Some(&BankEventKind::SpinResolved {
            total_payout: result.total_payout
        })
    );
    for pair in events.windows(2) {
        assert!(pair[0].timestamp_ms <= pair[1].timestamp_ms);
    }

    // Stop commands go out in reel order, one stagger apart
    let stopping: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.kind, BankEventKind::ReelStopping { .. }))
        .collect();
    assert_eq!(stopping.len(), 5);
    for (i, pair) in stopping.windows(2).enumerate() {
        assert_eq!(pair[0].reel_index(), Some(i as u8));
        let gap = pair[1].timestamp_ms - pair[0].timestamp_ms;
        assert!(gap > 100.0 - FRAME_MS - 1e-6 && gap < 100.0 + FRAME_MS + 1e-6);
    }

    // Each reel reports what it landed on
    for event in &events {
        if let BankEventKind::ReelStopped { reel_index, symbols } = &event.kind {
            assert_eq!(symbols, &result.grid[*reel_index as usize]);
        }
    }
    let column_wins = events
        .iter()
        .filter(|e| matches!(e.kind, BankEventKind::ColumnWin { .. }))
        .count();
    assert_eq!(column_wins, result.column_wins.len());
}

#[test]
fn test_dropped_subscriber_is_pruned() {
    let config = MachineConfig {
        timing: TimingConfig::studio(),
        ..MachineConfig::default()
    };
    let mut bank = make_bank(&config, 7);
    drop(bank.subscribe());
    let kept = bank.subscribe();
    bank.spin();
    run_bank(&mut bank);
    assert!(kept.try_iter().count() > 0);
}

#[test]
fn test_missing_texture_fails_construction() {
    let config = MachineConfig::default();
    let catalog = Arc::new(SymbolCatalog::reference());
    let assets = InMemoryAssets::new().with_spritesheet("symbols", ["wild.png", "man.png"]);
    assert!(ReelBank::new(&config, catalog, &assets).is_err());
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOT MACHINE + BONUS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_column_wins_reach_presenter() {
    init_logger();
    let config = all_man_config();
    let assets = Arc::new(assets_for(&config));
    let (renderer, log) = RecordingRenderer::boxed(false);
    let mut machine = SlotMachine::with_seed(config, assets, renderer, 8).unwrap();

    machine.spin();
    let result = run_machine(&mut machine);
    assert_eq!(result.column_wins.len(), 5);
    assert_eq!(result.total_payout, 3.0 * 8.0 * 5.0);

    assert_eq!(machine.presenter().active().len(), 5);
    assert_eq!(machine.presenter().mask().len(), 5);
    assert!(machine.bank().reels().iter().all(|r| !r.is_visible()));
    {
        let log = log.lock().unwrap();
        assert_eq!(log.created.len(), 5);
        assert!(log.created.iter().all(|(c, p)| c == "man" && p.animation == "win"));
    }

    // Next spin clears the bonus before the reels move
    let ticket = machine.spin();
    assert!(!ticket.is_rejected());
    assert!(!machine.presenter().is_active());
    assert!(machine.presenter().mask().is_empty());
    assert!(machine.bank().reels().iter().all(|r| r.is_visible()));
    assert_eq!(log.lock().unwrap().destroyed.len(), 5);
}

#[test]
fn test_rejected_spin_keeps_bonus_state() {
    let config = all_man_config();
    let assets = Arc::new(assets_for(&config));
    let (renderer, _log) = RecordingRenderer::boxed(false);
    let mut machine = SlotMachine::with_seed(config, assets, renderer, 9).unwrap();

    machine.spin();
    machine.tick(FRAME_MS);
    assert!(machine.spin().is_rejected());
    assert!(machine.is_spinning());
    run_machine(&mut machine);
    assert_eq!(machine.stats().total_spins, 1);
}

#[test]
fn test_render_failure_leaves_spin_intact() {
    init_logger();
    let config = all_man_config();
    let assets = Arc::new(assets_for(&config));
    let (renderer, log) = RecordingRenderer::boxed(true);
    let mut machine = SlotMachine::with_seed(config, assets, renderer, 10).unwrap();

    let ticket = machine.spin();
    let result = run_machine(&mut machine);
    assert_eq!(result.column_wins.len(), 5);
    assert_eq!(ticket.try_result(), Some(result));
    assert!(!machine.presenter().is_active());
    assert!(machine.bank().reels().iter().all(|r| r.is_visible()));
    assert!(log.lock().unwrap().created.is_empty());
}

#[test]
fn test_machine_requires_skeletons() {
    let config = MachineConfig::default();
    let catalog = config.slot.build_catalog().unwrap();
    let assets = Arc::new(InMemoryAssets::for_catalog("symbols", &catalog));
    let (renderer, _) = RecordingRenderer::boxed(false);
    assert!(SlotMachine::new(config, assets, renderer).is_err());
}
