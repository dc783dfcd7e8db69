//! Resource model tests.
//!
//! Tests cover: passive drain, clamping, ordered death evaluation,
//! movement cost, rift stacking with the passive tick, override deltas.

use thermos_core::{
    config::{GameConfig, ResourceConfig, RiftConfig},
    engine::GameEngine,
    intent::PlayerIntent,
    minigame::MiniGameKind,
    phase::Phase,
    resources::{DeathCause, Resources},
    types::{Direction, WorldPoint},
};

/// LORE dwell + BOOT dwell.
const ACTIVE_AT: u64 = 7_500;

fn active_engine(seed: u64) -> GameEngine {
    let mut engine = GameEngine::build_test(seed).expect("build test engine");
    engine.advance(ACTIVE_AT);
    assert_eq!(engine.phase(), Phase::Active);
    engine
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn levels(oxygen: f64, energy: f64, heat: f64) -> Resources {
    Resources { oxygen, energy, heat }
}

#[test]
fn passive_tick_drains_and_heats() {
    let mut engine = active_engine(1);
    engine.advance(1_000);

    let r = engine.resources();
    assert!(approx(r.oxygen, 99.45), "oxygen after one tick: {}", r.oxygen);
    assert!(approx(r.energy, 99.92), "energy after one tick: {}", r.energy);
    assert!(approx(r.heat, 40.15), "heat after one tick: {}", r.heat);
}

#[test]
fn oxygen_floor_and_asphyxiation() {
    let mut engine = active_engine(2);
    engine.set_resources(levels(0.5, 100.0, 40.0));
    engine.advance(1_000);

    assert_eq!(engine.resources().oxygen, 0.0);
    assert_eq!(engine.phase(), Phase::Death);
    assert_eq!(engine.death_cause(), Some(DeathCause::Asphyxiation));
    assert_eq!(DeathCause::Asphyxiation.message(), "ASPHYXIATION: O2 DEPLETED");
}

#[test]
fn heat_clamps_to_ceiling_and_overheats() {
    let mut engine = active_engine(3);
    engine.set_resources(levels(80.0, 80.0, 99.9));
    engine.advance(1_000);

    assert_eq!(engine.resources().heat, 100.0);
    assert_eq!(engine.phase(), Phase::Death);
    assert_eq!(engine.death_cause(), Some(DeathCause::Overheat));
    assert_eq!(DeathCause::Overheat.message(), "CRITICAL OVERHEAT: HULL MELT");
}

#[test]
fn death_checks_are_ordered_oxygen_energy_heat() {
    let mut engine = active_engine(4);
    engine.set_resources(levels(0.5, 0.05, 99.9));
    engine.advance(1_000);
    assert_eq!(engine.death_cause(), Some(DeathCause::Asphyxiation));

    let mut engine = active_engine(5);
    engine.set_resources(levels(50.0, 0.05, 99.9));
    engine.advance(1_000);
    assert_eq!(engine.death_cause(), Some(DeathCause::PowerLoss));
    assert_eq!(DeathCause::PowerLoss.message(), "POWER LOSS: CORE EXHAUSTED");
}

#[test]
fn nothing_drains_before_active() {
    let mut engine = GameEngine::build_test(6).expect("build");
    engine.advance(ACTIVE_AT - 1);
    assert_eq!(engine.phase(), Phase::Boot);
    assert_eq!(engine.resources(), levels(100.0, 100.0, 40.0));
}

#[test]
fn move_costs_oxygen_and_vents_heat() {
    let mut engine = active_engine(7);
    engine.handle(PlayerIntent::Move { direction: Direction::Up });

    assert_eq!(engine.position().y, 9);
    let r = engine.resources();
    assert!(approx(r.oxygen, 99.2), "oxygen after move: {}", r.oxygen);
    assert!(approx(r.heat, 37.0), "heat after move: {}", r.heat);
    assert_eq!(engine.terminal().last().unwrap().message, "MOVE: [10, 9]");
}

#[test]
fn heat_never_vents_below_floor() {
    let mut engine = active_engine(8);
    for _ in 0..8 {
        engine.handle(PlayerIntent::Move { direction: Direction::Left });
    }
    assert_eq!(engine.resources().heat, 20.0);
}

#[test]
fn blocked_move_is_a_silent_no_op() {
    let mut engine = active_engine(9);
    for _ in 0..10 {
        engine.handle(PlayerIntent::Move { direction: Direction::Left });
    }
    assert_eq!(engine.position().x, 0);

    let before = engine.resources();
    let log_len = engine.terminal().len();
    let events = engine.handle(PlayerIntent::Move { direction: Direction::Left });

    assert!(events.is_empty(), "blocked move emitted {events:?}");
    assert_eq!(engine.resources(), before);
    assert_eq!(engine.terminal().len(), log_len);
}

#[test]
fn clamp_invariant_holds_through_long_session() {
    let mut config = GameConfig::default();
    // Park a rift on the start cell so hazard ticks run constantly.
    config.rifts.push(RiftConfig {
        id:     "test".into(),
        pos:    WorldPoint::new(10.0, 10.0),
        radius: 1.0,
    });
    let mut engine = GameEngine::build("clamp".into(), 10, config).expect("build");
    engine.advance(ACTIVE_AT);

    for _ in 0..2_000 {
        engine.advance(100);
        let r = engine.resources();
        assert!((0.0..=100.0).contains(&r.oxygen), "oxygen out of bounds: {}", r.oxygen);
        assert!((0.0..=100.0).contains(&r.energy), "energy out of bounds: {}", r.energy);
        assert!((20.0..=100.0).contains(&r.heat), "heat out of bounds: {}", r.heat);
        if engine.phase() == Phase::Death {
            break;
        }
    }
    assert_eq!(engine.phase(), Phase::Death, "standing in a rift should eventually kill");
}

#[test]
fn passive_and_rift_ticks_stack_additively() {
    let mut config = GameConfig::default_test();
    config.rifts.push(RiftConfig {
        id:     "under".into(),
        pos:    WorldPoint::new(10.0, 10.0),
        radius: 1.0,
    });
    let mut engine = GameEngine::build("stack".into(), 11, config).expect("build");
    engine.advance(ACTIVE_AT);
    engine.advance(1_000);

    // One passive tick plus ten hazard ticks.
    let r = engine.resources();
    assert!(approx(r.heat, 40.0 + 0.15 + 0.8 * 10.0), "heat: {}", r.heat);
    assert!(approx(r.energy, 100.0 - 0.08 - 0.3 * 10.0), "energy: {}", r.energy);
    assert!(engine.is_colliding());
}

#[test]
fn overlapping_rifts_apply_cumulatively() {
    let cfg = ResourceConfig::default();
    let mut r = levels(50.0, 50.0, 40.0);
    r.rift_exposure(2, &cfg);
    assert!(approx(r.heat, 41.6), "heat: {}", r.heat);
    assert!(approx(r.energy, 49.4), "energy: {}", r.energy);
}

#[test]
fn override_deltas() {
    let cfg = ResourceConfig::default();

    let mut r = levels(50.0, 50.0, 60.0);
    r.apply_override(MiniGameKind::Timing, true, &cfg);
    assert_eq!(r, levels(80.0, 50.0, 60.0));

    let mut r = levels(50.0, 50.0, 60.0);
    r.apply_override(MiniGameKind::Sequence, true, &cfg);
    assert_eq!(r, levels(50.0, 50.0, 30.0));

    let mut r = levels(90.0, 50.0, 40.0);
    r.apply_override(MiniGameKind::Sequence, true, &cfg);
    assert_eq!(r.heat, 20.0, "cooling respects the heat floor");

    let mut r = levels(50.0, 50.0, 60.0);
    r.apply_override(MiniGameKind::Timing, false, &cfg);
    assert_eq!(r, levels(30.0, 50.0, 85.0));

    // Failure never pushes oxygen under 5 or heat over 95.
    let mut r = levels(12.0, 50.0, 90.0);
    r.apply_override(MiniGameKind::Sequence, false, &cfg);
    assert_eq!(r, levels(5.0, 50.0, 95.0));
}
