//! Override mini-game tests.
//!
//! Tests cover: timing window boundaries and bouncing, sequence success
//! after the settle delay, immediate failure on a wrong symbol, single
//! outcome reporting, and engine-level spawning with a scripted RNG.

use thermos_core::{
    audio::SilentAudio,
    config::{GameConfig, MiniGameConfig},
    engine::{GameEngine, MSG_OVERRIDE_FAILED, MSG_OVERRIDE_OK},
    event::GameEvent,
    intent::PlayerIntent,
    minigame::{MiniGame, MiniGameKind, PlaybackStep, SequenceInput, SequenceMechanic, TimingMechanic},
    narrator::CannedNarrator,
    phase::Phase,
    resources::Resources,
    rng::{RandomSource, SeededRng},
    scheduler::TimerGroup,
    snapshot::MiniGameView,
};

const ACTIVE_AT: u64 = 7_500;
const FIRST_ROLL: u64 = 10_000;

/// Replays a fixed list of rolls, wrapping around at the end.
struct ScriptedRng {
    rolls: Vec<f64>,
    next:  usize,
}

impl ScriptedRng {
    fn new(rolls: &[f64]) -> Self {
        Self { rolls: rolls.to_vec(), next: 0 }
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        roll
    }
}

/// Engine sitting in MINIGAME right after the first trigger roll.
fn spawned(rolls: &[f64]) -> GameEngine {
    let mut engine = GameEngine::new(
        "minigame".into(),
        GameConfig::default_test(),
        Box::new(ScriptedRng::new(rolls)),
        Box::new(CannedNarrator::new()),
        Box::new(SilentAudio),
    )
    .expect("build");
    engine.advance(ACTIVE_AT + FIRST_ROLL);
    assert_eq!(engine.phase(), Phase::MiniGame);
    engine
}

/// Trigger, then Timing.
const TIMING: &[f64] = &[0.0];
/// Trigger, then Sequence, then symbols 0, 1, 2, 3.
const SEQUENCE: &[f64] = &[0.0, 0.9, 0.0, 0.25, 0.5, 0.75];

// ── Mechanics ──────────────────────────────────────────────

#[test]
fn timing_window_is_open_on_both_ends() {
    let cfg = MiniGameConfig::default();
    let cases = [(50.0, true), (35.1, true), (64.9, true), (20.0, false), (35.0, false), (65.0, false)];
    for (marker, expected) in cases {
        let mut m = TimingMechanic::starting_at(&cfg, marker, true);
        assert_eq!(m.trigger(), Some(expected), "marker at {marker}");
    }
}

#[test]
fn timing_reports_once() {
    let cfg = MiniGameConfig::default();
    let mut m = TimingMechanic::starting_at(&cfg, 50.0, true);
    assert_eq!(m.trigger(), Some(true));
    assert_eq!(m.trigger(), None);
    assert!(m.is_finished());

    // A finished marker stops moving.
    m.frame();
    assert_eq!(m.marker(), 50.0);
}

#[test]
fn timing_marker_bounces_off_both_ends() {
    let cfg = MiniGameConfig::default();
    let mut m = TimingMechanic::starting_at(&cfg, 98.0, true);
    m.frame();
    assert_eq!(m.marker(), 100.0);
    m.frame();
    assert!((m.marker() - 96.8).abs() < 1e-9, "marker {}", m.marker());

    let mut m = TimingMechanic::starting_at(&cfg, 1.0, false);
    m.frame();
    assert_eq!(m.marker(), 0.0);
    m.frame();
    assert!((m.marker() - 3.2).abs() < 1e-9, "marker {}", m.marker());
}

#[test]
fn sequence_success_waits_for_settle() {
    let mut m = SequenceMechanic::from_sequence(vec![0, 1, 2, 3], 4);
    assert_eq!(m.input(0), SequenceInput::Accepted);
    assert_eq!(m.input(1), SequenceInput::Accepted);
    assert_eq!(m.input(2), SequenceInput::Accepted);
    assert_eq!(m.input(3), SequenceInput::Settling);

    // Input is locked while settling.
    assert_eq!(m.input(0), SequenceInput::Ignored);
    assert!(!m.is_finished());

    assert_eq!(m.settle(), Some(true));
    assert_eq!(m.settle(), None);
    assert!(m.is_finished());
}

#[test]
fn sequence_mismatch_fails_immediately() {
    let mut m = SequenceMechanic::from_sequence(vec![0, 1, 2, 3], 4);
    assert_eq!(m.input(0), SequenceInput::Accepted);
    assert_eq!(m.input(3), SequenceInput::Failed);
    assert!(m.is_finished());

    assert_eq!(m.input(2), SequenceInput::Ignored);
    assert_eq!(m.settle(), None);
    assert_eq!(m.entered(), &[0, 3]);
}

#[test]
fn sequence_playback_walks_the_sequence() {
    let mut m = SequenceMechanic::from_sequence(vec![2, 0, 3], 4);
    assert_eq!(m.playback_step(), PlaybackStep::Show(2));
    assert_eq!(m.highlighted(), Some(2));
    m.highlight_off();
    assert_eq!(m.highlighted(), None);
    assert_eq!(m.playback_step(), PlaybackStep::Show(0));
    assert_eq!(m.playback_step(), PlaybackStep::Show(3));
    assert!(m.playback_done());
    assert_eq!(m.playback_step(), PlaybackStep::Done);
}

#[test]
fn generated_sequence_stays_in_alphabet() {
    let cfg = MiniGameConfig::default();
    let mut rng = SeededRng::new(99);
    for _ in 0..50 {
        let m = SequenceMechanic::new(&cfg, &mut rng);
        assert_eq!(m.sequence().len(), cfg.sequence_length);
        assert!(m.sequence().iter().all(|&s| s < cfg.alphabet_size));
    }
}

// ── Engine integration ─────────────────────────────────────

#[test]
fn timing_override_success_restores_oxygen() {
    let mut engine = spawned(TIMING);
    assert_eq!(engine.minigame().map(MiniGame::kind), Some(MiniGameKind::Timing));
    assert_eq!(engine.terminal().last().unwrap().message, "OVERRIDE REQUIRED: O2 PUMP STALL");

    engine.set_resources(Resources { oxygen: 50.0, energy: 80.0, heat: 50.0 });
    // Fifteen 16 ms frames put the marker at 48.
    engine.advance(15 * 16);
    match engine.snapshot().minigame {
        Some(MiniGameView::Timing { marker, .. }) => assert!((marker - 48.0).abs() < 1e-6, "marker {marker}"),
        other => panic!("expected timing view, got {other:?}"),
    }

    let events = engine.handle(PlayerIntent::TimingTrigger);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::MiniGameResolved { kind: MiniGameKind::Timing, success: true, .. }
    )));
    assert_eq!(engine.phase(), Phase::Active);
    assert!(engine.minigame().is_none());
    assert_eq!(engine.resources().oxygen, 80.0);
    assert!(engine.terminal().entries().any(|e| e.message == MSG_OVERRIDE_OK));
    assert!(!engine.scheduler().has_group(TimerGroup::MiniGame));
}

#[test]
fn timing_override_failure_costs_oxygen_and_heat() {
    let mut engine = spawned(TIMING);
    engine.set_resources(Resources { oxygen: 50.0, energy: 80.0, heat: 60.0 });

    // Marker still at 0.
    engine.handle(PlayerIntent::TimingTrigger);
    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(engine.resources(), Resources { oxygen: 30.0, energy: 80.0, heat: 85.0 });
    assert_eq!(engine.terminal().last().unwrap().message, MSG_OVERRIDE_FAILED);
}

#[test]
fn sequence_override_success_after_settle() {
    let mut engine = spawned(SEQUENCE);
    assert_eq!(engine.minigame().map(MiniGame::kind), Some(MiniGameKind::Sequence));
    engine.set_resources(Resources { oxygen: 60.0, energy: 80.0, heat: 80.0 });

    for symbol in 0..4 {
        engine.handle(PlayerIntent::SequenceInput { symbol });
    }
    assert_eq!(engine.phase(), Phase::MiniGame, "outcome waits for the settle delay");

    engine.advance(199);
    assert_eq!(engine.phase(), Phase::MiniGame);
    let events = engine.advance(1);
    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(engine.resources().heat, 50.0);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::MiniGameResolved { .. }))
            .count(),
        1
    );
}

#[test]
fn sequence_wrong_symbol_fails_at_once_and_ignores_the_rest() {
    let mut engine = spawned(SEQUENCE);
    engine.set_resources(Resources { oxygen: 50.0, energy: 80.0, heat: 60.0 });

    engine.handle(PlayerIntent::SequenceInput { symbol: 0 });
    let events = engine.handle(PlayerIntent::SequenceInput { symbol: 3 });
    assert!(events.iter().any(|e| matches!(e, GameEvent::MiniGameResolved { success: false, .. })));
    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(engine.resources(), Resources { oxygen: 30.0, energy: 80.0, heat: 85.0 });

    assert!(engine.handle(PlayerIntent::SequenceInput { symbol: 2 }).is_empty());
}

#[test]
fn sequence_playback_highlights_on_schedule() {
    let mut engine = spawned(SEQUENCE);

    engine.advance(800);
    match engine.snapshot().minigame {
        Some(MiniGameView::Sequence { highlighted, length, .. }) => {
            assert_eq!(highlighted, Some(0));
            assert_eq!(length, 4);
        }
        other => panic!("expected sequence view, got {other:?}"),
    }

    engine.advance(400);
    match engine.snapshot().minigame {
        Some(MiniGameView::Sequence { highlighted, playback_done, .. }) => {
            assert_eq!(highlighted, None);
            assert!(!playback_done);
        }
        other => panic!("expected sequence view, got {other:?}"),
    }
}

#[test]
fn no_new_roll_while_a_minigame_is_open() {
    let mut engine = spawned(TIMING);
    let events = engine.advance(3 * FIRST_ROLL);
    assert_eq!(engine.phase(), Phase::MiniGame);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::MiniGameSpawned { .. })));
}

#[test]
fn trigger_interval_restarts_on_return_to_active() {
    let mut engine = spawned(TIMING);
    engine.advance(240);
    engine.handle(PlayerIntent::TimingTrigger);
    assert_eq!(engine.phase(), Phase::Active);

    engine.advance(FIRST_ROLL - 1);
    assert_eq!(engine.phase(), Phase::Active);
    engine.advance(1);
    assert_eq!(engine.phase(), Phase::MiniGame);
}

#[test]
fn failed_roll_stays_in_active() {
    let mut engine = GameEngine::new(
        "quiet".into(),
        GameConfig::default_test(),
        Box::new(ScriptedRng::new(&[0.99])),
        Box::new(CannedNarrator::new()),
        Box::new(SilentAudio),
    )
    .expect("build");
    engine.advance(ACTIVE_AT + 5 * FIRST_ROLL);
    assert_eq!(engine.phase(), Phase::Active);
}

#[test]
fn death_mid_override_tears_the_minigame_down() {
    let mut engine = spawned(TIMING);
    engine.set_resources(Resources { oxygen: 0.3, energy: 80.0, heat: 50.0 });
    engine.advance(1_000);

    assert_eq!(engine.phase(), Phase::Death);
    assert!(engine.minigame().is_none());
    assert!(engine.scheduler().is_empty());
    assert!(engine.handle(PlayerIntent::TimingTrigger).is_empty());
}
