//! Override mini-games.
//!
//! Each mechanic reports exactly one outcome and then goes deaf: every
//! later input returns nothing. Mechanics never touch resources; the
//! engine applies consequences when it receives the outcome.
//!
//! Neither mechanic owns a timer. The engine drives them from the
//! scheduler (`MarkerFrame`, `PlaybackStep`, `HighlightOff`,
//! `SequenceSettle`) and cancels those timers once an outcome is in.

use crate::{config::MiniGameConfig, rng::RandomSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MiniGameKind {
    /// O2 pump stall: stop the marker inside the window.
    Timing,
    /// Thermal overload: repeat the flashed sequence.
    Sequence,
}

impl MiniGameKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Timing   => "O2 PUMP STALL",
            Self::Sequence => "THERMAL OVERLOAD",
        }
    }
}

// ── Timing bar ─────────────────────────────────────────────

pub const BAR_MIN: f64 = 0.0;
pub const BAR_MAX: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct TimingMechanic {
    marker:      f64,
    rising:      bool,
    speed:       f64,
    window_low:  f64,
    window_high: f64,
    finished:    bool,
}

impl TimingMechanic {
    pub fn new(cfg: &MiniGameConfig) -> Self {
        Self::starting_at(cfg, BAR_MIN, true)
    }

    /// Start with the marker at a known spot. Used by replays and tests.
    pub fn starting_at(cfg: &MiniGameConfig, marker: f64, rising: bool) -> Self {
        Self {
            marker: marker.clamp(BAR_MIN, BAR_MAX),
            rising,
            speed: cfg.marker_speed,
            window_low: cfg.window_low,
            window_high: cfg.window_high,
            finished: false,
        }
    }

    /// One animation frame. Bounces off both ends of the bar.
    pub fn frame(&mut self) {
        if self.finished {
            return;
        }
        if self.rising {
            self.marker += self.speed;
            if self.marker >= BAR_MAX {
                self.marker = BAR_MAX;
                self.rising = false;
            }
        } else {
            self.marker -= self.speed;
            if self.marker <= BAR_MIN {
                self.marker = BAR_MIN;
                self.rising = true;
            }
        }
    }

    /// Player pressed the vent button. The window is open on both ends.
    pub fn trigger(&mut self) -> Option<bool> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(self.marker > self.window_low && self.marker < self.window_high)
    }

    pub fn marker(&self) -> f64 {
        self.marker
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

// ── Sequence memory ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    Listening,
    /// Full sequence matched; waiting out the settle delay.
    Settling,
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    Show(u8),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceInput {
    /// Input after the outcome was decided.
    Ignored,
    Accepted,
    /// Mismatch. Failure is reported immediately.
    Failed,
    /// Last symbol matched. Success follows after the settle delay.
    Settling,
}

#[derive(Debug, Clone)]
pub struct SequenceMechanic {
    sequence:      Vec<u8>,
    entered:       Vec<u8>,
    playback_pos:  usize,
    highlighted:   Option<u8>,
    alphabet_size: u8,
    state:         SequenceState,
}

impl SequenceMechanic {
    pub fn new(cfg: &MiniGameConfig, rng: &mut dyn RandomSource) -> Self {
        let sequence = (0..cfg.sequence_length)
            .map(|_| rng.next_below(u64::from(cfg.alphabet_size)) as u8)
            .collect();
        Self::from_sequence(sequence, cfg.alphabet_size)
    }

    pub fn from_sequence(sequence: Vec<u8>, alphabet_size: u8) -> Self {
        Self {
            sequence,
            entered: Vec::new(),
            playback_pos: 0,
            highlighted: None,
            alphabet_size,
            state: SequenceState::Listening,
        }
    }

    /// Flash the next symbol of the playback.
    pub fn playback_step(&mut self) -> PlaybackStep {
        match self.sequence.get(self.playback_pos) {
            Some(&symbol) => {
                self.playback_pos += 1;
                self.highlighted = Some(symbol);
                PlaybackStep::Show(symbol)
            }
            None => PlaybackStep::Done,
        }
    }

    pub fn highlight_off(&mut self) {
        self.highlighted = None;
    }

    /// Inputs during playback are validated like any other.
    pub fn input(&mut self, symbol: u8) -> SequenceInput {
        if self.state != SequenceState::Listening {
            return SequenceInput::Ignored;
        }
        let idx = self.entered.len();
        self.entered.push(symbol);

        if self.sequence.get(idx) != Some(&symbol) {
            self.state = SequenceState::Reported;
            return SequenceInput::Failed;
        }
        if self.entered.len() == self.sequence.len() {
            self.state = SequenceState::Settling;
            return SequenceInput::Settling;
        }
        SequenceInput::Accepted
    }

    /// Settle delay elapsed. Yields the success outcome once.
    pub fn settle(&mut self) -> Option<bool> {
        if self.state != SequenceState::Settling {
            return None;
        }
        self.state = SequenceState::Reported;
        Some(true)
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn entered(&self) -> &[u8] {
        &self.entered
    }

    pub fn highlighted(&self) -> Option<u8> {
        self.highlighted
    }

    pub fn alphabet_size(&self) -> u8 {
        self.alphabet_size
    }

    pub fn playback_done(&self) -> bool {
        self.playback_pos >= self.sequence.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequenceState::Reported
    }
}

/// The mechanic currently on screen.
#[derive(Debug, Clone)]
pub enum MiniGame {
    Timing(TimingMechanic),
    Sequence(SequenceMechanic),
}

impl MiniGame {
    pub fn kind(&self) -> MiniGameKind {
        match self {
            Self::Timing(_)   => MiniGameKind::Timing,
            Self::Sequence(_) => MiniGameKind::Sequence,
        }
    }
}
