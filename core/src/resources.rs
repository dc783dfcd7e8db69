//! Resource model: oxygen, energy and heat.
//!
//! Every mutation ends in `clamp()`, so no observer can see a value
//! outside its bounds: oxygen and energy in [0, ceiling], heat in
//! [heat_floor, ceiling].

use crate::{config::ResourceConfig, minigame::MiniGameKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub oxygen: f64,
    pub energy: f64,
    pub heat:   f64,
}

impl Resources {
    pub fn initial(cfg: &ResourceConfig) -> Self {
        Self {
            oxygen: cfg.initial_oxygen,
            energy: cfg.initial_energy,
            heat:   cfg.initial_heat,
        }
        .clamped(cfg)
    }

    pub fn clamped(mut self, cfg: &ResourceConfig) -> Self {
        self.clamp(cfg);
        self
    }

    fn clamp(&mut self, cfg: &ResourceConfig) {
        self.oxygen = self.oxygen.clamp(0.0, cfg.ceiling);
        self.energy = self.energy.clamp(0.0, cfg.ceiling);
        self.heat   = self.heat.clamp(cfg.heat_floor, cfg.ceiling);
    }

    /// Once-per-second life support drain.
    pub fn passive_tick(&mut self, cfg: &ResourceConfig) {
        self.oxygen -= cfg.oxygen_drain;
        self.energy -= cfg.energy_drain;
        self.heat   += cfg.heat_gain;
        self.clamp(cfg);
    }

    /// Cost of one accepted move.
    pub fn move_cost(&mut self, cfg: &ResourceConfig) {
        self.oxygen -= cfg.move_oxygen_cost;
        self.heat   -= cfg.move_heat_vent;
        self.clamp(cfg);
    }

    pub fn capture_reward(&mut self, cfg: &ResourceConfig) {
        self.oxygen += cfg.capture_oxygen_reward;
        self.energy += cfg.capture_energy_reward;
        self.clamp(cfg);
    }

    /// One hazard tick inside `colliding` rifts at once.
    pub fn rift_exposure(&mut self, colliding: usize, cfg: &ResourceConfig) {
        if colliding == 0 {
            return;
        }
        let n = colliding as f64;
        self.heat   += cfg.rift_heat_gain * n;
        self.energy -= cfg.rift_energy_drain * n;
        self.clamp(cfg);
    }

    /// Consequences of a resolved mini-game.
    pub fn apply_override(&mut self, kind: MiniGameKind, success: bool, cfg: &ResourceConfig) {
        match (kind, success) {
            (MiniGameKind::Timing, true)   => self.oxygen += cfg.timing_success_oxygen,
            (MiniGameKind::Sequence, true) => self.heat   -= cfg.sequence_success_cooling,
            (_, false) => {
                self.oxygen = (self.oxygen - cfg.override_fail_oxygen)
                    .max(cfg.override_fail_oxygen_floor);
                self.heat = (self.heat + cfg.override_fail_heat).min(cfg.override_fail_heat_cap);
            }
        }
        self.clamp(cfg);
    }

    /// Ordered death check: oxygen, then energy, then heat.
    pub fn death_cause(&self, cfg: &ResourceConfig) -> Option<DeathCause> {
        if self.oxygen <= 0.0 {
            Some(DeathCause::Asphyxiation)
        } else if self.energy <= 0.0 {
            Some(DeathCause::PowerLoss)
        } else if self.heat >= cfg.ceiling {
            Some(DeathCause::Overheat)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Asphyxiation,
    PowerLoss,
    Overheat,
}

impl DeathCause {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Asphyxiation => "ASPHYXIATION: O2 DEPLETED",
            Self::PowerLoss    => "POWER LOSS: CORE EXHAUSTED",
            Self::Overheat     => "CRITICAL OVERHEAT: HULL MELT",
        }
    }
}
