use crate::{
    error::{GameError, GameResult},
    types::{GridPos, Millis, WorldPoint},
};
use serde::{Deserialize, Serialize};

/// Reserved id of the last anomaly. Capturing it ends the session.
pub const FINAL_ANOMALY_ID: &str = "FINAL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub initial_oxygen: f64,
    pub initial_energy: f64,
    pub initial_heat:   f64,
    /// Heat never drops below this (the probe's ambient floor).
    pub heat_floor:     f64,
    /// Shared ceiling for all three resources.
    pub ceiling:        f64,

    // Passive tick, once per `TimingConfig::drain_period_ms`.
    pub oxygen_drain: f64,
    pub energy_drain: f64,
    pub heat_gain:    f64,

    // Per accepted move. Moving vents heat.
    pub move_oxygen_cost: f64,
    pub move_heat_vent:   f64,

    // Successful capture.
    pub capture_oxygen_reward: f64,
    pub capture_energy_reward: f64,

    // Per colliding rift, per hazard tick.
    pub rift_heat_gain:    f64,
    pub rift_energy_drain: f64,

    // Mini-game consequences.
    pub timing_success_oxygen:   f64,
    pub sequence_success_cooling: f64,
    pub override_fail_oxygen:    f64,
    pub override_fail_oxygen_floor: f64,
    pub override_fail_heat:      f64,
    pub override_fail_heat_cap:  f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            initial_oxygen: 100.0,
            initial_energy: 100.0,
            initial_heat:   40.0,
            heat_floor:     20.0,
            ceiling:        100.0,
            oxygen_drain: 0.55,
            energy_drain: 0.08,
            heat_gain:    0.15,
            move_oxygen_cost: 0.8,
            move_heat_vent:   3.0,
            capture_oxygen_reward: 50.0,
            capture_energy_reward: 20.0,
            rift_heat_gain:    0.8,
            rift_energy_drain: 0.3,
            timing_success_oxygen:    30.0,
            sequence_success_cooling: 30.0,
            override_fail_oxygen:       20.0,
            override_fail_oxygen_floor: 5.0,
            override_fail_heat:         25.0,
            override_fail_heat_cap:     95.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lore_dwell_ms:        Millis,
    pub boot_dwell_ms:        Millis,
    pub drain_period_ms:      Millis,
    pub hazard_period_ms:     Millis,
    pub capture_delay_ms:     Millis,
    pub minigame_interval_ms: Millis,
    pub minigame_probability: f64,
    /// Upper bound on how long a narration request may stay unanswered.
    pub narration_deadline_ms: Millis,
    pub narration_poll_ms:     Millis,
    /// Offsets from entering ENDING at which each reveal step is shown.
    pub ending_steps_ms:       Vec<Millis>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lore_dwell_ms:        6_000,
            boot_dwell_ms:        1_500,
            drain_period_ms:      1_000,
            hazard_period_ms:     100,
            capture_delay_ms:     1_200,
            minigame_interval_ms: 10_000,
            minigame_probability: 0.28,
            narration_deadline_ms: 8_000,
            narration_poll_ms:     100,
            ending_steps_ms:       vec![5_000, 11_000, 18_000, 26_000],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniGameConfig {
    /// Marker travel per animation frame, in bar units (bar is 0..=100).
    pub marker_speed:    f64,
    pub frame_period_ms: Millis,
    /// Open interval the marker must be inside when triggered.
    pub window_low:      f64,
    pub window_high:     f64,
    pub sequence_length: usize,
    pub alphabet_size:   u8,
    pub playback_step_ms: Millis,
    pub highlight_ms:     Millis,
    pub settle_ms:        Millis,
}

impl Default for MiniGameConfig {
    fn default() -> Self {
        Self {
            marker_speed:    3.2,
            frame_period_ms: 16,
            window_low:      35.0,
            window_high:     65.0,
            sequence_length: 4,
            alphabet_size:   4,
            playback_step_ms: 800,
            highlight_ms:     400,
            settle_ms:        200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    pub id:   String,
    pub pos:  WorldPoint,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiftConfig {
    pub id:     String,
    pub pos:    WorldPoint,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_size:     i32,
    pub start:         GridPos,
    /// Capture succeeds strictly below this distance.
    pub capture_range: f64,
    pub log_capacity:  usize,
    pub volume:        f32,
    pub resources:     ResourceConfig,
    pub timing:        TimingConfig,
    pub minigame:      MiniGameConfig,
    pub anomalies:     Vec<AnomalyConfig>,
    pub rifts:         Vec<RiftConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let anomaly = |id: &str, x: f64, y: f64, name: &str| AnomalyConfig {
            id:   id.into(),
            pos:  WorldPoint::new(x, y),
            name: name.into(),
        };
        let rift = |id: &str, x: f64, y: f64, radius: f64| RiftConfig {
            id: id.into(),
            pos: WorldPoint::new(x, y),
            radius,
        };

        Self {
            grid_size:     20,
            start:         GridPos::new(10, 10),
            capture_range: 1.5,
            log_capacity:  15,
            volume:        0.5,
            resources:     ResourceConfig::default(),
            timing:        TimingConfig::default(),
            minigame:      MiniGameConfig::default(),
            anomalies: vec![
                anomaly("1", 5.0, 15.0, "Structure Alpha"),
                anomaly("2", 14.0, 4.0, "Pattern Gamma"),
                anomaly("3", 2.0, 8.0, "Echo Omega"),
                anomaly(FINAL_ANOMALY_ID, 10.0, 10.0, "The Origin"),
            ],
            rifts: vec![
                rift("1", 8.0, 13.0, 1.5),
                rift("2", 12.0, 7.0, 1.8),
                rift("3", 4.0, 5.0, 1.2),
            ],
        }
    }
}

impl GameConfig {
    /// Load a session config from a JSON file. Missing fields fall back
    /// to the defaults.
    pub fn load(path: &str) -> GameResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with the stock survey but no rifts, for tests that need
    /// resource arithmetic without hazard noise.
    pub fn default_test() -> Self {
        Self { rifts: Vec::new(), ..Self::default() }
    }

    pub fn validate(&self) -> GameResult<()> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.grid_size <= 0 {
            return invalid(format!("grid_size must be positive, got {}", self.grid_size));
        }
        if !self.start.in_bounds(self.grid_size) {
            return invalid(format!("start {:?} lies outside the grid", self.start));
        }
        match self.anomalies.last() {
            None => return invalid("survey has no anomalies".into()),
            Some(last) if last.id != FINAL_ANOMALY_ID => {
                return invalid(format!(
                    "last anomaly must be '{FINAL_ANOMALY_ID}', got '{}'",
                    last.id
                ));
            }
            Some(_) => {}
        }
        let max = f64::from(self.grid_size - 1);
        for a in &self.anomalies {
            if !(0.0..=max).contains(&a.pos.x) || !(0.0..=max).contains(&a.pos.y) {
                return invalid(format!("anomaly '{}' lies outside the grid", a.id));
            }
        }
        for r in &self.rifts {
            if r.radius <= 0.0 || !r.radius.is_finite() {
                return invalid(format!("rift '{}' has non-positive radius {}", r.id, r.radius));
            }
        }
        let res = &self.resources;
        if !res.ceiling.is_finite() || !res.heat_floor.is_finite() {
            return invalid(format!(
                "resource bounds must be finite, got floor {} and ceiling {}",
                res.heat_floor, res.ceiling
            ));
        }
        if res.ceiling <= 0.0 {
            return invalid(format!("resource ceiling must be positive, got {}", res.ceiling));
        }
        if res.heat_floor < 0.0 {
            return invalid(format!("heat floor must not be negative, got {}", res.heat_floor));
        }
        if res.heat_floor >= res.ceiling {
            return invalid(format!(
                "heat floor {} must sit below ceiling {}",
                res.heat_floor, res.ceiling
            ));
        }
        let mg = &self.minigame;
        if mg.window_low >= mg.window_high {
            return invalid("timing window is empty".into());
        }
        if mg.sequence_length == 0 || mg.alphabet_size == 0 {
            return invalid("sequence mechanic needs a non-empty sequence and alphabet".into());
        }
        let periods = [
            self.timing.drain_period_ms,
            self.timing.hazard_period_ms,
            self.timing.minigame_interval_ms,
            self.timing.narration_poll_ms,
            mg.frame_period_ms,
            mg.playback_step_ms,
        ];
        if periods.contains(&0) {
            return invalid("repeating timer periods must be non-zero".into());
        }
        if self.timing.ending_steps_ms.len() > usize::from(u8::MAX) {
            return invalid("too many ending steps".into());
        }
        Ok(())
    }
}
