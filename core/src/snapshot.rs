//! Snapshot serialization: the read-only view handed to the renderer.
//!
//! A snapshot is cheap to build and carries everything a surface needs to
//! draw one frame. It is never read back into an engine.

use crate::{
    anomaly::Anomaly,
    error::GameResult,
    phase::Phase,
    resources::Resources,
    rift::Rift,
    terminal::LogEntry,
    types::{EntityId, GridPos, Millis, SessionId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub anomaly_id:  EntityId,
    pub name:        String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MiniGameView {
    Timing {
        marker:      f64,
        window_low:  f64,
        window_high: f64,
    },
    Sequence {
        highlighted:   Option<u8>,
        entered:       usize,
        length:        usize,
        alphabet_size: u8,
        playback_done: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id:   SessionId,
    pub now_ms:       Millis,
    pub phase:        Phase,
    pub paused_from:  Option<Phase>,
    pub position:     GridPos,
    pub resources:    Resources,
    pub death_cause:  Option<String>,
    pub target_index: usize,
    pub capturing:    bool,
    pub colliding:    bool,
    pub volume:       f32,
    pub anomalies:    Vec<Anomaly>,
    pub rifts:        Vec<Rift>,
    pub logs:         Vec<LogEntry>,
    pub minigame:     Option<MiniGameView>,
    pub photo:        Option<PhotoRecord>,
    /// Reveal steps shown so far while in ENDING.
    pub ending_step:  u8,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
