use crate::types::Direction;
use serde::{Deserialize, Serialize};

/// Everything the rendering surface can ask of the core.
/// Intents that make no sense in the current phase are silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum PlayerIntent {
    // ── Navigation ────────────────────────────────
    Move { direction: Direction },
    Capture,
    AcknowledgePhoto,

    // ── Mini-games ────────────────────────────────
    TimingTrigger,
    SequenceInput { symbol: u8 },

    // ── Session control ───────────────────────────
    Pause,
    Resume,
    SetVolume { volume: f32 },
    Reset,
}
