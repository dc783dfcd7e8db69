//! Events returned from every engine step.
//!
//! The engine is the only producer. Hosts use the stream for audio-less
//! feedback, replay comparison and the runner's summaries.

use crate::{
    minigame::MiniGameKind,
    phase::Phase,
    resources::DeathCause,
    types::{EntityId, GridPos, Millis},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        at:   Millis,
        from: Phase,
        to:   Phase,
    },
    Moved {
        at: Millis,
        to: GridPos,
    },

    // ── Capture ───────────────────────────────────
    CaptureStarted {
        at:        Millis,
        target_id: EntityId,
    },
    CaptureMissed {
        at:       Millis,
        distance: f64,
    },
    AnomalyCaptured {
        at:          Millis,
        anomaly_id:  EntityId,
        description: String,
    },
    FinalReached {
        at: Millis,
    },
    EndingAdvanced {
        at:   Millis,
        step: u8,
    },

    // ── Mini-games ────────────────────────────────
    MiniGameSpawned {
        at:   Millis,
        kind: MiniGameKind,
    },
    MiniGameResolved {
        at:      Millis,
        kind:    MiniGameKind,
        success: bool,
    },

    // ── Hazards and death ─────────────────────────
    RiftContact {
        at:        Millis,
        colliding: bool,
    },
    Died {
        at:    Millis,
        cause: DeathCause,
    },

    SessionReset {
        at: Millis,
    },
}
