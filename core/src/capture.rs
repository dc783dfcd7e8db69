//! Capture protocol: the timed, distance-gated interaction that turns the
//! current target into stored data.
//!
//! Stages: Idle → Collapsing (fixed delay) → AwaitingDescription → Idle.
//! `is_capturing()` is true from the moment a capture starts until it
//! resolves either way, and is the only guard against overlapping captures.

use crate::{anomaly::Anomaly, narrator::NarrationTicket, types::GridPos};

pub const MSG_COLLAPSING: &str = "COLLAPSING FIELD...";
pub const MSG_MISALIGNED: &str = "SIGNAL LOST: TARGET MISALIGNED";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureVerdict {
    /// Too far from the target. Range boundary is exclusive.
    Misaligned { distance: f64 },
    /// In range of the reserved final anomaly.
    Final,
    Acquired,
}

pub fn evaluate(player: GridPos, target: &Anomaly, range: f64) -> CaptureVerdict {
    let distance = player.distance_to(target.pos);
    if distance >= range {
        CaptureVerdict::Misaligned { distance }
    } else if target.is_final() {
        CaptureVerdict::Final
    } else {
        CaptureVerdict::Acquired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureStage {
    #[default]
    Idle,
    Collapsing,
    AwaitingDescription { ticket: NarrationTicket, anomaly_index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct CaptureProtocol {
    stage: CaptureStage,
}

impl CaptureProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> CaptureStage {
        self.stage
    }

    pub fn is_capturing(&self) -> bool {
        self.stage != CaptureStage::Idle
    }

    /// Returns false (and changes nothing) if a capture is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_capturing() {
            return false;
        }
        self.stage = CaptureStage::Collapsing;
        true
    }

    pub fn await_description(&mut self, ticket: NarrationTicket, anomaly_index: usize) {
        self.stage = CaptureStage::AwaitingDescription { ticket, anomaly_index };
    }

    /// The ticket this capture is waiting on, if any.
    pub fn pending_ticket(&self) -> Option<NarrationTicket> {
        match self.stage {
            CaptureStage::AwaitingDescription { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    pub fn finish(&mut self) {
        self.stage = CaptureStage::Idle;
    }
}
