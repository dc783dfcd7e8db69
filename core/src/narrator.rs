//! Text-generation collaborator.
//!
//! The engine never blocks on narration. It files a request, polls the
//! ticket on a timer, and gives up at a deadline. Every failure path
//! (error, empty reply, timeout) resolves to fixed fallback text, so a
//! capture always completes even if the narrator never answers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const DESCRIPTION_FALLBACK: &str =
    "ANALYSIS FAILED. DATA CORRUPTION DETECTED. OBJECT PERSISTS DESPITE THERMAL NULLIFICATION.";
pub const DESCRIPTION_MISSING: &str = "DATA_MISSING";

pub fn instruction_fallback(target_id: &str) -> String {
    format!("PROCEED TO SECTOR {target_id}. MINIMIZE OXYGEN EXPENDITURE. OBSERVATION IS MANDATORY.")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NarrationTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrationRequest {
    /// Clinical description of a captured anomaly.
    Describe { subject: String },
    /// Corporate order pointing the pilot at the next target.
    Instruction { target_id: String },
}

impl NarrationRequest {
    pub fn fallback(&self) -> String {
        match self {
            Self::Describe { .. } => DESCRIPTION_FALLBACK.to_string(),
            Self::Instruction { target_id } => instruction_fallback(target_id),
        }
    }

    /// Fail-open resolution of a narrator reply.
    pub fn resolve(&self, reply: Result<String, NarrationError>) -> String {
        match reply {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => match self {
                Self::Describe { .. } => DESCRIPTION_MISSING.to_string(),
                Self::Instruction { .. } => self.fallback(),
            },
            Err(e) => {
                log::warn!("narration failed ({e}); using fallback text");
                self.fallback()
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NarrationError {
    #[error("narrator unavailable: {0}")]
    Unavailable(String),

    #[error("narration request rejected: {0}")]
    Rejected(String),

    #[error("narration deadline passed")]
    Timeout,
}

/// The contract every text generator must fulfil.
pub trait Narrator: Send {
    /// File a request. Must return immediately.
    fn request(&mut self, request: NarrationRequest) -> NarrationTicket;

    /// `None` while the reply is still outstanding. A ticket yields
    /// `Some` at most once.
    fn poll(&mut self, ticket: NarrationTicket) -> Option<Result<String, NarrationError>>;

    /// Called when the engine stops waiting (deadline, death, reset).
    fn cancel(&mut self, _ticket: NarrationTicket) {}
}

/// Offline narrator with deterministic, immediately available replies.
#[derive(Debug, Default)]
pub struct CannedNarrator {
    next_ticket: u64,
    ready:       HashMap<NarrationTicket, String>,
}

impl CannedNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    fn describe(subject: &str) -> String {
        let openings = Self::openings();
        let findings = Self::findings();
        let seed = subject.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        format!(
            "{} {} {}",
            openings[seed % openings.len()],
            subject.to_uppercase(),
            findings[(seed / openings.len()) % findings.len()]
        )
    }

    fn instruct(target_id: &str) -> String {
        let orders = Self::orders();
        let idx = target_id.bytes().map(usize::from).sum::<usize>() % orders.len();
        format!("TARGET {target_id}. {}", orders[idx])
    }

    fn openings() -> &'static [&'static str] {
        &[
            "SPECIMEN LOGGED:",
            "INDEX ENTRY:",
            "CRYO-SCAN COMPLETE:",
            "LAYER SAMPLE:",
        ]
    }

    fn findings() -> &'static [&'static str] {
        &[
            "RETAINS MOTION AT ABSOLUTE ZERO. IT SHOULD NOT.",
            "EMITS A HEARTBEAT THROUGH 1KM OF ICE.",
            "GEOMETRY DOES NOT CLOSE. MEASUREMENTS DISAGREE WITH THEMSELVES.",
            "SURFACE CARRIES FINGERPRINTS MATCHING THE PILOT.",
        ]
    }

    fn orders() -> &'static [&'static str] {
        &[
            "HEAT SIGNATURE STABILITY IS YOUR ONLY METRIC.",
            "LAYER INTEGRITY MUST BE PRESERVED. PROCEED.",
            "THE ARCHIVE REQUIRES OBSERVATION. DO NOT LOOK AWAY.",
        ]
    }
}

impl Narrator for CannedNarrator {
    fn request(&mut self, request: NarrationRequest) -> NarrationTicket {
        let ticket = NarrationTicket(self.next_ticket);
        self.next_ticket += 1;
        let text = match &request {
            NarrationRequest::Describe { subject } => Self::describe(subject),
            NarrationRequest::Instruction { target_id } => Self::instruct(target_id),
        };
        self.ready.insert(ticket, text);
        ticket
    }

    fn poll(&mut self, ticket: NarrationTicket) -> Option<Result<String, NarrationError>> {
        self.ready.remove(&ticket).map(Ok)
    }

    fn cancel(&mut self, ticket: NarrationTicket) {
        self.ready.remove(&ticket);
    }
}
