//! Audio collaborator. Fire-and-forget: a failing sink is logged and
//! otherwise ignored, never allowed to touch game state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Click,
    Move,
    Capture,
    Warning,
    Death,
}

impl Cue {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Click   => "click",
            Self::Move    => "move",
            Self::Capture => "capture",
            Self::Warning => "warning",
            Self::Death   => "death",
        }
    }
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("playback blocked: {0}")]
    Blocked(String),

    #[error("audio device unavailable")]
    Unavailable,
}

pub trait AudioSink: Send {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
    /// `volume` is already clamped to [0, 1].
    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError>;
    fn start_music(&mut self) -> Result<(), AudioError>;
    fn stop_music(&mut self) -> Result<(), AudioError>;
}

/// Headless sink. Accepts everything, plays nothing.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> { Ok(()) }
    fn set_volume(&mut self, _volume: f32) -> Result<(), AudioError> { Ok(()) }
    fn start_music(&mut self) -> Result<(), AudioError> { Ok(()) }
    fn stop_music(&mut self) -> Result<(), AudioError> { Ok(()) }
}
