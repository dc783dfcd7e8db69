//! Session clock. Owns virtual time and pause.
//!
//! Time only moves forward through `advance_to()`, and never while paused.
//! Pausing therefore freezes every scheduled timer at its remaining delay.

use crate::types::Millis;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClock {
    pub now_ms: Millis,
    pub paused: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self { now_ms: 0, paused: false }
    }

    /// Move the clock to `target`. Panics if called while paused or
    /// backwards. Callers must check.
    pub fn advance_to(&mut self, target: Millis) {
        assert!(!self.paused, "advance_to() called on paused clock");
        assert!(target >= self.now_ms, "clock cannot run backwards");
        self.now_ms = target;
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    /// Wall-style label for terminal entries, e.g. `00:01:07`.
    pub fn timestamp(&self) -> String {
        let secs = (self.now_ms / 1000) % 86_400;
        NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".into())
    }
}

impl Default for SessionClock {
    fn default() -> Self { Self::new() }
}
