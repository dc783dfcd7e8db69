//! Deterministic timer queue.
//!
//! RULE: Every delayed or periodic behaviour in the simulation is a timer
//! in this queue. Nothing keeps its own notion of elapsed time.
//!
//! Timers fire in (due time, kind priority, insertion order). Two timers
//! due at the same instant therefore always fire in the same order, which
//! is what makes a session reproducible from its seed and intents.
//!
//! Each timer kind belongs to a group. Leaving a phase cancels the groups
//! that phase owns, so no stale timer can mutate state afterwards.

use crate::{narrator::NarrationTicket, types::Millis};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerGroup {
    /// LORE and BOOT dwell.
    Intro,
    /// Passive drain, hazard scan and mini-game trigger.
    Play,
    Capture,
    MiniGame,
    Narration,
    /// Staged reveal after the final capture.
    Ending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    LoreDwell,
    BootDwell,
    Drain,
    Hazard,
    MiniGameTrigger,
    CaptureResolve,
    NarrationPoll,
    NarrationDeadline(NarrationTicket),
    MarkerFrame,
    PlaybackStep,
    HighlightOff,
    SequenceSettle,
    EndingStep,
}

impl TimerKind {
    pub fn group(&self) -> TimerGroup {
        match self {
            Self::LoreDwell | Self::BootDwell => TimerGroup::Intro,
            Self::Drain | Self::Hazard | Self::MiniGameTrigger => TimerGroup::Play,
            Self::CaptureResolve => TimerGroup::Capture,
            Self::NarrationPoll | Self::NarrationDeadline(_) => TimerGroup::Narration,
            Self::MarkerFrame
            | Self::PlaybackStep
            | Self::HighlightOff
            | Self::SequenceSettle => TimerGroup::MiniGame,
            Self::EndingStep => TimerGroup::Ending,
        }
    }

    /// Tie-break for timers due at the same instant. Passive drain always
    /// runs before the hazard scan.
    fn priority(&self) -> u8 {
        match self {
            Self::LoreDwell             => 0,
            Self::BootDwell             => 1,
            Self::Drain                 => 2,
            Self::Hazard                => 3,
            Self::MiniGameTrigger       => 4,
            Self::CaptureResolve        => 5,
            Self::NarrationPoll         => 6,
            Self::NarrationDeadline(_)  => 7,
            Self::MarkerFrame           => 8,
            Self::PlaybackStep          => 9,
            Self::HighlightOff          => 10,
            Self::SequenceSettle        => 11,
            Self::EndingStep            => 12,
        }
    }
}

#[derive(Debug, Clone)]
struct Timer {
    kind:   TimerKind,
    period: Option<Millis>,
}

type QueueKey = (Millis, u8, u64);

#[derive(Debug, Default)]
pub struct Scheduler {
    queue:    BTreeMap<QueueKey, Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` ms after `now`. Due times saturate at the end
    /// of virtual time.
    pub fn schedule_once(&mut self, now: Millis, delay: Millis, kind: TimerKind) {
        self.insert(now.saturating_add(delay), kind, None);
    }

    /// Fire every `period` ms, first at `now + period`.
    pub fn schedule_every(&mut self, now: Millis, period: Millis, kind: TimerKind) {
        assert!(period > 0, "repeating timer needs a non-zero period");
        self.insert(now.saturating_add(period), kind, Some(period));
    }

    fn insert(&mut self, due: Millis, kind: TimerKind, period: Option<Millis>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, kind.priority(), seq), Timer { kind, period });
    }

    /// Cancel every timer of `kind`. Returns how many were dropped.
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, t| t.kind != kind);
        before - self.queue.len()
    }

    /// Cancel every timer in `group`. Returns how many were dropped.
    pub fn cancel_group(&mut self, group: TimerGroup) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, t| t.kind.group() != group);
        before - self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.queue.values().any(|t| t.kind == kind)
    }

    pub fn has_group(&self, group: TimerGroup) -> bool {
        self.queue.values().any(|t| t.kind.group() == group)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the earliest timer due at or before `until`. Repeating timers
    /// are re-armed before being returned, so the handler may cancel them.
    /// A repeat that would land past the end of virtual time is dropped.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, TimerKind)> {
        let key = *self.queue.keys().next()?;
        if key.0 > until {
            return None;
        }
        let timer = self.queue.remove(&key)?;
        let (due, priority, seq) = key;
        if let Some(next) = timer.period.and_then(|period| due.checked_add(period)) {
            self.queue.insert((next, priority, seq), timer.clone());
        }
        Some((due, timer.kind))
    }
}
