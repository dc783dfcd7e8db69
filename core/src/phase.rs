//! Session phases and the legal-transition table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lore,
    Boot,
    Active,
    MiniGame,
    PhotoView,
    Ending,
    Death,
    Paused,
}

impl Phase {
    /// Phases in which life support drains and rifts bite.
    pub fn is_in_play(&self) -> bool {
        matches!(self, Self::Active | Self::MiniGame)
    }

    /// Only `reset` leaves these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ending | Self::Death)
    }

    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Active | Self::MiniGame | Self::PhotoView)
    }

    /// Whether the state machine admits `self → to`. `reset` is handled
    /// separately and may leave any phase.
    pub fn can_transition(&self, to: Phase) -> bool {
        use Phase::*;
        match (self, to) {
            (Lore, Boot) | (Boot, Active) => true,
            (Active, MiniGame) | (MiniGame, Active) => true,
            (Active, PhotoView) | (PhotoView, Active) => true,
            (Active, Ending) => true,
            (Active, Death) | (MiniGame, Death) => true,
            (from, Paused) => from.can_pause(),
            (Paused, to) => to.can_pause(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases_have_no_exits() {
        for to in [Phase::Lore, Phase::Boot, Phase::Active, Phase::Paused] {
            assert!(!Phase::Death.can_transition(to));
            assert!(!Phase::Ending.can_transition(to));
        }
    }

    #[test]
    fn photo_view_cannot_die() {
        assert!(!Phase::PhotoView.can_transition(Phase::Death));
        assert!(Phase::MiniGame.can_transition(Phase::Death));
    }
}
