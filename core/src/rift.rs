//! Rift hazard field.
//!
//! Static circular zones. Collision is strict (`distance < radius`) and
//! recomputed from scratch every hazard tick; there is no hysteresis.

use crate::{
    config::RiftConfig,
    types::{EntityId, GridPos, WorldPoint},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rift {
    pub id:     EntityId,
    pub pos:    WorldPoint,
    pub radius: f64,
}

impl Rift {
    pub fn contains(&self, player: GridPos) -> bool {
        player.distance_to(self.pos) < self.radius
    }
}

/// Result of one hazard scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiftScan {
    pub colliding: Vec<EntityId>,
}

impl RiftScan {
    pub fn any(&self) -> bool {
        !self.colliding.is_empty()
    }

    pub fn count(&self) -> usize {
        self.colliding.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiftField {
    rifts: Vec<Rift>,
}

impl RiftField {
    pub fn new(rifts: Vec<Rift>) -> Self {
        Self { rifts }
    }

    pub fn from_config(configs: &[RiftConfig]) -> Self {
        Self::new(
            configs
                .iter()
                .map(|c| Rift { id: c.id.clone(), pos: c.pos, radius: c.radius })
                .collect(),
        )
    }

    pub fn rifts(&self) -> &[Rift] {
        &self.rifts
    }

    pub fn scan(&self, player: GridPos) -> RiftScan {
        RiftScan {
            colliding: self
                .rifts
                .iter()
                .filter(|r| r.contains(player))
                .map(|r| r.id.clone())
                .collect(),
        }
    }
}
