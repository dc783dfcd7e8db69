//! Anomalies and the ordered survey the player works through.

use crate::{
    config::{AnomalyConfig, FINAL_ANOMALY_ID},
    types::{EntityId, WorldPoint},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id:          EntityId,
    pub pos:         WorldPoint,
    pub name:        String,
    /// Monotonic: false → true exactly once per session.
    pub found:       bool,
    pub description: String,
}

impl Anomaly {
    pub fn is_final(&self) -> bool {
        self.id == FINAL_ANOMALY_ID
    }
}

/// The anomaly sequence plus the pointer to the current target.
#[derive(Debug, Clone)]
pub struct Survey {
    anomalies:  Vec<Anomaly>,
    target_idx: usize,
}

impl Survey {
    pub fn from_config(configs: &[AnomalyConfig]) -> Self {
        Self {
            anomalies: configs
                .iter()
                .map(|c| Anomaly {
                    id:          c.id.clone(),
                    pos:         c.pos,
                    name:        c.name.clone(),
                    found:       false,
                    description: String::new(),
                })
                .collect(),
            target_idx: 0,
        }
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn target_index(&self) -> usize {
        self.target_idx
    }

    pub fn target(&self) -> Option<&Anomaly> {
        self.anomalies.get(self.target_idx)
    }

    /// Store the description, flip `found` and move to the next target.
    /// Returns false if the current target was already found or missing.
    pub fn record_capture(&mut self, description: String) -> bool {
        match self.anomalies.get_mut(self.target_idx) {
            Some(a) if !a.found => {
                a.found = true;
                a.description = description;
                self.target_idx += 1;
                true
            }
            _ => false,
        }
    }

    pub fn found_count(&self) -> usize {
        self.anomalies.iter().filter(|a| a.found).count()
    }

    pub fn reset(&mut self) {
        for a in &mut self.anomalies {
            a.found = false;
            a.description.clear();
        }
        self.target_idx = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn capture_advances_exactly_one_target() {
        let mut survey = Survey::from_config(&GameConfig::default().anomalies);
        assert!(survey.record_capture("cold".into()));
        assert_eq!(survey.target_index(), 1);
        assert_eq!(survey.found_count(), 1);
        assert_eq!(survey.anomalies()[0].description, "cold");
        assert!(!survey.anomalies()[1].found);
    }

    #[test]
    fn reset_clears_progress() {
        let mut survey = Survey::from_config(&GameConfig::default().anomalies);
        survey.record_capture("a".into());
        survey.record_capture("b".into());
        survey.reset();
        assert_eq!(survey.target_index(), 0);
        assert_eq!(survey.found_count(), 0);
        assert!(survey.anomalies().iter().all(|a| a.description.is_empty()));
    }
}
