//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// Virtual session time in milliseconds. Only advances while unpaused.
pub type Millis = u64;

/// A stable identifier for anomalies and rifts.
pub type EntityId = String;

/// The canonical session identifier.
pub type SessionId = String;

/// A cell on the navigation grid. Each axis is bounded `[0, grid_size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to a world point.
    pub fn distance_to(&self, point: WorldPoint) -> f64 {
        let dx = f64::from(self.x) - point.x;
        let dy = f64::from(self.y) - point.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn in_bounds(&self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }
}

/// A fixed position in world coordinates (anomalies and rift centres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid delta. Up is towards y = 0.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up    => ( 0, -1),
            Self::Down  => ( 0,  1),
            Self::Left  => (-1,  0),
            Self::Right => ( 1,  0),
        }
    }
}
