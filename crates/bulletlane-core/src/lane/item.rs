use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pause::{PauseState, PauseStatus};
use crate::motion::PlayState;

/// Process-unique identifier of a placed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle phase of a placed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPhase {
    /// Placed on a lane, motion not yet reported as started
    #[default]
    Entering,
    Active,
    Finished,
}

/// An item currently occupying a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveItem {
    pub id: ItemId,
    pub content: String,
    /// Measured width in pixels
    pub width: f64,
    /// Time to cross the viewport, in seconds
    pub duration: f64,
    pub lane: usize,
    pub phase: ItemPhase,
    pub pause: PauseState,
}

impl ActiveItem {
    pub fn new(content: String, width: f64, duration: f64, lane: usize) -> Self {
        Self {
            id: ItemId::new(),
            content,
            width,
            duration,
            lane,
            phase: ItemPhase::Entering,
            pause: PauseState::default(),
        }
    }

    /// Constant velocity over the full travel (viewport width plus own width)
    pub fn velocity(&self, viewport_width: f64) -> f64 {
        velocity(viewport_width, self.width, self.duration)
    }

    pub fn paused_by_user(&self) -> bool {
        self.pause.paused_by_user()
    }

    pub fn paused_by_hover(&self) -> bool {
        self.pause.paused_by_hover()
    }

    pub fn pause_status(&self) -> PauseStatus {
        self.pause.status()
    }

    pub fn play_state(&self) -> PlayState {
        self.pause.play_state()
    }
}

/// Velocity of an item that travels `viewport_width + width` pixels in `duration` seconds
#[inline]
pub fn velocity(viewport_width: f64, width: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return f64::INFINITY;
    }
    (viewport_width + width) / duration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn test_id_parses_back() {
        let id = ItemId::new();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_velocity() {
        let item = ActiveItem::new("x".into(), 100.0, 10.0, 0);
        assert_eq!(item.velocity(1000.0), 110.0);
        assert_eq!(item.phase, ItemPhase::Entering);
        assert!(!item.paused_by_user());
    }
}
