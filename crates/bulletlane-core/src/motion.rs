//! Continuous motion collaborator.
//!
//! The scheduler only configures motion (start offset, duration, play state)
//! and observes its lifecycle signals. Per-frame positions belong to the engine.

use serde::{Deserialize, Serialize};

use crate::geometry::{ContentMeasure, GeometryProvider};
use crate::lane::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Running,
    Paused,
}

/// Lifecycle signals emitted by a motion engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionSignal {
    Started(ItemId),
    Finished(ItemId),
}

/// How an item should move once mounted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    /// Start position relative to the viewport's left edge (negative: outside it)
    pub from_offset: f64,
    /// Horizontal distance covered over the whole motion
    pub distance: f64,
    /// Lane top relative to the viewport
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub duration_secs: f64,
}

pub trait MotionEngine {
    /// Begin moving an item at constant velocity according to `plan`
    fn start(&mut self, id: &ItemId, plan: &MotionPlan);

    fn set_play_state(&mut self, id: &ItemId, state: PlayState);

    /// Cancel motion without emitting a finish signal
    fn stop(&mut self, id: &ItemId);

    /// Drop presentation state tied to ongoing motion so the item can be disposed
    fn release(&mut self, id: &ItemId);
}

/// Everything a scheduler needs from its host
pub trait Stage: GeometryProvider + MotionEngine + ContentMeasure {}

impl<T> Stage for T where T: GeometryProvider + MotionEngine + ContentMeasure {}
