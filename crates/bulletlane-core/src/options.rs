use std::fmt;
use std::sync::Arc;

use crate::config::{parse_duration_secs, SchedulerConfig};
use crate::hooks::CallbackContext;
use crate::lane::ItemId;

/// Lifecycle callback receiving the item id and a context that can read the
/// scheduler and issue submit, pause, resume or remove commands
pub type ItemCallback = Arc<dyn Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync>;

pub fn item_callback<F>(callback: F) -> ItemCallback
where
    F: Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Per-item overrides. Unset fields fall back to the scheduler's defaults.
#[derive(Clone, Default)]
pub struct ItemOptions {
    pub duration: Option<String>,
    pub speed: Option<f64>,
    pub lane_speeds: Option<Vec<f64>>,
    pub on_start: Option<ItemCallback>,
    pub on_end: Option<ItemCallback>,
    /// Queue the item when no lane admits it (default true)
    pub replayable: Option<bool>,
}

impl fmt::Debug for ItemOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemOptions")
            .field("duration", &self.duration)
            .field("speed", &self.speed)
            .field("lane_speeds", &self.lane_speeds)
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("replayable", &self.replayable)
            .finish()
    }
}

impl ItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_lane_speeds(mut self, speeds: Vec<f64>) -> Self {
        self.lane_speeds = Some(speeds);
        self
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync + 'static,
    {
        self.on_start = Some(item_callback(callback));
        self
    }

    pub fn on_end<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync + 'static,
    {
        self.on_end = Some(item_callback(callback));
        self
    }

    pub fn replayable(mut self, replayable: bool) -> Self {
        self.replayable = Some(replayable);
        self
    }

    /// Merge over process defaults. The result is never mutated afterwards.
    pub fn resolve(&self, defaults: &SchedulerConfig, hooks: &DefaultHooks) -> ResolvedOptions {
        let duration = self.duration.as_deref().unwrap_or(&defaults.duration);
        ResolvedOptions {
            fallback_duration: parse_duration_secs(duration),
            speed: self.speed.or(defaults.speed),
            lane_speeds: self
                .lane_speeds
                .clone()
                .unwrap_or_else(|| defaults.lane_speeds.clone()),
            on_start: self.on_start.clone().or_else(|| hooks.on_start.clone()),
            on_end: self.on_end.clone().or_else(|| hooks.on_end.clone()),
            replayable: self.replayable.unwrap_or(true),
        }
    }
}

/// Scheduler-wide callbacks used when an item does not set its own
#[derive(Clone, Default)]
pub struct DefaultHooks {
    pub on_start: Option<ItemCallback>,
    pub on_end: Option<ItemCallback>,
}

/// Item options merged with the scheduler defaults
#[derive(Clone)]
pub struct ResolvedOptions {
    pub fallback_duration: f64,
    pub speed: Option<f64>,
    pub lane_speeds: Vec<f64>,
    pub on_start: Option<ItemCallback>,
    pub on_end: Option<ItemCallback>,
    pub replayable: bool,
}

impl ResolvedOptions {
    /// Speed that applies on `lane`: the lane's own entry, else the global speed. Zero counts as unset.
    pub fn speed_for_lane(&self, lane: usize) -> Option<f64> {
        self.lane_speeds
            .get(lane)
            .copied()
            .filter(|s| *s > 0.0)
            .or(self.speed.filter(|s| *s > 0.0))
    }

    /// Seconds needed to cross a viewport of `viewport_width` on `lane`
    pub fn duration_for(&self, lane: usize, viewport_width: f64, item_width: f64) -> f64 {
        match self.speed_for_lane(lane) {
            Some(speed) => (viewport_width + item_width) / speed,
            None => self.fallback_duration,
        }
    }
}
