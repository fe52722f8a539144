//! Lane scheduler: placement, overflow replay, lifecycle and pause control.
//!
//! Everything runs synchronously on the caller's thread. Motion signals arrive
//! from the host through [`BulletScheduler::dispatch`] and may interleave with
//! submissions in any order.

use tracing::{debug, info, warn};

use crate::config::{PausePolicy, SchedulerConfig};
use crate::geometry::{Rect, Viewport};
use crate::hooks::{self, CallbackContext, Command, HookRegistry, ItemHooks};
use crate::lane::{
    self, lane_load, select_lane, ActiveItem, Candidate, ItemId, ItemPhase, LanePool, SpeedRegime,
    Trailing,
};
use crate::motion::{MotionPlan, MotionSignal, PlayState, Stage};
use crate::options::{item_callback, DefaultHooks, ItemCallback, ItemOptions};
use crate::pause::PauseEvent;
use crate::queue::{OverflowQueue, PendingItem};
use crate::target::{TargetRef, TargetResolver};
use crate::{Error, Result};

/// Read access to scheduler state, as seen by item callbacks
pub trait SchedulerView {
    /// Active items, lane order then insertion order
    fn active_items(&self) -> Vec<ActiveItem>;
    fn lane_count(&self) -> usize;
    fn queue_len(&self) -> usize;
    fn is_all_paused(&self) -> bool;
}

/// Outcome of a submission. Rejection is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Placed(ItemId),
    /// No lane admitted the item; it waits in the overflow queue
    Queued,
    /// Globally paused, or vetoed and not replayable
    Rejected,
}

impl Submission {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Submission::Placed(id) => Some(*id),
            _ => None,
        }
    }
}

enum Placement {
    Placed(ItemId),
    Vetoed { pending: PendingItem, replayable: bool },
}

pub struct SchedulerBuilder<S> {
    config: SchedulerConfig,
    hooks: DefaultHooks,
    stage: Option<S>,
}

impl<S: Stage> SchedulerBuilder<S> {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            hooks: DefaultHooks::default(),
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: S) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Resolve a render target through the host. Fails if it does not exist.
    pub fn attach<R>(mut self, target: &TargetRef, resolver: &R) -> Result<Self>
    where
        R: TargetResolver<Stage = S>,
    {
        self.stage = Some(resolver.resolve(target)?);
        Ok(self)
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.on_start = Some(item_callback(callback));
        self
    }

    pub fn on_end<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ItemId, &mut CallbackContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.on_end = Some(item_callback(callback));
        self
    }

    pub fn build(self) -> Result<BulletScheduler<S>> {
        let stage = self.stage.ok_or(Error::Uninitialized("stage"))?;
        let mut scheduler = BulletScheduler::new(stage, self.config)?;
        scheduler.hooks = self.hooks;
        Ok(scheduler)
    }
}

pub struct BulletScheduler<S> {
    stage: S,
    config: SchedulerConfig,
    hooks: DefaultHooks,
    viewport: Viewport,
    pool: LanePool,
    queue: OverflowQueue,
    listeners: HookRegistry,
    /// Placed items waiting for the next frame to be mounted
    pending_mounts: Vec<ItemId>,
    all_paused: bool,
}

impl<S: Stage> BulletScheduler<S> {
    pub fn new(stage: S, config: SchedulerConfig) -> Result<Self> {
        if !(config.lane_height.is_finite() && config.lane_height > 0.0) {
            return Err(Error::Config(format!(
                "lane height must be positive, got {}",
                config.lane_height
            )));
        }

        let viewport = Viewport::from(stage.viewport_rect());
        let lanes = viewport.lane_count(config.lane_height);
        info!(
            "Scheduler ready: {} lanes, viewport {}x{}",
            lanes, viewport.width, viewport.height
        );

        Ok(Self {
            stage,
            config,
            hooks: DefaultHooks::default(),
            viewport,
            pool: LanePool::new(lanes),
            queue: OverflowQueue::new(),
            listeners: HookRegistry::default(),
            pending_mounts: Vec::new(),
            all_paused: false,
        })
    }

    pub fn builder(config: SchedulerConfig) -> SchedulerBuilder<S> {
        SchedulerBuilder::new(config)
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn lanes(&self) -> &LanePool {
        &self.pool
    }

    pub fn pending_mount_count(&self) -> usize {
        self.pending_mounts.len()
    }

    pub fn get(&self, id: &ItemId) -> Option<&ActiveItem> {
        self.pool.find(id)
    }

    /// Re-read the viewport from the stage. The lane count never changes.
    pub fn remeasure(&mut self) {
        self.viewport = Viewport::from(self.stage.viewport_rect());
        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            "Viewport remeasured"
        );
    }

    fn regime(&self) -> SpeedRegime {
        if self.config.has_fixed_speed() {
            SpeedRegime::Fixed
        } else {
            SpeedRegime::FreeDuration
        }
    }

    /// Current rectangle of an item; unmounted items sit at their start offset
    fn item_rect(&self, item: &ActiveItem) -> Rect {
        self.stage.item_rect(&item.id).unwrap_or_else(|| {
            Rect::new(
                self.viewport.left - item.width,
                item.lane as f64 * self.config.lane_height,
                item.width,
                self.config.lane_height,
            )
        })
    }

    /// Load score per lane, in lane order
    pub fn lane_loads(&self) -> Vec<f64> {
        self.pool
            .lanes()
            .iter()
            .map(|lane| {
                let trailing = lane.trailing().map(|item| self.item_rect(item));
                lane_load(&self.viewport, lane.status, trailing)
            })
            .collect()
    }

    /// Pick the least-loaded lane and reserve it if idle.
    ///
    /// Returns `None` only when there are no lanes at all; whether the item may
    /// actually enter is decided by [`Self::can_enter`].
    pub fn select_lane(&mut self) -> Option<usize> {
        let index = select_lane(&self.lane_loads())?;
        self.pool.reserve(index);
        Some(index)
    }

    /// Whether an item of `width` taking `duration` seconds can enter `lane` now
    pub fn can_enter(&self, lane: usize, duration: f64, width: f64) -> Result<bool> {
        let target = self.pool.get(lane).ok_or(Error::LaneOutOfRange {
            index: lane,
            lanes: self.pool.len(),
        })?;
        let trailing = target.trailing().map(|item| Trailing {
            rect: self.item_rect(item),
            duration: item.duration,
        });
        Ok(lane::can_enter(
            &self.viewport,
            trailing.as_ref(),
            &Candidate { width, duration },
            self.regime(),
        ))
    }

    /// Submit new content.
    ///
    /// Rejected outright while globally paused. Otherwise the item is placed,
    /// or queued for replay when no lane admits it.
    pub fn submit(&mut self, content: impl Into<String>, options: ItemOptions) -> Submission {
        if self.all_paused {
            debug!("Submission rejected: all paused");
            return Submission::Rejected;
        }

        match self.place(content.into(), options) {
            Placement::Placed(id) => {
                self.drain_queue();
                Submission::Placed(id)
            }
            Placement::Vetoed {
                pending,
                replayable: true,
            } => {
                self.queue.enqueue(pending);
                debug!(queued = self.queue.len(), "No lane available, item queued");
                Submission::Queued
            }
            Placement::Vetoed {
                replayable: false, ..
            } => {
                debug!("No lane available, item dropped");
                Submission::Rejected
            }
        }
    }

    fn place(&mut self, content: String, options: ItemOptions) -> Placement {
        let Some(lane) = self.select_lane() else {
            return Placement::Vetoed {
                replayable: options.replayable.unwrap_or(true),
                pending: PendingItem { content, options },
            };
        };

        let resolved = options.resolve(&self.config, &self.hooks);
        let width = self.stage.measure_width(&content);
        let duration = resolved.duration_for(lane, self.viewport.width, width);

        // lane index came from the pool, so it is always in range
        if !self.can_enter(lane, duration, width).unwrap_or(false) {
            debug!(lane, width, duration, "Lane vetoed by collision prediction");
            return Placement::Vetoed {
                pending: PendingItem { content, options },
                replayable: resolved.replayable,
            };
        }

        let item = ActiveItem::new(content, width, duration, lane);
        let id = item.id;
        self.listeners.register(
            id,
            ItemHooks {
                on_start: resolved.on_start,
                on_end: resolved.on_end,
            },
        );
        self.pool.push(item);
        self.pending_mounts.push(id);
        debug!(item = %id, lane, width, duration, "Item placed");

        Placement::Placed(id)
    }

    /// Replay queued items, one per placement, until one is vetoed.
    ///
    /// Replays bypass the global-pause rejection: content already accepted is
    /// never dropped by a pause.
    fn drain_queue(&mut self) {
        while let Some(pending) = self.queue.dequeue_one() {
            match self.place(pending.content, pending.options) {
                Placement::Placed(id) => {
                    debug!(item = %id, remaining = self.queue.len(), "Queued item replayed");
                }
                Placement::Vetoed { pending, .. } => {
                    self.queue.requeue_front(pending);
                    break;
                }
            }
        }
    }

    /// Start motion for everything placed since the last frame.
    ///
    /// Hosts call this once per rendering opportunity. Returns how many items were mounted.
    pub fn flush_mounts(&mut self) -> usize {
        let ids = std::mem::take(&mut self.pending_mounts);
        let mut mounted = 0;

        for id in ids {
            let Some(item) = self.pool.find(&id) else {
                continue;
            };
            let plan = MotionPlan {
                from_offset: -item.width,
                distance: self.viewport.width + item.width,
                top: item.lane as f64 * self.config.lane_height,
                width: item.width,
                height: self.config.lane_height,
                duration_secs: item.duration,
            };
            let paused = self.all_paused || item.play_state() == PlayState::Paused;

            self.stage.start(&id, &plan);
            if paused {
                self.stage.set_play_state(&id, PlayState::Paused);
            }
            mounted += 1;
        }

        mounted
    }

    /// Route a motion signal to the lifecycle manager
    pub fn dispatch(&mut self, signal: MotionSignal) -> bool {
        match signal {
            MotionSignal::Started(id) => self.handle_started(&id),
            MotionSignal::Finished(id) => self.handle_finished(&id),
        }
    }

    /// Entering → active. Runs the item's start callback.
    pub fn handle_started(&mut self, id: &ItemId) -> bool {
        match self.pool.find_mut(id) {
            Some(item) if item.phase == ItemPhase::Entering => item.phase = ItemPhase::Active,
            Some(_) => return false,
            None => {
                warn!(item = %id, "Start signal for unknown item");
                return false;
            }
        }

        if let Some(callback) = self.listeners.on_start(id) {
            let commands = self.run_callback(&callback, id, "on_start");
            self.apply_commands(commands);
        }
        true
    }

    /// Active → finished: run the end callback, free the lane slot, release
    /// presentation state, then replay from the overflow queue. Commands the
    /// callback issued run last, after queued items had their turn.
    pub fn handle_finished(&mut self, id: &ItemId) -> bool {
        match self.pool.find_mut(id) {
            Some(item) => item.phase = ItemPhase::Finished,
            None => {
                warn!(item = %id, "Finish signal for unknown item");
                return false;
            }
        }

        let commands = match self.listeners.take_on_end(id) {
            Some(callback) => self.run_callback(&callback, id, "on_end"),
            None => Vec::new(),
        };

        if let Some(item) = self.pool.remove(id) {
            debug!(item = %id, lane = item.lane, "Item finished");
        }
        self.pending_mounts.retain(|pending| pending != id);
        self.stage.release(id);

        self.drain_queue();
        self.apply_commands(commands);
        true
    }

    /// Invoke a callback and collect its commands. A panicking callback's commands are dropped.
    fn run_callback(&self, callback: &ItemCallback, id: &ItemId, label: &str) -> Vec<Command> {
        let mut context = CallbackContext::new(self);
        if !hooks::invoke(callback, id, &mut context, label) {
            return Vec::new();
        }
        context.into_commands()
    }

    fn apply_commands(&mut self, commands: Vec<Command>) {
        for command in commands {
            let result = match command {
                Command::Submit { content, options } => {
                    let outcome = self.submit(content, options);
                    debug!(?outcome, "Callback submission");
                    Ok(())
                }
                Command::Pause(id) => self.pause(id.as_ref()),
                Command::Resume(id) => self.resume(id.as_ref()),
                Command::Remove(id) => self.remove(&id),
            };
            if let Err(err) = result {
                warn!(error = %err, "Callback command failed");
            }
        }
    }

    /// Cancel an item mid-flight. The full finish transition still runs.
    pub fn remove(&mut self, id: &ItemId) -> Result<()> {
        if self.pool.find(id).is_none() {
            return Err(Error::ItemNotFound(id.to_string()));
        }
        self.stage.stop(id);
        self.handle_finished(id);
        Ok(())
    }

    /// Pause one item, or everything when `id` is `None`.
    ///
    /// A global pause also rejects new submissions until resumed.
    pub fn pause(&mut self, id: Option<&ItemId>) -> Result<()> {
        match id {
            Some(id) => self.apply_pause_event(id, PauseEvent::Pause).map(|_| ()),
            None => {
                self.all_paused = true;
                for item in self.pool.iter() {
                    self.stage.set_play_state(&item.id, PlayState::Paused);
                }
                info!("All items paused");
                Ok(())
            }
        }
    }

    /// Resume one item, or everything when `id` is `None`
    pub fn resume(&mut self, id: Option<&ItemId>) -> Result<()> {
        match id {
            Some(id) => self.apply_pause_event(id, PauseEvent::Resume).map(|_| ()),
            None => {
                self.all_paused = false;
                let policy = self.config.pause_policy;
                for item in self.pool.iter_mut() {
                    if policy == PausePolicy::LastToggleWins {
                        item.pause.force_running();
                    }
                    self.stage.set_play_state(&item.id, item.play_state());
                }
                info!("All items resumed");
                Ok(())
            }
        }
    }

    /// Click toggle. Ignored unless `pause_on_click` is enabled.
    pub fn on_click(&mut self, id: &ItemId) -> bool {
        self.config.pause_on_click && self.apply_pause_event(id, PauseEvent::Click).unwrap_or(false)
    }

    pub fn on_hover_enter(&mut self, id: &ItemId) -> bool {
        self.config.pause_on_hover
            && self
                .apply_pause_event(id, PauseEvent::HoverEnter)
                .unwrap_or(false)
    }

    pub fn on_hover_leave(&mut self, id: &ItemId) -> bool {
        self.config.pause_on_hover
            && self
                .apply_pause_event(id, PauseEvent::HoverLeave)
                .unwrap_or(false)
    }

    fn apply_pause_event(&mut self, id: &ItemId, event: PauseEvent) -> Result<bool> {
        let policy = self.config.pause_policy;
        let item = self
            .pool
            .find_mut(id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;

        if !item.pause.apply(event, policy) {
            return Ok(false);
        }
        let play = item.play_state();

        // a global pause holds every item until it is lifted
        if !(self.all_paused && play == PlayState::Running) {
            self.stage.set_play_state(id, play);
        }
        debug!(item = %id, ?event, ?play, "Pause state changed");
        Ok(true)
    }

    /// Item under a point, preferring paused items (drawn on top)
    pub fn item_at(&self, x: f64, y: f64) -> Option<ItemId> {
        let mut hit: Option<&ActiveItem> = None;
        for item in self.pool.iter() {
            if !self.item_rect(item).contains(x, y) {
                continue;
            }
            let on_top = item.play_state() == PlayState::Paused;
            match hit {
                Some(prev) if prev.play_state() == PlayState::Paused && !on_top => {}
                _ => hit = Some(item),
            }
        }
        hit.map(|item| item.id)
    }
}

impl<S: Stage> SchedulerView for BulletScheduler<S> {
    fn active_items(&self) -> Vec<ActiveItem> {
        self.pool.iter().cloned().collect()
    }

    fn lane_count(&self) -> usize {
        self.pool.len()
    }

    fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn is_all_paused(&self) -> bool {
        self.all_paused
    }
}
