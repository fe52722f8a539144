//! Listener registry keyed by item id, and the context handed to callbacks.
//!
//! Callbacks are invoked directly by the lifecycle manager. A panicking
//! callback is contained and reported so lane bookkeeping always proceeds.
//! Commands a callback issues are recorded on its [`CallbackContext`] and
//! applied by the scheduler once the transition that fired it has completed.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::lane::{ActiveItem, ItemId};
use crate::options::{ItemCallback, ItemOptions};
use crate::scheduler::SchedulerView;

#[derive(Clone, Default)]
pub struct ItemHooks {
    pub on_start: Option<ItemCallback>,
    pub on_end: Option<ItemCallback>,
}

#[derive(Default)]
pub struct HookRegistry {
    by_item: HashMap<ItemId, ItemHooks>,
}

impl HookRegistry {
    pub fn register(&mut self, id: ItemId, hooks: ItemHooks) {
        if hooks.on_start.is_some() || hooks.on_end.is_some() {
            self.by_item.insert(id, hooks);
        }
    }

    pub fn on_start(&self, id: &ItemId) -> Option<ItemCallback> {
        self.by_item.get(id).and_then(|h| h.on_start.clone())
    }

    /// Detach all hooks for an item, returning its finish callback
    pub fn take_on_end(&mut self, id: &ItemId) -> Option<ItemCallback> {
        self.by_item.remove(id).and_then(|h| h.on_end)
    }

    pub fn len(&self) -> usize {
        self.by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }
}

/// Scheduler operation requested from inside a callback
#[derive(Debug)]
pub enum Command {
    Submit { content: String, options: ItemOptions },
    /// `None` pauses everything
    Pause(Option<ItemId>),
    /// `None` resumes everything
    Resume(Option<ItemId>),
    Remove(ItemId),
}

/// What a lifecycle callback sees of the scheduler.
///
/// Reads reflect the scheduler at the moment the callback fired. Writes are
/// deferred: `on_end` runs while the finished item still holds its lane, so
/// a follow-up submission has to wait for the lane to be freed.
pub struct CallbackContext<'a> {
    view: &'a dyn SchedulerView,
    commands: Vec<Command>,
}

impl<'a> CallbackContext<'a> {
    pub fn new(view: &'a dyn SchedulerView) -> Self {
        Self {
            view,
            commands: Vec::new(),
        }
    }

    pub fn submit(&mut self, content: impl Into<String>, options: ItemOptions) {
        self.commands.push(Command::Submit {
            content: content.into(),
            options,
        });
    }

    pub fn pause(&mut self, id: Option<ItemId>) {
        self.commands.push(Command::Pause(id));
    }

    pub fn resume(&mut self, id: Option<ItemId>) {
        self.commands.push(Command::Resume(id));
    }

    pub fn remove(&mut self, id: ItemId) {
        self.commands.push(Command::Remove(id));
    }

    /// Commands in the order they were issued
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl SchedulerView for CallbackContext<'_> {
    fn active_items(&self) -> Vec<ActiveItem> {
        self.view.active_items()
    }

    fn lane_count(&self) -> usize {
        self.view.lane_count()
    }

    fn queue_len(&self) -> usize {
        self.view.queue_len()
    }

    fn is_all_paused(&self) -> bool {
        self.view.is_all_paused()
    }
}

/// Run a user callback, containing any panic. Returns false if it panicked.
pub fn invoke(
    callback: &ItemCallback,
    id: &ItemId,
    context: &mut CallbackContext<'_>,
    label: &str,
) -> bool {
    let result = panic::catch_unwind(AssertUnwindSafe(|| (**callback)(id, context)));
    if result.is_err() {
        warn!(item = %id, callback = label, "Item callback panicked");
        return false;
    }
    true
}
