//! Deterministic in-memory stage.
//!
//! Items move linearly on a virtual clock advanced explicitly by the host, so
//! schedules can be replayed exactly in tests and in the headless runner.

use std::collections::HashMap;

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::config::StageConfig;
use crate::geometry::{ContentMeasure, GeometryProvider, Rect};
use crate::lane::ItemId;
use crate::motion::{MotionEngine, MotionPlan, MotionSignal, PlayState};
use crate::target::{ElementHandle, TargetResolver};

#[derive(Debug, Clone)]
struct SimItem {
    plan: MotionPlan,
    elapsed: f64,
    play: PlayState,
    started: bool,
    finished: bool,
}

impl SimItem {
    fn fraction(&self) -> f64 {
        if self.plan.duration_secs <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.plan.duration_secs).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedStage {
    viewport: Rect,
    glyph_width: f64,
    clock: f64,
    items: HashMap<ItemId, SimItem>,
    /// Mount order, so signals come out deterministically
    order: Vec<ItemId>,
}

impl SimulatedStage {
    pub fn new(viewport: Rect, glyph_width: f64) -> Self {
        Self {
            viewport,
            glyph_width,
            clock: 0.0,
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn from_config(config: &StageConfig) -> Self {
        Self::new(
            Rect::new(config.left, 0.0, config.width, config.height),
            config.glyph_width,
        )
    }

    /// Seconds of virtual time elapsed since creation
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn mounted_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_mounted(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn play_state(&self, id: &ItemId) -> Option<PlayState> {
        self.items.get(id).map(|item| item.play)
    }

    /// Advance the virtual clock by `dt` seconds and collect lifecycle signals.
    ///
    /// `Started` is reported on the first advance after mounting; `Finished`
    /// once an item has covered its whole distance. Paused items stand still.
    pub fn advance(&mut self, dt: f64) -> Vec<MotionSignal> {
        self.clock += dt;
        let mut signals = Vec::new();

        for id in &self.order {
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };
            if item.finished {
                continue;
            }
            if !item.started {
                item.started = true;
                signals.push(MotionSignal::Started(*id));
            }
            if item.play == PlayState::Running {
                item.elapsed += dt;
            }
            if item.elapsed >= item.plan.duration_secs {
                item.elapsed = item.plan.duration_secs;
                item.finished = true;
                signals.push(MotionSignal::Finished(*id));
            }
        }

        signals
    }

    fn unmount(&mut self, id: &ItemId) {
        if self.items.remove(id).is_some() {
            self.order.retain(|other| other != id);
        }
    }
}

impl GeometryProvider for SimulatedStage {
    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn item_rect(&self, id: &ItemId) -> Option<Rect> {
        self.items.get(id).map(|item| {
            let plan = &item.plan;
            Rect::new(
                self.viewport.left + plan.from_offset + plan.distance * item.fraction(),
                self.viewport.top + plan.top,
                plan.width,
                plan.height,
            )
        })
    }
}

impl ContentMeasure for SimulatedStage {
    fn measure_width(&self, content: &str) -> f64 {
        content.width() as f64 * self.glyph_width
    }
}

impl MotionEngine for SimulatedStage {
    fn start(&mut self, id: &ItemId, plan: &MotionPlan) {
        debug!(item = %id, duration = plan.duration_secs, "Simulated motion started");
        if self.items.contains_key(id) {
            self.unmount(id);
        }
        self.items.insert(
            *id,
            SimItem {
                plan: *plan,
                elapsed: 0.0,
                play: PlayState::Running,
                started: false,
                finished: false,
            },
        );
        self.order.push(*id);
    }

    fn set_play_state(&mut self, id: &ItemId, state: PlayState) {
        if let Some(item) = self.items.get_mut(id) {
            item.play = state;
        }
    }

    fn stop(&mut self, id: &ItemId) {
        self.unmount(id);
    }

    fn release(&mut self, id: &ItemId) {
        self.unmount(id);
    }
}

/// Resolves selectors and element handles to fresh simulated stages
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    selectors: HashMap<String, Rect>,
    elements: HashMap<ElementHandle, Rect>,
    glyph_width: f64,
}

impl SimulatedHost {
    pub fn new(glyph_width: f64) -> Self {
        Self {
            glyph_width,
            ..Default::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>, viewport: Rect) -> Self {
        self.selectors.insert(selector.into(), viewport);
        self
    }

    pub fn with_element(mut self, handle: ElementHandle, viewport: Rect) -> Self {
        self.elements.insert(handle, viewport);
        self
    }
}

impl TargetResolver for SimulatedHost {
    type Stage = SimulatedStage;

    fn query(&self, selector: &str) -> Option<SimulatedStage> {
        self.selectors
            .get(selector)
            .map(|rect| SimulatedStage::new(*rect, self.glyph_width))
    }

    fn element(&self, handle: ElementHandle) -> Option<SimulatedStage> {
        self.elements
            .get(&handle)
            .map(|rect| SimulatedStage::new(*rect, self.glyph_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(width: f64, duration: f64) -> MotionPlan {
        MotionPlan {
            from_offset: -width,
            distance: 1000.0 + width,
            top: 0.0,
            width,
            height: 40.0,
            duration_secs: duration,
        }
    }

    #[test]
    fn test_linear_motion() {
        let mut stage = SimulatedStage::new(Rect::new(0.0, 0.0, 1000.0, 40.0), 10.0);
        let id = ItemId::new();
        stage.start(&id, &plan(100.0, 10.0));
        assert_eq!(stage.item_rect(&id).unwrap().left, -100.0);

        let signals = stage.advance(5.0);
        assert_eq!(signals, vec![MotionSignal::Started(id)]);
        assert_eq!(stage.item_rect(&id).unwrap().left, 450.0);

        let signals = stage.advance(5.0);
        assert_eq!(signals, vec![MotionSignal::Finished(id)]);
        // still mounted until released
        assert_eq!(stage.item_rect(&id).unwrap().left, 1000.0);
        stage.release(&id);
        assert!(stage.item_rect(&id).is_none());
    }

    #[test]
    fn test_paused_items_stand_still() {
        let mut stage = SimulatedStage::new(Rect::new(0.0, 0.0, 1000.0, 40.0), 10.0);
        let id = ItemId::new();
        stage.start(&id, &plan(100.0, 10.0));
        stage.set_play_state(&id, PlayState::Paused);
        stage.advance(3.0);
        assert_eq!(stage.item_rect(&id).unwrap().left, -100.0);
        assert_eq!(stage.play_state(&id), Some(PlayState::Paused));
    }

    #[test]
    fn test_measure_uses_display_width() {
        let stage = SimulatedStage::new(Rect::new(0.0, 0.0, 1000.0, 40.0), 10.0);
        assert_eq!(stage.measure_width("hello"), 50.0);
        assert_eq!(stage.measure_width("弹幕"), 40.0);
    }
}
