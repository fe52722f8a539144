use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bulletlane_core::{
    AppConfig, BulletScheduler, ItemId, ItemOptions, SchedulerBuilder, SchedulerView,
    SimulatedStage, Submission,
};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::input::Action;
use crate::theme::Theme;
use crate::timer::FrameTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Submit the next line from the content source
    Spawn,
}

/// Lines to submit, cycled forever
#[derive(Debug, Clone, Default)]
pub struct ContentSource {
    lines: Vec<String>,
    next: usize,
}

impl ContentSource {
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines, next: 0 }
    }

    pub fn next_line(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let line = self.lines[self.next % self.lines.len()].clone();
        self.next = (self.next + 1) % self.lines.len();
        Some(line)
    }
}

/// Submission counters shown in the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub placed: usize,
    pub queued: usize,
    pub rejected: usize,
}

/// Application state
pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    scheduler: BulletScheduler<SimulatedStage>,
    source: ContentSource,
    timer: FrameTimer<TimerEvent>,
    /// Elapsed time at the previous frame
    last_frame: Duration,
    /// Terminal cells the bullet field occupies
    field: Rect,
    hovered: Option<ItemId>,
    finished: Arc<AtomicUsize>,
    pub stats: Stats,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Build the app for a bullet field of `field` cells. The lane count is fixed from here on.
    pub fn new(config: AppConfig, lines: Vec<String>, field: Rect) -> Result<Self> {
        let stage = SimulatedStage::new(stage_rect(&config, field), config.ui.cell_width_px);
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();

        let scheduler = SchedulerBuilder::new(config.scheduler.clone())
            .with_stage(stage)
            .on_end(move |_, _| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .build()?;

        let mut timer = FrameTimer::new();
        timer.every(
            Duration::from_millis(config.ui.spawn_interval_ms),
            TimerEvent::Spawn,
        );

        Ok(Self {
            config,
            theme: Theme::default(),
            scheduler,
            source: ContentSource::new(lines),
            timer,
            last_frame: Duration::ZERO,
            field,
            hovered: None,
            finished,
            stats: Stats::default(),
            status_message: None,
            should_quit: false,
        })
    }

    pub fn scheduler(&self) -> &BulletScheduler<SimulatedStage> {
        &self.scheduler
    }

    pub fn field(&self) -> Rect {
        self.field
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::Relaxed)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Advance one frame. `elapsed` is the time since the app started.
    pub fn on_frame(&mut self, elapsed: Duration) {
        for event in self.timer.tick(elapsed) {
            match event {
                // rejected anyway while paused, so keep the line for later
                TimerEvent::Spawn if !self.scheduler.is_all_paused() => self.submit_next(),
                TimerEvent::Spawn => {}
            }
        }

        self.scheduler.flush_mounts();

        let dt = elapsed.saturating_sub(self.last_frame);
        self.last_frame = elapsed.max(self.last_frame);
        let signals = self.scheduler.stage_mut().advance(dt.as_secs_f64());
        for signal in signals {
            self.scheduler.dispatch(signal);
        }
    }

    /// Take the next line from the source and submit it
    pub fn submit_next(&mut self) {
        let Some(line) = self.source.next_line() else {
            return;
        };

        match self.scheduler.submit(line, ItemOptions::new()) {
            Submission::Placed(id) => {
                debug!(item = %id, "Bullet placed");
                self.stats.placed += 1;
            }
            Submission::Queued => self.stats.queued += 1,
            Submission::Rejected => {
                self.stats.rejected += 1;
                self.set_status(" Paused: new bullets are rejected");
            }
        }
    }

    pub fn toggle_pause_all(&mut self) -> Result<()> {
        if self.scheduler.is_all_paused() {
            self.scheduler.resume(None)?;
            self.clear_status();
            info!("Resumed all bullets");
        } else {
            self.scheduler.pause(None)?;
            info!("Paused all bullets");
        }
        Ok(())
    }

    /// The field changed size. Lanes are kept; only the viewport is re-read.
    pub fn resize(&mut self, field: Rect) {
        self.field = field;
        let rect = stage_rect(&self.config, field);
        self.scheduler.stage_mut().resize(rect);
        self.scheduler.remeasure();
    }

    /// Stage coordinates at the centre of a terminal cell, if it lies in the field
    pub fn cell_to_point(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let field = self.field;
        if column < field.x
            || row < field.y
            || column >= field.x + field.width
            || row >= field.y + field.height
        {
            return None;
        }
        let cell_width = self.config.ui.cell_width_px;
        let lane_height = self.config.scheduler.lane_height;
        Some((
            (column - field.x) as f64 * cell_width + cell_width / 2.0,
            (row - field.y) as f64 * lane_height + lane_height / 2.0,
        ))
    }

    fn item_at_cell(&self, column: u16, row: u16) -> Option<ItemId> {
        let (x, y) = self.cell_to_point(column, row)?;
        self.scheduler.item_at(x, y)
    }

    pub fn click(&mut self, column: u16, row: u16) {
        if let Some(id) = self.item_at_cell(column, row) {
            self.scheduler.on_click(&id);
        }
    }

    /// Pointer moved: leave the old item, enter the new one
    pub fn hover(&mut self, column: u16, row: u16) {
        let target = self.item_at_cell(column, row);
        if target == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            self.scheduler.on_hover_leave(&previous);
        }
        if let Some(id) = target {
            self.scheduler.on_hover_enter(&id);
        }
        self.hovered = target;
    }

    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePauseAll => self.toggle_pause_all()?,
            Action::SubmitNext => self.submit_next(),
            Action::Click { column, row } => self.click(column, row),
            Action::Hover { column, row } => self.hover(column, row),
            Action::None => {}
        }
        Ok(())
    }
}

/// Stage viewport for a field: one lane per row, `cell_width_px` per column
fn stage_rect(config: &AppConfig, field: Rect) -> bulletlane_core::Rect {
    bulletlane_core::Rect::new(
        0.0,
        0.0,
        field.width as f64 * config.ui.cell_width_px,
        field.height as f64 * config.scheduler.lane_height,
    )
}
