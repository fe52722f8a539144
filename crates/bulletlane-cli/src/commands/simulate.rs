use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use tracing::info;

use bulletlane_core::{
    ActiveItem, AppConfig, ItemOptions, SchedulerBuilder, SchedulerView, SimulatedStage, Submission,
};
use bulletlane_tui::FrameTimer;

use crate::source;

/// Outcome of a headless run
#[derive(Debug, Default, Serialize)]
pub struct SimulationReport {
    pub seconds: f64,
    pub lanes: usize,
    pub submitted: usize,
    pub placed: usize,
    pub queued: usize,
    pub rejected: usize,
    pub finished: usize,
    /// Items still waiting in the overflow queue at the end
    pub still_queued: usize,
    pub active: Vec<ActiveItem>,
}

pub async fn run(
    config: &AppConfig,
    file: Option<PathBuf>,
    seconds: f64,
    step_ms: u64,
    json: bool,
) -> Result<()> {
    let lines = match file {
        Some(path) => source::read_file(&path).await?,
        None => source::read_stdin().await?,
    };

    let report = simulate(config, lines, seconds, step_ms)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Simulated {:.1}s on {} lanes\n", report.seconds, report.lanes);
    println!("  Submitted:    {}", report.submitted);
    println!("  Placed:       {}", report.placed);
    println!("  Queued:       {}", report.queued);
    println!("  Rejected:     {}", report.rejected);
    println!("  Finished:     {}", report.finished);
    println!("  Still queued: {}", report.still_queued);
    println!("  Active:       {}", report.active.len());
    for item in &report.active {
        println!("    [lane {}] {} ({:.1}s)", item.lane, item.content, item.duration);
    }

    Ok(())
}

/// Submit one line per spawn interval and step the virtual clock for `seconds`
pub fn simulate(
    config: &AppConfig,
    lines: Vec<String>,
    seconds: f64,
    step_ms: u64,
) -> Result<SimulationReport> {
    ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "seconds must be a non-negative number, got {}",
        seconds
    );
    let total = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("seconds out of range, got {}", seconds))?;

    let finished = Arc::new(AtomicUsize::new(0));
    let counter = finished.clone();
    let mut scheduler = SchedulerBuilder::new(config.scheduler.clone())
        .with_stage(SimulatedStage::from_config(&config.stage))
        .on_end(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .build()?;

    let mut timer = FrameTimer::new();
    timer.every(Duration::from_millis(config.ui.spawn_interval_ms), ());

    let mut report = SimulationReport {
        seconds,
        lanes: scheduler.lane_count(),
        ..Default::default()
    };

    let step = Duration::from_millis(step_ms.max(1));
    let mut lines = lines.into_iter();
    let mut elapsed = Duration::ZERO;

    while elapsed < total {
        elapsed += step;

        for _ in timer.tick(elapsed) {
            let Some(line) = lines.next() else {
                break;
            };
            report.submitted += 1;
            match scheduler.submit(line, ItemOptions::new()) {
                Submission::Placed(_) => report.placed += 1,
                Submission::Queued => report.queued += 1,
                Submission::Rejected => report.rejected += 1,
            }
        }

        scheduler.flush_mounts();
        let signals = scheduler.stage_mut().advance(step.as_secs_f64());
        for signal in signals {
            scheduler.dispatch(signal);
        }
    }

    report.finished = finished.load(Ordering::Relaxed);
    report.still_queued = scheduler.queue_len();
    report.active = scheduler.active_items();
    info!(
        placed = report.placed,
        queued = report.queued,
        finished = report.finished,
        "Simulation complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("bullet number {}", i)).collect()
    }

    #[test]
    fn test_everything_finishes_given_time() {
        let config = AppConfig::default();
        let report = simulate(&config, lines(5), 60.0, 20).unwrap();
        assert_eq!(report.submitted, 5);
        assert_eq!(report.placed + report.queued, 5);
        assert_eq!(report.finished, 5);
        assert_eq!(report.still_queued, 0);
        assert!(report.active.is_empty());
        assert_eq!(report.lanes, 10);
    }

    #[test]
    fn test_overload_queues_instead_of_overlapping() {
        let mut config = AppConfig::default();
        config.stage.height = 40.0;
        config.scheduler.speed = Some(100.0);
        config.ui.spawn_interval_ms = 50;
        let report = simulate(&config, lines(20), 2.0, 10).unwrap();
        assert_eq!(report.lanes, 1);
        assert_eq!(report.placed, 1);
        assert_eq!(report.queued, 19);
        assert_eq!(report.still_queued, 19);
    }

    #[test]
    fn test_json_report_lists_active_items() {
        let report = simulate(&AppConfig::default(), lines(1), 1.0, 16).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["active"][0]["content"], "bullet number 0");
        assert_eq!(json["active"][0]["phase"], "active");
    }

    #[test]
    fn test_negative_seconds_rejected() {
        assert!(simulate(&AppConfig::default(), lines(1), -1.0, 16).is_err());
    }

    #[test]
    fn test_seconds_beyond_duration_range_rejected() {
        assert!(simulate(&AppConfig::default(), lines(1), 1e30, 16).is_err());
    }
}
