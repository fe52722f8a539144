//! Optimistic lane selection by tail load.
//!
//! Selection never refuses a lane while one exists; admission is decided
//! afterwards by the predictor.

use crate::geometry::{Rect, Viewport};

use super::pool::LaneStatus;

/// Load of a lane in [0, 1]: 0 when idle or when its trailing item is about to
/// exit, close to 1 while the trailing item is still entering.
pub fn lane_load(viewport: &Viewport, status: LaneStatus, trailing: Option<Rect>) -> f64 {
    if status == LaneStatus::Idle {
        return 0.0;
    }
    match trailing {
        Some(rect) => (1.0 - viewport.progress_of(rect.right())).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Index of the least-loaded lane; the lowest index wins ties.
pub fn select_lane(loads: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &load) in loads.iter().enumerate() {
        match best {
            Some((_, min)) if load >= min => {}
            _ => best = Some((index, load)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport {
        left: 0.0,
        width: 1000.0,
        height: 400.0,
    };

    #[test]
    fn test_idle_lane_has_zero_load() {
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(lane_load(&VP, LaneStatus::Idle, Some(rect)), 0.0);
        assert_eq!(lane_load(&VP, LaneStatus::Running, None), 0.0);
    }

    #[test]
    fn test_entering_item_is_full() {
        let entering = Rect::new(-100.0, 0.0, 100.0, 40.0);
        assert!((lane_load(&VP, LaneStatus::Running, Some(entering)) - 1.0).abs() < 1e-9);

        let leaving = Rect::new(900.0, 0.0, 100.0, 40.0);
        assert!(lane_load(&VP, LaneStatus::Running, Some(leaving)).abs() < 1e-9);
    }

    #[test]
    fn test_load_stays_in_unit_range() {
        // right edge past the viewport's right edge
        let exiting = Rect::new(950.0, 0.0, 100.0, 40.0);
        assert_eq!(lane_load(&VP, LaneStatus::Running, Some(exiting)), 0.0);

        // right edge still left of the viewport
        let offstage = Rect::new(-150.0, 0.0, 100.0, 40.0);
        assert_eq!(lane_load(&VP, LaneStatus::Running, Some(offstage)), 1.0);

        let loads = [
            lane_load(&VP, LaneStatus::Running, Some(exiting)),
            lane_load(&VP, LaneStatus::Idle, None),
        ];
        assert_eq!(loads, [0.0, 0.0]);
        assert_eq!(select_lane(&loads), Some(0));
    }

    #[test]
    fn test_select_lane_prefers_lowest_index_on_tie() {
        assert_eq!(select_lane(&[0.5, 0.2, 0.2]), Some(1));
        assert_eq!(select_lane(&[0.0, 0.0]), Some(0));
    }

    #[test]
    fn test_select_lane_returns_some_even_when_all_full() {
        assert_eq!(select_lane(&[1.0, 0.99, 1.0]), Some(1));
        assert_eq!(select_lane(&[]), None);
    }
}
