//! Collision prediction between a candidate item and a lane's trailing item.
//!
//! Items move at constant velocity, so whether a follower overtakes the
//! trailing item inside the viewport can be answered analytically.

use crate::geometry::{Rect, Viewport};

use super::item::velocity;

/// Trailing-item right edge progress beyond which any follower may enter
pub const EARLY_EXIT_PROGRESS: f64 = 0.8;

/// How item speeds are configured for the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedRegime {
    /// A global speed or per-lane speed table is set; followers move at the same speed
    Fixed,
    /// Each item's duration is chosen independently
    FreeDuration,
}

/// Snapshot of a lane's trailing item at decision time
#[derive(Debug, Clone, Copy)]
pub struct Trailing {
    pub rect: Rect,
    pub duration: f64,
}

/// The item asking to enter
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub width: f64,
    pub duration: f64,
}

/// Whether `candidate` can enter a lane now without catching `trailing` inside the viewport.
///
/// Equality always resolves towards entry.
pub fn can_enter(
    viewport: &Viewport,
    trailing: Option<&Trailing>,
    candidate: &Candidate,
    regime: SpeedRegime,
) -> bool {
    let Some(trailing) = trailing else {
        return true;
    };

    let progress = viewport.progress_of(trailing.rect.right());
    if progress >= EARLY_EXIT_PROGRESS {
        return true;
    }

    match regime {
        SpeedRegime::Fixed => trailing.rect.left >= viewport.right(),
        SpeedRegime::FreeDuration => {
            let v1 = velocity(viewport.width, trailing.rect.width, trailing.duration);
            let v2 = velocity(viewport.width, candidate.width, candidate.duration);
            if v2 <= v1 {
                return true;
            }
            let t1 = (trailing.rect.left - viewport.left) / v1;
            let t2 = viewport.width / v2;
            t2 >= t1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport {
        left: 0.0,
        width: 1000.0,
        height: 40.0,
    };

    fn trailing_at(left: f64, width: f64, duration: f64) -> Trailing {
        Trailing {
            rect: Rect::new(left, 0.0, width, 40.0),
            duration,
        }
    }

    #[test]
    fn test_empty_lane_allows() {
        let candidate = Candidate {
            width: 100.0,
            duration: 1.0,
        };
        assert!(can_enter(&VP, None, &candidate, SpeedRegime::Fixed));
        assert!(can_enter(&VP, None, &candidate, SpeedRegime::FreeDuration));
    }

    #[test]
    fn test_overtake_boundary_allows() {
        // v1 = 1100 / 10 = 110 px/s, v2 = 1100 / 5 = 220 px/s
        // t1 = 500 / 110, t2 = 1000 / 220: equal, so entry is allowed
        let trailing = trailing_at(500.0, 100.0, 10.0);
        let candidate = Candidate {
            width: 100.0,
            duration: 5.0,
        };
        assert!(can_enter(&VP, Some(&trailing), &candidate, SpeedRegime::FreeDuration));
    }

    #[test]
    fn test_fast_follower_rejected_when_it_would_overtake() {
        // one pixel past the boundary: t1 = 501 / 110 > t2
        let trailing = trailing_at(501.0, 100.0, 10.0);
        let candidate = Candidate {
            width: 100.0,
            duration: 5.0,
        };
        assert!(!can_enter(&VP, Some(&trailing), &candidate, SpeedRegime::FreeDuration));

        // far ahead of the boundary the faster follower cannot catch up
        let early = trailing_at(200.0, 100.0, 10.0);
        assert!(can_enter(&VP, Some(&early), &candidate, SpeedRegime::FreeDuration));
    }

    #[test]
    fn test_slower_or_equal_follower_allowed() {
        let trailing = trailing_at(0.0, 100.0, 5.0);
        let slower = Candidate {
            width: 100.0,
            duration: 10.0,
        };
        let equal = Candidate {
            width: 100.0,
            duration: 5.0,
        };
        assert!(can_enter(&VP, Some(&trailing), &slower, SpeedRegime::FreeDuration));
        assert!(can_enter(&VP, Some(&trailing), &equal, SpeedRegime::FreeDuration));
    }

    #[test]
    fn test_fixed_speed_blocks_until_early_exit() {
        let candidate = Candidate {
            width: 100.0,
            duration: 11.0,
        };
        let visible = trailing_at(300.0, 100.0, 11.0);
        assert!(!can_enter(&VP, Some(&visible), &candidate, SpeedRegime::Fixed));

        // right edge at 800 = 80% of the width
        let near_exit = trailing_at(700.0, 100.0, 11.0);
        assert!(can_enter(&VP, Some(&near_exit), &candidate, SpeedRegime::Fixed));
    }

    #[test]
    fn test_early_exit_ignores_speeds() {
        let trailing = trailing_at(750.0, 100.0, 100.0);
        let very_fast = Candidate {
            width: 10.0,
            duration: 0.1,
        };
        assert!(can_enter(&VP, Some(&trailing), &very_fast, SpeedRegime::FreeDuration));
    }
}
