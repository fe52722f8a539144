//! Lanes, the items they hold, and the two-phase placement decision:
//! optimistic selection by load, then a predictive veto.

mod item;
mod pool;
pub mod predictor;
pub mod selector;

pub use item::{velocity, ActiveItem, ItemId, ItemPhase};
pub use pool::{Lane, LanePool, LaneStatus};
pub use predictor::{can_enter, Candidate, SpeedRegime, Trailing, EARLY_EXIT_PROGRESS};
pub use selector::{lane_load, select_lane};
