pub mod config;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod lane;
pub mod motion;
pub mod options;
pub mod pause;
pub mod queue;
pub mod scheduler;
pub mod sim;
pub mod target;

pub use config::{AppConfig, PausePolicy, SchedulerConfig};
pub use error::{Error, Result};
pub use geometry::{Rect, Viewport};
pub use hooks::CallbackContext;
pub use lane::{ActiveItem, ItemId};
pub use motion::{MotionPlan, MotionSignal, PlayState, Stage};
pub use options::{item_callback, ItemCallback, ItemOptions};
pub use scheduler::{BulletScheduler, SchedulerBuilder, SchedulerView, Submission};
pub use sim::{SimulatedHost, SimulatedStage};
