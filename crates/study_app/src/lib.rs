//! Terminal front end for the Q-methodology study coordinator.
pub mod platform;

pub use platform::app::{Coordinator, StartOutcome};
pub use platform::config::{FileConfig, Settings};
pub use platform::effects::{map_event, status_update, EffectRunner};
