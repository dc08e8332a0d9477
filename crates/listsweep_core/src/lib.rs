//! Listsweep core: job data model and the pure job-control state machine.
mod checkpoint;
mod effect;
mod mode;
mod msg;
mod processed;
mod state;
mod stats;
mod update;

pub use checkpoint::Checkpoint;
pub use effect::Effect;
pub use mode::{Mode, ModeParseError};
pub use msg::Msg;
pub use processed::ProcessedIds;
pub use state::{JobState, RunEnd};
pub use stats::{ItemTally, RunStats};
pub use update::update;
