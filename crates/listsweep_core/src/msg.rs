use crate::{Mode, RunEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front end asked for a run. `resume` allows continuing a matching checkpoint.
    StartRequested {
        mode: Mode,
        target: Option<String>,
        resume: bool,
    },
    PauseRequested,
    ResumeRequested,
    StopRequested,
    /// The pipeline returned normally.
    RunEnded(RunEnd),
    /// The pipeline halted with an error.
    RunFailed,
}
