use crate::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Seed the pipeline (from a checkpoint when `resume` allows) and run it.
    LaunchRun {
        mode: Mode,
        target: Option<String>,
        resume: bool,
    },
    /// Set the pause flag observed by the pipeline.
    RaisePause,
    /// Clear the pause flag and re-enter the pipeline with its in-memory progress.
    ContinueRun,
    /// Set the stop flag observed by the pipeline.
    RaiseStop,
    /// Write the current progress as a checkpoint.
    PersistCheckpoint,
}
