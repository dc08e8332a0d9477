/// Lifecycle of the job controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
    Completed,
    /// The last run halted on an authentication, fetch or checkpoint error.
    Failed,
}

impl JobState {
    /// Stopped, Completed and Failed end a logical run.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Stopped | JobState::Completed | JobState::Failed)
    }

    pub fn accepts_start(self) -> bool {
        self == JobState::Idle || self.is_terminal()
    }
}

/// How a pipeline run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The collection was exhausted.
    Completed,
    /// A pause was observed; in-memory progress is kept for resume.
    Paused,
    /// A stop was observed.
    Stopped,
}
