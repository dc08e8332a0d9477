use crate::{Effect, JobState, Msg, RunEnd};

/// Pure update function: applies a message to the job state and returns any effects.
pub fn update(state: JobState, msg: Msg) -> (JobState, Vec<Effect>) {
    match msg {
        Msg::StartRequested {
            mode,
            target,
            resume,
        } => {
            if !state.accepts_start() {
                return (state, Vec::new());
            }
            (
                JobState::Running,
                vec![Effect::LaunchRun {
                    mode,
                    target,
                    resume,
                }],
            )
        }
        Msg::PauseRequested => match state {
            JobState::Running => (JobState::Paused, vec![Effect::RaisePause]),
            _ => (state, Vec::new()),
        },
        Msg::ResumeRequested => match state {
            JobState::Paused => (JobState::Running, vec![Effect::ContinueRun]),
            _ => (state, Vec::new()),
        },
        Msg::StopRequested => match state {
            JobState::Running => (JobState::Stopped, vec![Effect::RaiseStop]),
            // The pipeline has already returned; the controller writes the final checkpoint.
            JobState::Paused => (
                JobState::Stopped,
                vec![Effect::RaiseStop, Effect::PersistCheckpoint],
            ),
            _ => (state, Vec::new()),
        },
        Msg::RunEnded(end) => (after_run(state, end), Vec::new()),
        Msg::RunFailed => match state {
            JobState::Idle => (state, Vec::new()),
            _ => (JobState::Failed, Vec::new()),
        },
    }
}

fn after_run(state: JobState, end: RunEnd) -> JobState {
    match (state, end) {
        (JobState::Idle, _) | (JobState::Failed, _) | (JobState::Completed, _) => state,
        (_, RunEnd::Completed) => JobState::Completed,
        (JobState::Stopped, _) | (_, RunEnd::Stopped) => JobState::Stopped,
        (_, RunEnd::Paused) => JobState::Paused,
    }
}
