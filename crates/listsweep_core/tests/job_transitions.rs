use listsweep_core::{update, Effect, JobState, Mode, Msg, RunEnd};
use pretty_assertions::assert_eq;

fn start(state: JobState) -> (JobState, Vec<Effect>) {
    update(
        state,
        Msg::StartRequested {
            mode: Mode::Both,
            target: Some("list-1".to_string()),
            resume: true,
        },
    )
}

#[test]
fn start_from_idle_launches_a_run() {
    let (state, effects) = start(JobState::Idle);
    assert_eq!(state, JobState::Running);
    assert_eq!(
        effects,
        vec![Effect::LaunchRun {
            mode: Mode::Both,
            target: Some("list-1".to_string()),
            resume: true,
        }]
    );
}

#[test]
fn start_is_ignored_while_a_run_is_live() {
    for state in [JobState::Running, JobState::Paused] {
        let (next, effects) = start(state);
        assert_eq!(next, state);
        assert!(effects.is_empty());
    }
}

#[test]
fn terminal_states_accept_a_new_run() {
    for state in [JobState::Stopped, JobState::Completed, JobState::Failed] {
        let (next, effects) = start(state);
        assert_eq!(next, JobState::Running);
        assert_eq!(effects.len(), 1);
    }
}

#[test]
fn pause_then_resume_round_trip() {
    let (state, effects) = update(JobState::Running, Msg::PauseRequested);
    assert_eq!(state, JobState::Paused);
    assert_eq!(effects, vec![Effect::RaisePause]);

    // Pipeline acknowledges the pause.
    let (state, effects) = update(state, Msg::RunEnded(RunEnd::Paused));
    assert_eq!(state, JobState::Paused);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::ResumeRequested);
    assert_eq!(state, JobState::Running);
    assert_eq!(effects, vec![Effect::ContinueRun]);
}

#[test]
fn resume_outside_pause_is_a_noop() {
    for state in [JobState::Idle, JobState::Running, JobState::Completed] {
        let (next, effects) = update(state, Msg::ResumeRequested);
        assert_eq!(next, state);
        assert!(effects.is_empty());
    }
}

#[test]
fn stop_while_running_raises_the_flag() {
    let (state, effects) = update(JobState::Running, Msg::StopRequested);
    assert_eq!(state, JobState::Stopped);
    assert_eq!(effects, vec![Effect::RaiseStop]);

    let (state, _) = update(state, Msg::RunEnded(RunEnd::Stopped));
    assert_eq!(state, JobState::Stopped);
}

#[test]
fn stop_while_paused_persists_a_final_checkpoint() {
    let (state, effects) = update(JobState::Paused, Msg::StopRequested);
    assert_eq!(state, JobState::Stopped);
    assert_eq!(effects, vec![Effect::RaiseStop, Effect::PersistCheckpoint]);
}

#[test]
fn completion_wins_over_a_late_pause() {
    let (state, _) = update(JobState::Paused, Msg::RunEnded(RunEnd::Completed));
    assert_eq!(state, JobState::Completed);
}

#[test]
fn failure_is_terminal() {
    let (state, _) = update(JobState::Running, Msg::RunFailed);
    assert_eq!(state, JobState::Failed);
    assert!(state.is_terminal());

    let (state, effects) = update(JobState::Idle, Msg::RunFailed);
    assert_eq!(state, JobState::Idle);
    assert!(effects.is_empty());
}
