use std::sync::{Arc, Mutex, PoisonError};

use listsweep_core::{update, Checkpoint, Effect, JobState, Mode, Msg, RunEnd, RunStats};
use sweep_logging::{sweep_debug, sweep_info};

use crate::error::SweepError;
use crate::pipeline::{BatchPipeline, RunSignals};
use crate::progress::ProgressBoard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub mode: Mode,
    /// Falls back to the checkpoint's target when resuming.
    pub target: Option<String>,
    /// Continue a matching checkpoint instead of discarding it.
    pub resume: bool,
}

impl StartRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            target: None,
            resume: true,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn fresh(mut self) -> Self {
        self.resume = false;
        self
    }
}

/// Cloneable view of a controller for other tasks, such as signal handlers.
#[derive(Debug, Clone)]
pub struct JobHandle {
    state: Arc<Mutex<JobState>>,
    signals: RunSignals,
    board: ProgressBoard,
}

impl JobHandle {
    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn progress_snapshot(&self) -> RunStats {
        self.board.snapshot()
    }

    /// Asks the running pipeline to pause at its next check; does not block.
    pub fn pause(&self) {
        self.dispatch(Msg::PauseRequested);
    }

    /// Asks the running pipeline to stop at its next check; does not block.
    ///
    /// A paused run already committed its checkpoint when it paused;
    /// [`JobController::stop`] rewrites it.
    pub fn stop(&self) {
        for effect in self.dispatch(Msg::StopRequested) {
            sweep_debug!("Stop from handle leaves {:?} to the controller", effect);
        }
    }

    /// Applies `msg`, raises any flags it calls for and returns the remaining effects.
    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, effects) = update(*state, msg);
        if next != *state {
            sweep_debug!("Job state {:?} -> {:?}", *state, next);
        }
        *state = next;
        drop(state);

        let mut remaining = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::RaisePause => self.signals.pause(),
                Effect::RaiseStop => self.signals.stop(),
                other => remaining.push(other),
            }
        }
        remaining
    }
}

/// Owns the pipeline and drives it through start, pause, resume and stop.
///
/// Checkpoints are the only memory carried between logical runs.
pub struct JobController {
    pipeline: BatchPipeline,
    handle: JobHandle,
}

impl JobController {
    pub fn new(pipeline: BatchPipeline) -> Self {
        let handle = JobHandle {
            state: Arc::new(Mutex::new(JobState::Idle)),
            signals: pipeline.signals().clone(),
            board: pipeline.board().clone(),
        };
        Self { pipeline, handle }
    }

    pub fn handle(&self) -> JobHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> JobState {
        self.handle.state()
    }

    pub fn progress_snapshot(&self) -> RunStats {
        self.handle.progress_snapshot()
    }

    pub fn saved_checkpoint(&self) -> Result<Option<Checkpoint>, SweepError> {
        Ok(self.pipeline.store().load()?)
    }

    pub fn has_resumable_checkpoint(&self, mode: Mode) -> Result<bool, SweepError> {
        Ok(self
            .saved_checkpoint()?
            .is_some_and(|checkpoint| checkpoint.resumable_for(mode, None)))
    }

    /// Runs until the collection is exhausted, or a pause, stop or halting error.
    pub async fn start(&mut self, request: StartRequest) -> Result<RunEnd, SweepError> {
        let state = self.state();
        if !state.accepts_start() {
            return Err(SweepError::InvalidState {
                action: "start",
                state,
            });
        }
        let target = self.resolve_target(&request)?;

        self.handle.signals.reset();
        let effects = self.handle.dispatch(Msg::StartRequested {
            mode: request.mode,
            target,
            resume: request.resume,
        });
        self.execute(effects).await
    }

    pub fn pause(&self) {
        self.handle.pause();
    }

    /// Re-enters a paused run without reloading its checkpoint.
    pub async fn resume(&mut self) -> Result<RunEnd, SweepError> {
        let state = self.state();
        let effects = self.handle.dispatch(Msg::ResumeRequested);
        if effects.is_empty() {
            return Err(SweepError::InvalidState {
                action: "resume",
                state,
            });
        }
        self.execute(effects).await
    }

    /// Stops the job; when paused, writes the final checkpoint here.
    pub async fn stop(&mut self) -> Result<(), SweepError> {
        let effects = self.handle.dispatch(Msg::StopRequested);
        self.execute(effects).await.map(|_| ())
    }

    /// Discards the checkpoint and the in-memory statistics.
    pub fn reset(&mut self) -> Result<(), SweepError> {
        let state = self.state();
        if matches!(state, JobState::Running | JobState::Paused) {
            return Err(SweepError::InvalidState {
                action: "reset",
                state,
            });
        }
        self.pipeline.store().clear()?;
        self.handle.board.replace(RunStats::default());
        Ok(())
    }

    /// Config errors surface here, before the state machine sees the request.
    fn resolve_target(&self, request: &StartRequest) -> Result<Option<String>, SweepError> {
        if request.target.is_some() || !request.mode.requires_target() {
            return Ok(request.target.clone());
        }
        if request.resume {
            if let Some(checkpoint) = self.saved_checkpoint()? {
                if checkpoint.resumable_for(request.mode, None) {
                    return Ok(checkpoint.target_collection_id);
                }
            }
        }
        Err(SweepError::MissingTarget(request.mode))
    }

    async fn execute(&mut self, effects: Vec<Effect>) -> Result<RunEnd, SweepError> {
        let mut end = None;
        for effect in effects {
            match effect {
                Effect::LaunchRun {
                    mode,
                    target,
                    resume,
                } => {
                    let result = self.launch(mode, target.as_deref(), resume).await;
                    end = Some(self.settle(result)?);
                }
                Effect::ContinueRun => {
                    self.handle.signals.clear_pause();
                    let result = self.pipeline.continue_run().await;
                    end = Some(self.settle(result)?);
                }
                Effect::PersistCheckpoint => {
                    self.pipeline.checkpoint_now()?;
                    end = Some(RunEnd::Stopped);
                }
                // Applied by the handle during dispatch.
                Effect::RaisePause | Effect::RaiseStop => {}
            }
        }
        Ok(end.unwrap_or(match self.state() {
            JobState::Paused => RunEnd::Paused,
            JobState::Completed => RunEnd::Completed,
            _ => RunEnd::Stopped,
        }))
    }

    async fn launch(
        &mut self,
        mode: Mode,
        target: Option<&str>,
        resume: bool,
    ) -> Result<RunEnd, SweepError> {
        if !resume {
            sweep_info!("Fresh start requested; discarding any checkpoint");
            self.pipeline.store().clear()?;
        }
        self.pipeline.run(target, mode).await
    }

    fn settle(&self, result: Result<RunEnd, SweepError>) -> Result<RunEnd, SweepError> {
        match result {
            Ok(end) => {
                self.handle.dispatch(Msg::RunEnded(end));
                Ok(end)
            }
            Err(err) => {
                self.handle.dispatch(Msg::RunFailed);
                Err(err)
            }
        }
    }
}
