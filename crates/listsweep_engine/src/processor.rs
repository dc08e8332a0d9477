use std::sync::Arc;
use std::time::Duration;

use listsweep_core::{ItemTally, Mode};
use sweep_logging::{sweep_error, sweep_warn};

use crate::remote::RemoteClient;
use crate::throttle::Throttle;
use crate::types::{Entity, Operation, RemoteError, RemoteErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Succeeded,
    Failed(RemoteError),
}

impl StepResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Succeeded)
    }

    fn error(&self) -> Option<&RemoteError> {
        match self {
            StepResult::Succeeded => None,
            StepResult::Failed(err) => Some(err),
        }
    }
}

/// Result of applying the configured operations to one entity.
///
/// A step is `None` when the mode does not include it or a fatal error
/// stopped the item before it was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemOutcome {
    pub add: Option<StepResult>,
    pub remove: Option<StepResult>,
}

impl ItemOutcome {
    fn steps(&self) -> impl Iterator<Item = &StepResult> {
        self.add.iter().chain(self.remove.iter())
    }

    /// Every attempted step succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps().all(StepResult::is_success)
    }

    /// The session-level error that must halt the run, if any step hit one.
    pub fn fatal(&self) -> Option<&RemoteError> {
        self.steps()
            .filter_map(StepResult::error)
            .find(|err| err.kind == RemoteErrorKind::AuthenticationFailure)
    }

    pub fn tally(&self) -> ItemTally {
        ItemTally {
            added: self.add.as_ref().is_some_and(StepResult::is_success),
            removed: self.remove.as_ref().is_some_and(StepResult::is_success),
            failed: !self.succeeded(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    Add { collection: &'a str },
    Remove,
}

impl Step<'_> {
    fn operation(self) -> Operation {
        match self {
            Step::Add { .. } => Operation::Add,
            Step::Remove => Operation::Remove,
        }
    }
}

/// Applies add and/or remove to single entities, isolating their failures.
pub struct ItemProcessor {
    remote: Arc<dyn RemoteClient>,
    quota_backoff: Duration,
}

impl ItemProcessor {
    pub fn new(remote: Arc<dyn RemoteClient>, quota_backoff: Duration) -> Self {
        Self {
            remote,
            quota_backoff,
        }
    }

    /// Never fails: every error ends up in the returned outcome.
    pub async fn process(
        &self,
        entity: &Entity,
        target_collection_id: Option<&str>,
        mode: Mode,
        throttle: &mut Throttle,
    ) -> ItemOutcome {
        let mut outcome = ItemOutcome::default();

        if mode.adds() {
            let step = match target_collection_id {
                Some(collection) => {
                    self.attempt(Step::Add { collection }, &entity.id, throttle)
                        .await
                }
                None => StepResult::Failed(RemoteError::new(
                    RemoteErrorKind::Malformed,
                    "no target collection",
                )),
            };
            outcome.add = Some(step);
            if outcome.fatal().is_some() {
                return outcome;
            }
        }

        // Attempted regardless of how the add went.
        if mode.removes() {
            outcome.remove = Some(self.attempt(Step::Remove, &entity.id, throttle).await);
        }

        outcome
    }

    async fn attempt(&self, step: Step<'_>, entity_id: &str, throttle: &mut Throttle) -> StepResult {
        let operation = step.operation();
        loop {
            throttle.await_quota(operation).await;
            let result = match step {
                Step::Add { collection } => {
                    self.remote.add_to_collection(collection, entity_id).await
                }
                Step::Remove => self.remote.remove_relationship(entity_id).await,
            };

            let err = match result {
                Ok(()) => {
                    throttle.record(operation);
                    return StepResult::Succeeded;
                }
                Err(err) => err,
            };

            match err.kind {
                RemoteErrorKind::QuotaExceeded => {
                    // Local accounting is stale; wait a whole window before retrying.
                    sweep_warn!(
                        "Remote rejected {} for {} on quota: {}",
                        operation,
                        entity_id,
                        err
                    );
                    throttle.back_off(operation, self.quota_backoff).await;
                }
                RemoteErrorKind::NotFound
                | RemoteErrorKind::Forbidden
                | RemoteErrorKind::Unavailable
                | RemoteErrorKind::Malformed => {
                    sweep_warn!("Failed to {} {}: {}", operation, entity_id, err);
                    return StepResult::Failed(err);
                }
                RemoteErrorKind::AuthenticationFailure => {
                    sweep_error!("Session rejected during {} of {}: {}", operation, entity_id, err);
                    return StepResult::Failed(err);
                }
                RemoteErrorKind::TransientServer
                | RemoteErrorKind::Transport
                | RemoteErrorKind::Protocol => {
                    sweep_warn!("Unexpected error during {} of {}: {}", operation, entity_id, err);
                    return StepResult::Failed(err);
                }
            }
        }
    }
}
