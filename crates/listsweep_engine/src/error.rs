use listsweep_core::{JobState, Mode};
use thiserror::Error;

use crate::store::StoreError;
use crate::types::{Operation, RemoteError};

/// Conditions that halt a run or prevent it from starting.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("mode {0} needs a target collection id")]
    MissingTarget(Mode),
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("authentication failed: {0}")]
    Authentication(RemoteError),
    #[error("fetching the next page failed: {0}")]
    Fetch(RemoteError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] StoreError),
    #[error("cannot {action} while the job is {state:?}")]
    InvalidState {
        action: &'static str,
        state: JobState,
    },
}

impl SweepError {
    /// Configuration errors are raised before any work and never checkpointed.
    pub fn is_config(&self) -> bool {
        matches!(self, SweepError::MissingTarget(_) | SweepError::Settings(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("quota limit for {0} must be greater than zero")]
    ZeroLimit(Operation),
    #[error("quota window for {0} must be longer than zero")]
    ZeroWindow(Operation),
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("poll interval must be longer than zero")]
    ZeroPollInterval,
}
