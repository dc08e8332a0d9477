use chrono::{DateTime, Utc};

use crate::{Mode, ProcessedIds, RunStats};

/// Durable snapshot of job progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub processed_ids: ProcessedIds,
    pub stats: RunStats,
    pub target_collection_id: Option<String>,
    pub mode: Mode,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Whether a run in `mode` may continue from this checkpoint.
    ///
    /// The mode must match. For modes that write to a collection, an explicit
    /// `target` must also match the recorded one; `None` accepts the recorded
    /// target.
    pub fn resumable_for(&self, mode: Mode, target: Option<&str>) -> bool {
        if self.mode != mode {
            return false;
        }
        if !mode.requires_target() {
            return true;
        }
        match (target, self.target_collection_id.as_deref()) {
            (Some(requested), Some(recorded)) => requested == recorded,
            (Some(_), None) => false,
            (None, recorded) => recorded.is_some(),
        }
    }
}
