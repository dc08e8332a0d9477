use std::time::Duration;

use crate::Mode;

/// Running counters for the active job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    pub mode: Mode,
    /// Distinct entities discovered so far: processed plus pending in the current page.
    pub total: u64,
    pub processed: u64,
    pub added: u64,
    pub removed: u64,
    pub failed: u64,
    /// Remaining wait while suspended on a quota. Never persisted.
    pub time_to_next: Option<Duration>,
}

/// What happened to one entity, reduced to the counters it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemTally {
    pub added: bool,
    pub removed: bool,
    pub failed: bool,
}

impl RunStats {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn record_item(&mut self, tally: ItemTally) {
        self.processed += 1;
        if tally.added {
            self.added += 1;
        }
        if tally.removed {
            self.removed += 1;
        }
        if tally.failed {
            self.failed += 1;
        }
    }

    pub fn discovered(&mut self, fresh: usize) {
        self.total += fresh as u64;
    }

    /// Drop pending-but-unprocessed entities from `total`.
    ///
    /// Used when a run is seeded from a checkpoint written mid-page.
    pub fn settle_total(&mut self, processed_ids: usize) {
        self.total = processed_ids as u64;
    }

    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.processed)
    }
}
