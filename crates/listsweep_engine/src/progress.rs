use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use listsweep_core::RunStats;
use sweep_logging::{sweep_debug, sweep_info};

use crate::types::SweepEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: SweepEvent);
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: SweepEvent) {
        match event {
            SweepEvent::PageFetched {
                page,
                fresh,
                skipped,
            } => sweep_info!("page {} fetched: {} fresh, {} already processed", page, fresh, skipped),
            SweepEvent::ItemProcessed { entity_id, outcome } => {
                sweep_debug!("entity {} done, success={}", entity_id, outcome.succeeded())
            }
            SweepEvent::Waiting {
                operation,
                remaining,
            } => sweep_info!("waiting for {} quota, {}s until reset", operation, remaining.as_secs()),
            SweepEvent::BackingOff {
                operation,
                duration,
            } => sweep_info!("backing off {} for {}s", operation, duration.as_secs()),
            SweepEvent::Checkpointed { processed } => {
                sweep_debug!("checkpoint written, {} processed", processed)
            }
        }
    }
}

/// Shared, always-current copy of the run statistics.
///
/// The pipeline mutates it; controllers and front ends read snapshots.
#[derive(Debug, Clone, Default)]
pub struct ProgressBoard {
    stats: Arc<Mutex<RunStats>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RunStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, stats: RunStats) {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = stats;
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut RunStats) -> R) -> R {
        let mut guard = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn set_time_to_next(&self, remaining: Option<Duration>) {
        self.update(|stats| stats.time_to_next = remaining);
    }
}
