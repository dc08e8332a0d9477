use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use listsweep_core::{Checkpoint, Mode, ProcessedIds, RunEnd, RunStats};
use sweep_logging::{sweep_error, sweep_info, sweep_warn};

use crate::clock::Clock;
use crate::config::SweepSettings;
use crate::error::SweepError;
use crate::processor::ItemProcessor;
use crate::progress::{ProgressBoard, ProgressSink};
use crate::remote::RemoteClient;
use crate::store::CheckpointStore;
use crate::throttle::Throttle;
use crate::types::{Entity, Operation, Page, RemoteErrorKind, SweepEvent};

/// Cooperative pause and stop flags, checked at the top of every page and before every item.
#[derive(Debug, Clone, Default)]
pub struct RunSignals {
    pause: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl RunSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn clear_pause(&self) {
        self.pause.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.clear_pause();
        self.stop.store(false, Ordering::SeqCst);
    }

    /// Stop wins over pause.
    fn interruption(&self) -> Option<RunEnd> {
        if self.is_stopped() {
            Some(RunEnd::Stopped)
        } else if self.is_paused() {
            Some(RunEnd::Paused)
        } else {
            None
        }
    }
}

/// Where the current logical run stands. Survives a pause.
#[derive(Debug, Default)]
struct RunPosition {
    mode: Mode,
    target: Option<String>,
    processed: ProcessedIds,
    /// Cursor of the page being worked on; re-fetched after a pause.
    cursor: Option<String>,
    pages: usize,
}

/// Pagination loop: fetch, dedup, process, checkpoint.
pub struct BatchPipeline {
    remote: Arc<dyn RemoteClient>,
    store: Arc<dyn CheckpointStore>,
    processor: ItemProcessor,
    throttle: Throttle,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ProgressSink>,
    board: ProgressBoard,
    signals: RunSignals,
    page_size: usize,
    quota_backoff: Duration,
    position: RunPosition,
}

impl BatchPipeline {
    pub fn new(
        remote: Arc<dyn RemoteClient>,
        store: Arc<dyn CheckpointStore>,
        settings: &SweepSettings,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Self, SweepError> {
        settings.validate()?;
        let board = ProgressBoard::new();
        let throttle = Throttle::new(settings, clock.clone(), board.clone(), sink.clone());
        Ok(Self {
            processor: ItemProcessor::new(remote.clone(), settings.quota_backoff),
            remote,
            store,
            throttle,
            clock,
            sink,
            board,
            signals: RunSignals::new(),
            page_size: settings.page_size,
            quota_backoff: settings.quota_backoff,
            position: RunPosition::default(),
        })
    }

    pub fn signals(&self) -> &RunSignals {
        &self.signals
    }

    pub fn board(&self) -> &ProgressBoard {
        &self.board
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    pub fn processed_ids(&self) -> &ProcessedIds {
        &self.position.processed
    }

    /// Starts a logical run, continuing a matching checkpoint if one exists.
    ///
    /// A missing target for a collection-writing mode is reported before
    /// anything is fetched or written.
    pub async fn run(&mut self, target: Option<&str>, mode: Mode) -> Result<RunEnd, SweepError> {
        let saved = self.store.load()?;
        let resumable = saved.filter(|checkpoint| checkpoint.resumable_for(mode, target));

        let effective_target = target
            .map(str::to_string)
            .or_else(|| resumable.as_ref().and_then(|cp| cp.target_collection_id.clone()));
        if mode.requires_target() && effective_target.is_none() {
            return Err(SweepError::MissingTarget(mode));
        }

        let (processed, mut stats) = match resumable {
            Some(checkpoint) => {
                sweep_info!(
                    "Resuming {} run from checkpoint saved {}: {} already processed",
                    mode,
                    checkpoint.saved_at,
                    checkpoint.processed_ids.len()
                );
                (checkpoint.processed_ids, checkpoint.stats)
            }
            None => {
                sweep_info!("Starting fresh {} run", mode);
                (ProcessedIds::new(), RunStats::new(mode))
            }
        };
        stats.mode = mode;
        stats.settle_total(processed.len());
        stats.time_to_next = None;
        self.board.replace(stats);

        self.position = RunPosition {
            mode,
            target: effective_target,
            processed,
            cursor: None,
            pages: 0,
        };
        self.drive().await
    }

    /// Continues after a pause with the in-memory progress, without reloading.
    pub async fn continue_run(&mut self) -> Result<RunEnd, SweepError> {
        sweep_info!(
            "Continuing {} run, {} processed so far",
            self.position.mode,
            self.position.processed.len()
        );
        // The interrupted page is fetched again; its unprocessed entities get rediscovered.
        let processed = self.position.processed.len();
        self.board.update(|stats| stats.settle_total(processed));
        self.drive().await
    }

    /// Writes the current progress as the checkpoint.
    pub fn checkpoint_now(&self) -> Result<(), SweepError> {
        let checkpoint = Checkpoint {
            processed_ids: self.position.processed.clone(),
            stats: self.board.snapshot(),
            target_collection_id: self.position.target.clone(),
            mode: self.position.mode,
            saved_at: self.clock.utc_now(),
        };
        self.store.save(&checkpoint)?;
        self.sink.emit(SweepEvent::Checkpointed {
            processed: checkpoint.processed_ids.len(),
        });
        Ok(())
    }

    async fn drive(&mut self) -> Result<RunEnd, SweepError> {
        loop {
            if let Some(end) = self.signals.interruption() {
                return self.halt(end);
            }

            let page = match self.next_page().await {
                Ok(page) => page,
                Err(err) => return self.fail(err),
            };
            self.position.pages += 1;

            if page.entities.is_empty() {
                sweep_info!("Page {} is empty; collection exhausted", self.position.pages);
                break;
            }

            let fresh = self.fresh_entities(page.entities);
            for entity in &fresh {
                if let Some(end) = self.signals.interruption() {
                    return self.halt(end);
                }
                let outcome = self
                    .processor
                    .process(
                        entity,
                        self.position.target.as_deref(),
                        self.position.mode,
                        &mut self.throttle,
                    )
                    .await;
                if let Some(err) = outcome.fatal() {
                    return self.fail(SweepError::Authentication(err.clone()));
                }

                // Failed items count as processed and are not retried.
                self.position.processed.insert(entity.id.clone());
                self.board.update(|stats| stats.record_item(outcome.tally()));
                self.sink.emit(SweepEvent::ItemProcessed {
                    entity_id: entity.id.clone(),
                    outcome,
                });
            }

            self.checkpoint_now()?;
            match page.next_cursor {
                Some(next) => self.position.cursor = Some(next),
                None => break,
            }
        }

        let stats = self.board.snapshot();
        sweep_info!(
            "Run complete: {} processed, {} added, {} removed, {} failed",
            stats.processed,
            stats.added,
            stats.removed,
            stats.failed
        );
        Ok(RunEnd::Completed)
    }

    async fn next_page(&mut self) -> Result<Page, SweepError> {
        loop {
            self.throttle.await_quota(Operation::Fetch).await;
            let result = self
                .remote
                .fetch_page(self.position.cursor.as_deref(), self.page_size)
                .await;
            match result {
                Ok(page) => {
                    self.throttle.record(Operation::Fetch);
                    return Ok(page);
                }
                Err(err) => match err.kind {
                    RemoteErrorKind::QuotaExceeded => {
                        sweep_warn!("Remote rejected page fetch on quota: {}", err);
                        self.throttle
                            .back_off(Operation::Fetch, self.quota_backoff)
                            .await;
                    }
                    RemoteErrorKind::AuthenticationFailure => {
                        return Err(SweepError::Authentication(err));
                    }
                    RemoteErrorKind::NotFound
                    | RemoteErrorKind::Forbidden
                    | RemoteErrorKind::Unavailable
                    | RemoteErrorKind::Malformed
                    | RemoteErrorKind::TransientServer
                    | RemoteErrorKind::Transport
                    | RemoteErrorKind::Protocol => return Err(SweepError::Fetch(err)),
                },
            }
        }
    }

    /// Drops entities already processed, including repeats within the page.
    fn fresh_entities(&self, entities: Vec<Entity>) -> Vec<Entity> {
        let mut in_page = HashSet::new();
        let total = entities.len();
        let fresh: Vec<Entity> = entities
            .into_iter()
            .filter(|entity| {
                !self.position.processed.contains(&entity.id) && in_page.insert(entity.id.clone())
            })
            .collect();

        self.board.update(|stats| stats.discovered(fresh.len()));
        self.sink.emit(SweepEvent::PageFetched {
            page: self.position.pages,
            fresh: fresh.len(),
            skipped: total - fresh.len(),
        });
        fresh
    }

    fn halt(&self, end: RunEnd) -> Result<RunEnd, SweepError> {
        self.checkpoint_now()?;
        sweep_info!(
            "Run {:?} after {} processed; checkpoint saved",
            end,
            self.position.processed.len()
        );
        Ok(end)
    }

    /// Commits a checkpoint before surfacing a run-halting error.
    fn fail(&self, err: SweepError) -> Result<RunEnd, SweepError> {
        sweep_error!("Run halted: {}", err);
        if let Err(save_err) = self.checkpoint_now() {
            sweep_error!("Checkpoint after halt failed too: {}", save_err);
        }
        Err(err)
    }
}
