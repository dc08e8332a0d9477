use std::sync::Arc;
use std::time::Duration;

use sweep_logging::sweep_debug;
use tokio::time::Instant;

use crate::clock::Clock;
use crate::config::SweepSettings;
use crate::progress::{ProgressBoard, ProgressSink};
use crate::quota::QuotaTracker;
use crate::types::{Operation, SweepEvent};

/// Gatekeeper in front of every remote call.
///
/// Owns the quota tracker and is the only place the engine suspends for
/// time: the inter-call cooldown, quota admission and remote-reported quota
/// backoff all go through here.
pub struct Throttle {
    tracker: QuotaTracker,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    cooldown: Duration,
    last_call: Option<Instant>,
    board: ProgressBoard,
    sink: Arc<dyn ProgressSink>,
}

impl Throttle {
    pub fn new(
        settings: &SweepSettings,
        clock: Arc<dyn Clock>,
        board: ProgressBoard,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            tracker: QuotaTracker::from_settings(settings),
            clock,
            poll_interval: settings.poll_interval,
            cooldown: settings.call_cooldown,
            last_call: None,
            board,
            sink,
        }
    }

    /// Suspends until a call to `operation` may be issued.
    pub async fn await_quota(&mut self, operation: Operation) {
        self.cool_down().await;

        let mut waited = false;
        loop {
            let now = self.clock.now();
            if self.tracker.admit(operation, now) {
                break;
            }
            let remaining = self.tracker.time_until_reset(operation, now);
            self.board.set_time_to_next(Some(remaining));
            self.sink.emit(SweepEvent::Waiting {
                operation,
                remaining,
            });
            waited = true;
            self.clock.sleep(remaining.min(self.poll_interval)).await;
        }

        if waited {
            self.board.set_time_to_next(None);
        }
        self.last_call = Some(self.clock.now());
    }

    /// Accounts a successful call to `operation`.
    pub fn record(&mut self, operation: Operation) {
        self.tracker.record(operation, self.clock.now());
    }

    /// Waits out a quota the remote reported as exhausted.
    pub async fn back_off(&mut self, operation: Operation, duration: Duration) {
        self.board.set_time_to_next(Some(duration));
        self.sink.emit(SweepEvent::BackingOff {
            operation,
            duration,
        });
        self.clock.sleep(duration).await;
        self.board.set_time_to_next(None);
    }

    async fn cool_down(&self) {
        let Some(last_call) = self.last_call else {
            return;
        };
        let since = self.clock.now().saturating_duration_since(last_call);
        if since < self.cooldown {
            let gap = self.cooldown - since;
            sweep_debug!("cooling down {}ms before next call", gap.as_millis());
            self.clock.sleep(gap).await;
        }
    }
}
