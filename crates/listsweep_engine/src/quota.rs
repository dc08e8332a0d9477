use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{SweepSettings, WindowSpec};
use crate::types::Operation;

#[derive(Debug, Clone)]
struct QuotaWindow {
    spec: WindowSpec,
    count: u32,
    /// `None` until the first accounted check; treated as already expired.
    reset_at: Option<Instant>,
}

impl QuotaWindow {
    fn new(spec: WindowSpec) -> Self {
        Self {
            spec,
            count: 0,
            reset_at: None,
        }
    }

    fn roll(&mut self, now: Instant) {
        let expired = self.reset_at.map_or(true, |reset_at| now >= reset_at);
        if expired {
            self.count = 0;
            self.reset_at = Some(now + self.spec.window);
        }
    }
}

/// Fixed-window call counters, one per registered operation.
///
/// Unregistered operations are always admitted. Time is supplied by the
/// caller, so the tracker is a pure function of the given instants and its
/// call history.
#[derive(Debug, Clone, Default)]
pub struct QuotaTracker {
    windows: HashMap<Operation, QuotaWindow>,
}

impl QuotaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &SweepSettings) -> Self {
        let mut tracker = Self::new();
        for (operation, spec) in settings.windows() {
            tracker.register(operation, spec);
        }
        tracker
    }

    /// Registers (or replaces) the window for `operation`, starting empty.
    pub fn register(&mut self, operation: Operation, spec: WindowSpec) {
        self.windows.insert(operation, QuotaWindow::new(spec));
    }

    pub fn admit(&mut self, operation: Operation, now: Instant) -> bool {
        match self.windows.get_mut(&operation) {
            Some(window) => {
                window.roll(now);
                window.count < window.spec.limit
            }
            None => true,
        }
    }

    /// Accounts one successful call.
    pub fn record(&mut self, operation: Operation, now: Instant) {
        if let Some(window) = self.windows.get_mut(&operation) {
            window.roll(now);
            window.count = window.count.saturating_add(1);
        }
    }

    pub fn time_until_reset(&self, operation: Operation, now: Instant) -> Duration {
        self.windows
            .get(&operation)
            .and_then(|window| window.reset_at)
            .map_or(Duration::ZERO, |reset_at| {
                reset_at.saturating_duration_since(now)
            })
    }

    /// Calls made in the current window, if `operation` is registered.
    pub fn used(&self, operation: Operation) -> Option<u32> {
        self.windows.get(&operation).map(|window| window.count)
    }
}
