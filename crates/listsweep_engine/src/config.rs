use std::time::Duration;

use crate::error::SettingsError;
use crate::types::Operation;

/// Fixed-window quota: at most `limit` calls per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub limit: u32,
    pub window: Duration,
}

impl WindowSpec {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }
}

/// Tuning for quota accounting, suspension and pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSettings {
    pub fetch_window: WindowSpec,
    pub remove_window: WindowSpec,
    /// Adds are unlimited unless a window is configured.
    pub add_window: Option<WindowSpec>,
    /// Upper bound on a single sleep while waiting for admission.
    pub poll_interval: Duration,
    /// Wait after the remote reports an exhausted quota despite local admission.
    pub quota_backoff: Duration,
    /// Minimum gap between consecutive remote calls.
    pub call_cooldown: Duration,
    pub page_size: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        // Remote windows are 15 minutes.
        let window = Duration::from_secs(900);
        Self {
            fetch_window: WindowSpec::new(500, window),
            remove_window: WindowSpec::new(187, window),
            add_window: None,
            poll_interval: Duration::from_secs(60),
            quota_backoff: window,
            call_cooldown: Duration::from_secs(1),
            page_size: 200,
        }
    }
}

impl SweepSettings {
    /// Registered windows, keyed by operation.
    pub fn windows(&self) -> Vec<(Operation, WindowSpec)> {
        let mut windows = vec![
            (Operation::Fetch, self.fetch_window),
            (Operation::Remove, self.remove_window),
        ];
        if let Some(add) = self.add_window {
            windows.push((Operation::Add, add));
        }
        windows
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (operation, spec) in self.windows() {
            if spec.limit == 0 {
                return Err(SettingsError::ZeroLimit(operation));
            }
            if spec.window.is_zero() {
                return Err(SettingsError::ZeroWindow(operation));
            }
        }
        if self.page_size == 0 {
            return Err(SettingsError::ZeroPageSize);
        }
        if self.poll_interval.is_zero() {
            return Err(SettingsError::ZeroPollInterval);
        }
        Ok(())
    }
}
