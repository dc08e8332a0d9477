//! Optional RON settings file.
//!
//! Every field may be left out; missing fields keep the engine defaults.
//!
//! ```ron
//! (
//!     base_url: Some("https://api.example.com"),
//!     remove_window: Some((limit: 187, window_secs: 900)),
//!     call_cooldown_secs: Some(2),
//! )
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use listsweep_engine::{HttpSettings, SweepSettings, WindowSpec};
use serde::{Deserialize, Serialize};
use sweep_logging::sweep_info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedWindow {
    pub limit: u32,
    pub window_secs: u64,
}

impl From<PersistedWindow> for WindowSpec {
    fn from(window: PersistedWindow) -> Self {
        WindowSpec::new(window.limit, Duration::from_secs(window.window_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub base_url: Option<String>,
    pub fetch_window: Option<PersistedWindow>,
    pub remove_window: Option<PersistedWindow>,
    pub add_window: Option<PersistedWindow>,
    pub poll_interval_secs: Option<u64>,
    pub quota_backoff_secs: Option<u64>,
    pub call_cooldown_secs: Option<u64>,
    pub page_size: Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl FileSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings = ron::from_str(&content)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        sweep_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Engine settings: defaults overlaid with whatever the file sets.
    pub fn sweep_settings(&self) -> SweepSettings {
        let mut settings = SweepSettings::default();
        if let Some(window) = self.fetch_window {
            settings.fetch_window = window.into();
        }
        if let Some(window) = self.remove_window {
            settings.remove_window = window.into();
        }
        if let Some(window) = self.add_window {
            settings.add_window = Some(window.into());
        }
        if let Some(secs) = self.poll_interval_secs {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.quota_backoff_secs {
            settings.quota_backoff = Duration::from_secs(secs);
        }
        if let Some(secs) = self.call_cooldown_secs {
            settings.call_cooldown = Duration::from_secs(secs);
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size;
        }
        settings
    }

    pub fn http_settings(&self, base_url: String) -> HttpSettings {
        let mut settings = HttpSettings::new(base_url);
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        settings
    }
}
