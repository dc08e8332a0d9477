use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use listsweep_core::{Checkpoint, Mode, ProcessedIds, RunStats};
use serde::{Deserialize, Serialize};
use sweep_logging::{sweep_debug, sweep_info};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

/// Job key used when a front end does not pick one.
pub const DEFAULT_JOB_KEY: &str = "listsweep_state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading checkpoint {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing checkpoint: {0}")]
    Persist(#[from] PersistError),
    #[error("checkpoint {path:?} is not valid: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding checkpoint: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Durable home of the single in-progress job's checkpoint.
pub trait CheckpointStore: Send + Sync {
    /// `Ok(None)` when no checkpoint has been saved.
    fn load(&self) -> Result<Option<Checkpoint>, StoreError>;

    /// Replaces any previous checkpoint.
    fn save(&self, checkpoint: &Checkpoint) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PersistedMode {
    AddOnly,
    RemoveOnly,
    Both,
}

impl From<Mode> for PersistedMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::AddOnly => PersistedMode::AddOnly,
            Mode::RemoveOnly => PersistedMode::RemoveOnly,
            Mode::Both => PersistedMode::Both,
        }
    }
}

impl From<PersistedMode> for Mode {
    fn from(mode: PersistedMode) -> Self {
        match mode {
            PersistedMode::AddOnly => Mode::AddOnly,
            PersistedMode::RemoveOnly => Mode::RemoveOnly,
            PersistedMode::Both => Mode::Both,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedStats {
    total: u64,
    processed: u64,
    added: u64,
    removed: u64,
    failed: u64,
    mode: PersistedMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedCheckpoint {
    processed_ids: Vec<String>,
    stats: PersistedStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_collection_id: Option<String>,
    mode: PersistedMode,
    saved_at: DateTime<Utc>,
}

impl From<&Checkpoint> for PersistedCheckpoint {
    fn from(checkpoint: &Checkpoint) -> Self {
        let stats = &checkpoint.stats;
        Self {
            processed_ids: checkpoint.processed_ids.to_vec(),
            stats: PersistedStats {
                total: stats.total,
                processed: stats.processed,
                added: stats.added,
                removed: stats.removed,
                failed: stats.failed,
                mode: stats.mode.into(),
            },
            target_collection_id: checkpoint.target_collection_id.clone(),
            mode: checkpoint.mode.into(),
            saved_at: checkpoint.saved_at,
        }
    }
}

impl From<PersistedCheckpoint> for Checkpoint {
    fn from(persisted: PersistedCheckpoint) -> Self {
        let stats = persisted.stats;
        Checkpoint {
            processed_ids: persisted.processed_ids.into_iter().collect::<ProcessedIds>(),
            stats: RunStats {
                mode: stats.mode.into(),
                total: stats.total,
                processed: stats.processed,
                added: stats.added,
                removed: stats.removed,
                failed: stats.failed,
                time_to_next: None,
            },
            target_collection_id: persisted.target_collection_id,
            mode: persisted.mode.into(),
            saved_at: persisted.saved_at,
        }
    }
}

/// Stores the checkpoint as pretty JSON at `<dir>/<job_key>.json`.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    writer: AtomicFileWriter,
    filename: String,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>, job_key: &str) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
            filename: format!("{job_key}.json"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(&self.filename)
    }

    fn read(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>, StoreError> {
        let path = self.path();
        let Some(content) = Self::read(&path)? else {
            sweep_debug!("No checkpoint at {:?}", path);
            return Ok(None);
        };
        let persisted: PersistedCheckpoint =
            serde_json::from_str(&content).map_err(|source| StoreError::Decode {
                path: path.clone(),
                source,
            })?;
        sweep_info!(
            "Loaded checkpoint from {:?}: {} processed, mode {:?}",
            path,
            persisted.processed_ids.len(),
            persisted.mode
        );
        Ok(Some(persisted.into()))
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let persisted = PersistedCheckpoint::from(checkpoint);
        let content = serde_json::to_vec_pretty(&persisted).map_err(StoreError::Encode)?;
        self.writer.write(&self.filename, &content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.writer.remove(&self.filename)?;
        sweep_info!("Cleared checkpoint {:?}", self.path());
        Ok(())
    }
}
