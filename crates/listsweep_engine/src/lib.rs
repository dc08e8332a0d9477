//! Listsweep engine: quota-aware, resumable batch processing against a remote collection.
mod clock;
mod config;
mod controller;
mod error;
mod http;
mod persist;
mod pipeline;
mod processor;
mod progress;
mod quota;
mod remote;
mod store;
mod throttle;
mod types;

pub use clock::{Clock, TokioClock};
pub use config::{SweepSettings, WindowSpec};
pub use controller::{JobController, JobHandle, StartRequest};
pub use error::{SettingsError, SweepError};
pub use http::{HttpRemoteClient, HttpSettings};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use pipeline::{BatchPipeline, RunSignals};
pub use processor::{ItemOutcome, ItemProcessor, StepResult};
pub use progress::{LogProgressSink, ProgressBoard, ProgressSink};
pub use quota::QuotaTracker;
pub use remote::{Credentials, RemoteClient};
pub use store::{CheckpointStore, FileCheckpointStore, StoreError, DEFAULT_JOB_KEY};
pub use throttle::Throttle;
pub use types::{Entity, Operation, Page, RemoteError, RemoteErrorKind, SweepEvent};
