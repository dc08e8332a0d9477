#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use listsweep_engine::{
    BatchPipeline, Clock, Credentials, Entity, FileCheckpointStore, JobController, Page,
    ProgressSink, RemoteClient, RemoteError, RemoteErrorKind, SweepEvent, SweepSettings,
};
use tempfile::TempDir;
use tokio::time::Instant;

/// Virtual clock: `sleep` advances time instantly and is recorded.
///
/// Wall-clock time starts at the Unix epoch.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap();
        DateTime::<Utc>::UNIX_EPOCH + elapsed
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.offset.lock().unwrap() += duration;
        // Let hooks and handles on the same runtime observe the suspension point.
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    Authenticate,
    Fetch(Option<String>),
    Add { collection: String, entity: String },
    Remove(String),
    Create(String),
}

impl Call {
    pub fn add(collection: &str, entity: &str) -> Self {
        Call::Add {
            collection: collection.to_string(),
            entity: entity.to_string(),
        }
    }

    pub fn remove(entity: &str) -> Self {
        Call::Remove(entity.to_string())
    }
}

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct FakeState {
    pages: Vec<Vec<String>>,
    add_failures: HashMap<String, VecDeque<RemoteErrorKind>>,
    remove_failures: HashMap<String, VecDeque<RemoteErrorKind>>,
    fetch_failures: HashMap<usize, VecDeque<RemoteErrorKind>>,
    calls: Vec<Call>,
}

/// Scripted remote: pages are addressed by cursors `page-1`, `page-2`, ...
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
    hooks: Mutex<Vec<(Call, Hook)>>,
}

impl FakeRemote {
    pub fn with_pages(pages: &[&[&str]]) -> Self {
        let remote = FakeRemote::default();
        remote.state.lock().unwrap().pages = pages
            .iter()
            .map(|page| page.iter().map(|id| id.to_string()).collect())
            .collect();
        remote
    }

    pub fn fail_add(&self, entity: &str, kind: RemoteErrorKind) -> &Self {
        self.state
            .lock()
            .unwrap()
            .add_failures
            .entry(entity.to_string())
            .or_default()
            .push_back(kind);
        self
    }

    pub fn fail_remove(&self, entity: &str, kind: RemoteErrorKind) -> &Self {
        self.state
            .lock()
            .unwrap()
            .remove_failures
            .entry(entity.to_string())
            .or_default()
            .push_back(kind);
        self
    }

    /// Fails the fetch of the zero-based page `index`.
    pub fn fail_fetch(&self, index: usize, kind: RemoteErrorKind) -> &Self {
        self.state
            .lock()
            .unwrap()
            .fetch_failures
            .entry(index)
            .or_default()
            .push_back(kind);
        self
    }

    /// Runs `hook` once, after the next successful `call`.
    pub fn on_call(&self, call: Call, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.lock().unwrap().push((call, Box::new(hook)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    fn log(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn fire(&self, call: &Call) {
        self.hooks.lock().unwrap().retain(|(trigger, hook)| {
            if trigger == call {
                hook();
                false
            } else {
                true
            }
        });
    }

    fn scripted(
        failures: &mut HashMap<String, VecDeque<RemoteErrorKind>>,
        entity: &str,
    ) -> Option<RemoteError> {
        failures
            .get_mut(entity)
            .and_then(VecDeque::pop_front)
            .map(|kind| RemoteError::new(kind, format!("scripted for {entity}")))
    }
}

#[async_trait::async_trait]
impl RemoteClient for FakeRemote {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<(), RemoteError> {
        self.log(Call::Authenticate);
        Ok(())
    }

    async fn fetch_page(&self, cursor: Option<&str>, _page_size: usize) -> Result<Page, RemoteError> {
        self.log(Call::Fetch(cursor.map(str::to_string)));
        let mut state = self.state.lock().unwrap();
        let index = match cursor {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| RemoteError::new(RemoteErrorKind::Protocol, "bad cursor"))?,
        };
        if let Some(kind) = state
            .fetch_failures
            .get_mut(&index)
            .and_then(VecDeque::pop_front)
        {
            return Err(RemoteError::new(kind, format!("scripted for page {index}")));
        }
        let Some(ids) = state.pages.get(index) else {
            return Ok(Page::default());
        };
        let entities = ids.iter().map(Entity::new).collect();
        let next_cursor = (index + 1 < state.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(Page {
            entities,
            next_cursor,
        })
    }

    async fn add_to_collection(
        &self,
        collection_id: &str,
        entity_id: &str,
    ) -> Result<(), RemoteError> {
        let call = Call::add(collection_id, entity_id);
        self.log(call.clone());
        let failure = Self::scripted(&mut self.state.lock().unwrap().add_failures, entity_id);
        if let Some(err) = failure {
            return Err(err);
        }
        self.fire(&call);
        Ok(())
    }

    async fn remove_relationship(&self, entity_id: &str) -> Result<(), RemoteError> {
        let call = Call::remove(entity_id);
        self.log(call.clone());
        let failure = Self::scripted(&mut self.state.lock().unwrap().remove_failures, entity_id);
        if let Some(err) = failure {
            return Err(err);
        }
        self.fire(&call);
        Ok(())
    }

    async fn create_collection(
        &self,
        name: &str,
        _description: Option<&str>,
        _is_private: bool,
    ) -> Result<String, RemoteError> {
        self.log(Call::Create(name.to_string()));
        Ok(format!("collection-{name}"))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SweepEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SweepEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<(listsweep_engine::Operation, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SweepEvent::Waiting {
                    operation,
                    remaining,
                } => Some((operation, remaining)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: SweepEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Settings with no inter-call cooldown so only quota waits show up as sleeps.
pub fn quick_settings() -> SweepSettings {
    SweepSettings {
        call_cooldown: Duration::ZERO,
        page_size: 2,
        ..SweepSettings::default()
    }
}

pub struct Harness {
    pub remote: Arc<FakeRemote>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<FileCheckpointStore>,
    pub sink: Arc<RecordingSink>,
    _dir: TempDir,
}

impl Harness {
    pub fn new(remote: FakeRemote) -> Self {
        sweep_logging::initialize_for_tests();
        let dir = TempDir::new().unwrap();
        Self {
            remote: Arc::new(remote),
            clock: Arc::new(ManualClock::new()),
            store: Arc::new(FileCheckpointStore::new(dir.path(), "test_job")),
            sink: Arc::new(RecordingSink::default()),
            _dir: dir,
        }
    }

    pub fn pipeline(&self, settings: &SweepSettings) -> BatchPipeline {
        BatchPipeline::new(
            self.remote.clone(),
            self.store.clone(),
            settings,
            self.clock.clone(),
            self.sink.clone(),
        )
        .unwrap()
    }

    pub fn controller(&self, settings: &SweepSettings) -> JobController {
        JobController::new(self.pipeline(settings))
    }
}
