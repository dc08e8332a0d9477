use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::processor::ItemOutcome;

/// One remote account. Everything except the id is carried but never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub entities: Vec<Entity>,
    pub next_cursor: Option<String>,
}

/// Quota-accounted remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Add,
    Remove,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Add => "add",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    NotFound,
    Forbidden,
    Unavailable,
    Malformed,
    QuotaExceeded,
    TransientServer,
    AuthenticationFailure,
    Transport,
    Protocol,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::NotFound => write!(f, "not found"),
            RemoteErrorKind::Forbidden => write!(f, "forbidden"),
            RemoteErrorKind::Unavailable => write!(f, "entity unavailable"),
            RemoteErrorKind::Malformed => write!(f, "malformed request"),
            RemoteErrorKind::QuotaExceeded => write!(f, "quota exceeded"),
            RemoteErrorKind::TransientServer => write!(f, "server error"),
            RemoteErrorKind::AuthenticationFailure => write!(f, "authentication failed"),
            RemoteErrorKind::Transport => write!(f, "transport error"),
            RemoteErrorKind::Protocol => write!(f, "unexpected response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for RemoteError {}

/// Progress notifications for front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepEvent {
    PageFetched {
        page: usize,
        fresh: usize,
        skipped: usize,
    },
    ItemProcessed {
        entity_id: String,
        outcome: ItemOutcome,
    },
    /// Suspended until `operation` is admitted again.
    Waiting {
        operation: Operation,
        remaining: Duration,
    },
    /// The remote reported an exhausted quota despite local admission.
    BackingOff {
        operation: Operation,
        duration: Duration,
    },
    Checkpointed {
        processed: usize,
    },
}
