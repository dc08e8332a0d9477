use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which per-item operations a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Add each entity to the target collection.
    AddOnly,
    /// Sever the relationship with each entity.
    RemoveOnly,
    /// Add to the collection, then sever the relationship.
    #[default]
    Both,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::AddOnly, Mode::RemoveOnly, Mode::Both];

    /// Modes that write into a collection need a target collection id.
    pub fn requires_target(self) -> bool {
        matches!(self, Mode::AddOnly | Mode::Both)
    }

    pub fn adds(self) -> bool {
        self.requires_target()
    }

    pub fn removes(self) -> bool {
        matches!(self, Mode::RemoveOnly | Mode::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::AddOnly => "add_only",
            Mode::RemoveOnly => "remove_only",
            Mode::Both => "both",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?} (expected add_only, remove_only or both)")]
pub struct ModeParseError(pub String);

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| ModeParseError(raw.to_string()))
    }
}
