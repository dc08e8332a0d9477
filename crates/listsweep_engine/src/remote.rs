use std::fmt;

use crate::types::{Page, RemoteError};

/// Secret used to open a remote session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The remote account API as seen by the engine.
///
/// Implementations classify every failure into a [`crate::RemoteErrorKind`];
/// the engine never inspects transport details.
#[async_trait::async_trait]
pub trait RemoteClient: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), RemoteError>;

    /// Fetches the page after `cursor` (the first page when `None`).
    async fn fetch_page(&self, cursor: Option<&str>, page_size: usize) -> Result<Page, RemoteError>;

    async fn add_to_collection(
        &self,
        collection_id: &str,
        entity_id: &str,
    ) -> Result<(), RemoteError>;

    async fn remove_relationship(&self, entity_id: &str) -> Result<(), RemoteError>;

    /// Returns the new collection's id.
    async fn create_collection(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
    ) -> Result<String, RemoteError>;
}
