use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::remote::{Credentials, RemoteClient};
use crate::types::{Entity, Page, RemoteError, RemoteErrorKind};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    data: Vec<Entity>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedCollection {
    id: String,
}

/// Some deployments wrap the created record in `data`, some return it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedBody {
    Wrapped { data: CreatedCollection },
    Bare(CreatedCollection),
}

/// JSON-over-HTTP client for the remote account API, bearer-token authenticated.
pub struct HttpRemoteClient {
    base: Url,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpRemoteClient {
    pub fn new(settings: HttpSettings) -> Result<Self, RemoteError> {
        let base = Url::parse(&settings.base_url).map_err(|err| {
            RemoteError::new(
                RemoteErrorKind::Malformed,
                format!("invalid base url {}: {err}", settings.base_url),
            )
        })?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::new(
                RemoteErrorKind::Malformed,
                format!("base url {} cannot carry a path", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RemoteError::new(RemoteErrorKind::Transport, err.to_string()))?;
        Ok(Self {
            base,
            client,
            token: RwLock::new(None),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<u8>, RemoteError> {
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|err| RemoteError::new(RemoteErrorKind::Malformed, err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(
                classify_status(status),
                format!("{status} {}", detail.trim()).trim().to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T, RemoteError> {
        let bytes = self.send(method, url, body).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| RemoteError::new(RemoteErrorKind::Protocol, err.to_string()))
    }
}

#[async_trait::async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), RemoteError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(credentials.token.clone());
        let result = self.send(Method::GET, self.url(&["session"]), None).await;
        if result.is_err() {
            *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
        result.map(|_| ())
    }

    async fn fetch_page(&self, cursor: Option<&str>, page_size: usize) -> Result<Page, RemoteError> {
        let mut url = self.url(&["following"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        let body: PageBody = self.send_json(Method::GET, url, None).await?;
        Ok(Page {
            entities: body.data,
            next_cursor: body.meta.next_token.filter(|token| !token.is_empty()),
        })
    }

    async fn add_to_collection(
        &self,
        collection_id: &str,
        entity_id: &str,
    ) -> Result<(), RemoteError> {
        let url = self.url(&["collections", collection_id, "members"]);
        self.send(Method::POST, url, Some(json!({ "entity_id": entity_id })))
            .await
            .map(|_| ())
    }

    async fn remove_relationship(&self, entity_id: &str) -> Result<(), RemoteError> {
        let url = self.url(&["following", entity_id]);
        self.send(Method::DELETE, url, None).await.map(|_| ())
    }

    async fn create_collection(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
    ) -> Result<String, RemoteError> {
        let body = json!({
            "name": name,
            "description": description,
            "private": is_private,
        });
        let created: CreatedBody = self
            .send_json(Method::POST, self.url(&["collections"]), Some(body))
            .await?;
        Ok(match created {
            CreatedBody::Wrapped { data } | CreatedBody::Bare(data) => data.id,
        })
    }
}

fn classify_status(status: StatusCode) -> RemoteErrorKind {
    match status.as_u16() {
        401 => RemoteErrorKind::AuthenticationFailure,
        403 => RemoteErrorKind::Forbidden,
        404 => RemoteErrorKind::NotFound,
        410 => RemoteErrorKind::Unavailable,
        400 | 422 => RemoteErrorKind::Malformed,
        429 => RemoteErrorKind::QuotaExceeded,
        500..=599 => RemoteErrorKind::TransientServer,
        _ => RemoteErrorKind::Protocol,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    RemoteError::new(RemoteErrorKind::Transport, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_closed_kinds() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            RemoteErrorKind::AuthenticationFailure
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            RemoteErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            RemoteErrorKind::TransientServer
        );
        assert_eq!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY),
            RemoteErrorKind::Malformed
        );
        assert_eq!(classify_status(StatusCode::IM_A_TEAPOT), RemoteErrorKind::Protocol);
    }

    #[test]
    fn urls_keep_base_path_and_escape_ids() {
        let client = HttpRemoteClient::new(HttpSettings::new("http://api.example.com/root/"))
            .expect("client");
        let url = client.url(&["following", "a/b"]);
        assert_eq!(url.as_str(), "http://api.example.com/root/v1/following/a%2Fb");
    }
}
