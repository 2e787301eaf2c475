use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::normalize::normalize_payload;
use crate::error::FetchError;
use crate::types::{Item, Mode, RepositoryId, Selection};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// A remote listing of closed items for a repository.
///
/// Implementations return the decoded JSON body as-is; normalization happens in
/// [`ItemFetcher`].
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn list_closed(
        &self,
        repository: &RepositoryId,
        mode: Mode,
    ) -> Result<Value, FetchError>;
}

/// Unauthenticated GitHub REST client for commit and pull request listings.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.raw+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("markai"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn listing_url(&self, repository: &RepositoryId, mode: Mode) -> String {
        format!(
            "{}/repos/{}/{}?state=closed",
            self.base_url,
            repository,
            mode.path_segment()
        )
    }
}

#[async_trait]
impl ItemSource for GitHubSource {
    async fn list_closed(
        &self,
        repository: &RepositoryId,
        mode: Mode,
    ) -> Result<Value, FetchError> {
        let url = self.listing_url(repository, mode);
        debug!(%url, "Requesting closed items");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        // Error statuses still carry a JSON body; it normalizes to zero items.
        let bytes = response.bytes().await?;
        if !status.is_success() {
            info!(%repository, status = status.as_u16(), "Item source returned an error status");
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Fetches and normalizes items. Cheap to clone so background tasks can own one.
#[derive(Clone)]
pub struct ItemFetcher {
    source: Arc<dyn ItemSource>,
}

impl ItemFetcher {
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self { source }
    }

    /// Fetch closed items for a raw repository identifier.
    ///
    /// An empty identifier is rejected before any request is made.
    pub async fn fetch(&self, repository: &str, mode: Mode) -> Result<Vec<Item>, FetchError> {
        let repository = RepositoryId::parse(repository)?;
        self.fetch_selection(&Selection { repository, mode }).await
    }

    pub async fn fetch_selection(&self, selection: &Selection) -> Result<Vec<Item>, FetchError> {
        let payload = self
            .source
            .list_closed(&selection.repository, selection.mode)
            .await?;
        let items = normalize_payload(&payload, selection.mode)?;
        info!(
            repository = %selection.repository,
            mode = ?selection.mode,
            count = items.len(),
            "Fetched items"
        );
        Ok(items)
    }
}
