//! Key-set document fetchers

use super::document::KeySetDocument;
use crate::error::{JwtError, JwtResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, error, info};
use url::Url;

/// Source of key-set documents
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Fetch and validate the document at `location`
    async fn fetch(&self, location: &Url) -> JwtResult<KeySetDocument>;
}

#[async_trait]
impl<F: KeySetFetcher + ?Sized> KeySetFetcher for Arc<F> {
    async fn fetch(&self, location: &Url) -> JwtResult<KeySetDocument> {
        (**self).fetch(location).await
    }
}

/// Plain HTTP GET, no caching and no retries
///
/// Timeouts, proxies and TLS roots are whatever the supplied
/// [`reqwest::Client`] is configured with.
#[derive(Debug, Clone, Default)]
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
}

impl HttpKeySetFetcher {
    /// Fetcher with a default client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher using the caller's client
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self, location: &Url) -> JwtResult<KeySetDocument> {
        info!(location = %location, "Fetching key set");

        let response = self
            .client
            .get(location.clone())
            .send()
            .await
            .map_err(|e| {
                error!(location = %location, error = %e, "Key set fetch failed");
                JwtError::network(format!("GET {location}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(location = %location, status = %status, "Key set endpoint returned error status");
            return Err(JwtError::network(format!("GET {location}: status {status}")));
        }

        let body = response.bytes().await.map_err(|e| {
            error!(location = %location, error = %e, "Key set body read failed");
            JwtError::network(format!("GET {location}: {e}"))
        })?;

        let document = KeySetDocument::from_slice(&body).inspect_err(|e| {
            error!(location = %location, error = %e, "Key set document rejected");
        })?;

        info!(location = %location, key_count = document.keys.len(), "Fetched key set");
        Ok(document)
    }
}

/// TTL cache in front of another fetcher, keyed by location
///
/// Failed fetches are not cached.
#[derive(Debug)]
pub struct CachingKeySetFetcher<F> {
    inner: F,
    ttl: Duration,
    entries: DashMap<String, (Instant, KeySetDocument)>,
}

impl<F: KeySetFetcher> CachingKeySetFetcher<F> {
    /// Cache documents from `inner` for `ttl`
    #[must_use]
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Drop every cached document
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn cached(&self, key: &str) -> Option<KeySetDocument> {
        let entry = self.entries.get(key)?;
        let (fetched_at, document) = entry.value();
        (fetched_at.elapsed() < self.ttl).then(|| document.clone())
    }
}

#[async_trait]
impl<F: KeySetFetcher> KeySetFetcher for CachingKeySetFetcher<F> {
    async fn fetch(&self, location: &Url) -> JwtResult<KeySetDocument> {
        if let Some(document) = self.cached(location.as_str()) {
            debug!(location = %location, "Using cached key set");
            return Ok(document);
        }
        let document = self.inner.fetch(location).await?;
        self.entries.insert(
            location.as_str().to_string(),
            (Instant::now(), document.clone()),
        );
        Ok(document)
    }
}
