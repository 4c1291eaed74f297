//! Hosted storage backend reached over HTTP.
//!
//! Documents live in a storage bucket of a backend-as-a-service. Access goes
//! through signed URLs: the store asks the backend to sign a locator for a
//! limited time, then downloads from the returned URL.
//!
//! ```text
//! POST {base}/storage/v1/object/sign/{bucket}/{locator}   {"expiresIn": 3600}
//!   -> {"signedURL": "/object/sign/{bucket}/{locator}?token=..."}
//! GET  {base}/storage/v1/object/sign/{bucket}/{locator}?token=...
//!   -> PDF bytes
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_SIGNED_URL_TTL_SECS, DocumentStore, StoreResult};
use crate::error::StoreError;

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStoreConfig {
    /// Backend base URL, e.g. `https://project.example.co`.
    pub base_url: String,
    /// Storage bucket holding the documents.
    pub bucket: String,
    /// API key sent as bearer token and `apikey` header.
    pub api_key: Option<String>,
    /// Signed URL validity window in seconds.
    pub signed_url_ttl: u64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpStoreConfig {
    /// Create a config with default TTL and timeout.
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bucket: bucket.into(),
            api_key: None,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL_SECS,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

/// Store backed by hosted object storage with signed URLs.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    /// Create a store from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::fetch(&config.base_url, e.to_string()))?;

        Ok(Self { client, config })
    }

    fn storage_root(&self) -> String {
        format!("{}/storage/v1", self.config.base_url.trim_end_matches('/'))
    }

    fn sign_endpoint(&self, locator: &str) -> String {
        format!(
            "{}/object/sign/{}/{}",
            self.storage_root(),
            urlencoding::encode(&self.config.bucket),
            encode_path(locator)
        )
    }

    fn absolute_url(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else {
            format!("{}/{}", self.storage_root(), signed.trim_start_matches('/'))
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key).header("apikey", key),
            None => request,
        }
    }
}

/// Percent-encode each segment of a slash-separated locator.
fn encode_path(locator: &str) -> String {
    locator
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl DocumentStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn resolve_locator_to_url(&self, locator: &str) -> StoreResult<String> {
        let endpoint = self.sign_endpoint(locator);
        debug!(%endpoint, "requesting signed URL");

        let response = self
            .authorize(self.client.post(&endpoint))
            .json(&SignRequest {
                expires_in: self.config.signed_url_ttl,
            })
            .send()
            .await
            .map_err(|e| StoreError::fetch(&endpoint, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Err(StoreError::not_found(locator));
        }
        if !status.is_success() {
            return Err(StoreError::fetch(&endpoint, format!("HTTP {status}")));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| StoreError::fetch(&endpoint, format!("invalid sign response: {e}")))?;

        Ok(self.absolute_url(&body.signed_url))
    }

    async fn fetch_bytes(&self, url: &str) -> StoreResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::fetch(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::fetch(url, e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
