//! Remote edge configuration store
//!
//! Reads go to `GET {read_url}/item/{key}` with a read token; writes go to
//! `PATCH {write_url}/items` with a separate write token. Reads are served
//! from the edge and may lag a write by a few seconds.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storage::config_store::{ConfigStore, Result, StoreError};
use tracing::{debug, warn};

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for the remote config store
#[derive(Debug, Clone)]
pub struct EdgeConfigSettings {
    /// Base URL for reads (e.g., "https://edge-config.example.com/ecfg_123")
    pub read_url: Option<String>,
    /// Bearer token for reads
    pub read_token: Option<String>,
    /// Base URL for writes
    pub write_url: Option<String>,
    /// Bearer token for writes
    pub write_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on time spent retrying one operation
    pub max_retry_elapsed: Duration,
    /// Delay before the first retry
    pub initial_retry_interval: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for EdgeConfigSettings {
    fn default() -> Self {
        Self {
            read_url: None,
            read_token: None,
            write_url: None,
            write_token: None,
            timeout: Duration::from_secs(5),
            max_retry_elapsed: Duration::from_secs(4),
            initial_retry_interval: Duration::from_millis(100),
            user_agent: format!("Tideline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl EdgeConfigSettings {
    /// Create settings with read access
    pub fn new(read_url: impl Into<String>, read_token: impl Into<String>) -> Self {
        Self {
            read_url: Some(read_url.into()),
            read_token: Some(read_token.into()),
            ..Default::default()
        }
    }

    /// Add write access
    pub fn with_write_access(
        mut self,
        write_url: impl Into<String>,
        write_token: impl Into<String>,
    ) -> Self {
        self.write_url = Some(write_url.into());
        self.write_token = Some(write_token.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget; zero disables retries
    pub fn with_max_retry_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_retry_elapsed = elapsed;
        self
    }

    /// Set the first retry delay
    pub fn with_initial_retry_interval(mut self, interval: Duration) -> Self {
        self.initial_retry_interval = interval;
        self
    }

    /// Settings from environment variables
    ///
    /// Reads `EDGE_CONFIG_URL`, `EDGE_CONFIG_TOKEN`, `EDGE_CONFIG_WRITE_URL` and
    /// `EDGE_CONFIG_WRITE_TOKEN`. Missing values stay unset and surface as
    /// [`StoreError::Unconfigured`] when the store is used.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            read_url: var("EDGE_CONFIG_URL"),
            read_token: var("EDGE_CONFIG_TOKEN"),
            write_url: var("EDGE_CONFIG_WRITE_URL"),
            write_token: var("EDGE_CONFIG_WRITE_TOKEN"),
            ..Default::default()
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Body of a batch write request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemsPatch {
    /// Operations to apply atomically
    pub items: Vec<ItemOperation>,
}

/// A single write operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemOperation {
    /// Operation kind ("upsert")
    pub operation: String,
    /// Item key
    pub key: String,
    /// New value
    pub value: serde_json::Value,
}

impl ItemsPatch {
    /// Patch replacing one key with a string value
    pub fn upsert(key: &str, value: &str) -> Self {
        Self {
            items: vec![ItemOperation {
                operation: "upsert".to_string(),
                key: key.to_string(),
                value: serde_json::Value::String(value.to_string()),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// =============================================================================
// Store
// =============================================================================

/// Config store backed by the remote edge configuration service
#[derive(Debug, Clone)]
pub struct EdgeConfigStore {
    client: ReqwestClient,
    settings: EdgeConfigSettings,
}

impl EdgeConfigStore {
    /// Create a store from settings
    pub fn new(settings: EdgeConfigSettings) -> Self {
        let client = ReqwestClient::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, settings }
    }

    /// Connection settings
    pub fn settings(&self) -> &EdgeConfigSettings {
        &self.settings
    }

    fn read_target(&self) -> Result<(&str, &str)> {
        match (&self.settings.read_url, &self.settings.read_token) {
            (Some(url), Some(token)) => Ok((url.trim_end_matches('/'), token)),
            _ => Err(StoreError::Unconfigured("read URL or token missing".to_string())),
        }
    }

    fn write_target(&self) -> Result<(&str, &str)> {
        match (&self.settings.write_url, &self.settings.write_token) {
            (Some(url), Some(token)) => Ok((url.trim_end_matches('/'), token)),
            _ => Err(StoreError::Unconfigured("write URL or token missing".to_string())),
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.settings.initial_retry_interval)
            .with_max_elapsed_time(Some(self.settings.max_retry_elapsed))
            .build();

        let operation = &operation;
        backoff::future::retry(policy, move || {
            let attempt = operation();
            async move {
                attempt.await.map_err(|err| {
                    if err.is_transient() {
                        debug!(error = %err, "Retrying config store request");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        })
        .await
    }

    async fn read_once(&self, key: &str) -> Result<Option<String>> {
        let (base, token) = self.read_target()?;
        let url = format!("{}/item/{}", base, key);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("Failed to parse item: {}", e)))?;

        match value {
            serde_json::Value::String(s) => Ok(Some(s)),
            serde_json::Value::Null => Ok(None),
            other => Err(StoreError::Malformed(format!("expected string, got {}", other))),
        }
    }

    async fn write_once(&self, key: &str, value: &str) -> Result<()> {
        let (base, token) = self.write_target()?;
        let url = format!("{}/items", base);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(&ItemsPatch::upsert(key, value))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Request failed: {}", e)))?;

        check_status(response).await?;
        Ok(())
    }
}

/// Map a non-success response to [`StoreError::Rejected`]
async fn check_status(response: ReqwestResponse) -> Result<ReqwestResponse> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ConfigStore for EdgeConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_retry(|| self.read_once(key)).await
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        let result = self.with_retry(|| self.write_once(key, value)).await;
        if let Err(err) = &result {
            warn!(key, error = %err, "Config store write failed");
        }
        result
    }
}
