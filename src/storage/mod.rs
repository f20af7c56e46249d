//! Object storage for synthesized audio

use async_trait::async_trait;
use reqwest::Client;

use crate::config::StorageConfig;
use crate::{Error, Result};

/// Stores audio objects under request-scoped keys
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Upload one object, returning its retrievable URL
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// S3-compatible object store over plain HTTP PUT
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
    public_base_url: Option<String>,
}

impl HttpObjectStore {
    /// Create a new object store client
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
            public_base_url: config
                .public_base_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Upload target for a key
    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.endpoint, self.bucket)
    }

    /// URL handed to clients; falls back to the storage endpoint when no
    /// public base is configured
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        self.public_base_url.as_ref().map_or_else(
            || self.object_url(key),
            |base| format!("{base}/{key}"),
        )
    }
}

#[async_trait]
impl AudioStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let mut request = self
            .client
            .put(self.object_url(key))
            .header("Content-Type", content_type)
            .body(bytes);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "upload of {key} failed {status}: {body}"
            )));
        }

        Ok(self.public_url(key))
    }
}
