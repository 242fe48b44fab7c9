use anyhow::Context as _;

use crate::domain::repository::ObjectStore;
use crate::error::PolicyServiceError;

/// Attachment bytes fetched from the object store over HTTP.
#[derive(Clone)]
pub struct HttpObjectStore {
    pub http: reqwest::Client,
    pub base_url: String,
}

impl ObjectStore for HttpObjectStore {
    async fn download(&self, key: &str) -> Result<Vec<u8>, PolicyServiceError> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
            .send()
            .await
            .context("fetch attachment")?
            .error_for_status()
            .context("attachment fetch status")?;
        let bytes = response.bytes().await.context("read attachment body")?;
        Ok(bytes.to_vec())
    }
}
