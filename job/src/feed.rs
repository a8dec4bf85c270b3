//! Snapshot feed client (HTTP, JSON array)

use crate::config::FeedConfig;
use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::time::Duration;

/// Source of the freshly generated measurements.
#[async_trait::async_trait]
pub trait SnapshotFeed: Send + Sync {
    /// The raw snapshot items. Any non-success outcome is an error; there is
    /// no retry.
    async fn fetch(&self) -> Result<Vec<Value>>;
}

pub struct HttpFeed {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), Duration::from_secs(config.timeout_seconds))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl SnapshotFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<Value>> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::FeedUnavailable(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(PipelineError::FeedUnavailable(
                "snapshot payload is not a JSON array".to_string(),
            )),
            Err(e) => Err(PipelineError::FeedUnavailable(format!(
                "snapshot payload is not valid JSON: {e}"
            ))),
        }
    }
}
