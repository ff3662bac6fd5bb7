//! [`ArtifactSource`] backed by an HTTP POST to the artifact feed.
//!
//! Each fetch posts the empty request object `{}` to the configured
//! endpoint and parses the body as JSON. Whether the JSON is a usable
//! envelope is decided later by the store.

use serde_json::Value;
use shardwatch_core::config::SourceConfig;
use shardwatch_core::{ArtifactSource, FetchError};

use crate::error::EngineError;

/// Fetches the artifact feed over HTTP.
pub struct HttpArtifactSource {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpArtifactSource {
    /// Build a source for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Source`] if the HTTP client cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| EngineError::Source {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// The endpoint this source posts to.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&mut self) -> Result<Value, FetchError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn source_keeps_configured_endpoint() {
        let config = SourceConfig {
            endpoint_url: "http://feed.invalid/r/getArtifactPortals".to_owned(),
            request_timeout_ms: 500,
        };
        let source = HttpArtifactSource::new(&config).unwrap();
        assert_eq!(
            source.endpoint_url(),
            "http://feed.invalid/r/getArtifactPortals"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let config = SourceConfig {
            endpoint_url: "http://127.0.0.1:1/r/getArtifactPortals".to_owned(),
            request_timeout_ms: 2_000,
        };
        let mut source = HttpArtifactSource::new(&config).unwrap();
        let result = source.fetch().await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
