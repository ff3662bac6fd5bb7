//! The fetch collaborator.
//!
//! An [`ArtifactSource`] performs one request for the artifact feed and
//! resolves to the raw JSON payload or a [`FetchError`]. The refresh
//! service awaits it and branches on the outcome. How the request travels
//! (HTTP, a fixture file, a test script) is up to the implementation.

use std::future::Future;

use serde_json::Value;

/// Errors that can occur while fetching the artifact feed.
///
/// None of these carry usable data. The service answers all of them with
/// the flat failure retry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or did not complete.
    #[error("transport error: {0}")]
    Transport(String),

    /// The feed answered with a non-success status.
    #[error("feed returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not JSON.
    #[error("response body is not JSON: {0}")]
    Decode(String),
}

/// A source of raw artifact payloads.
pub trait ArtifactSource {
    /// Fetch the feed once.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no payload could be obtained.
    fn fetch(&mut self) -> impl Future<Output = Result<Value, FetchError>> + Send;
}
