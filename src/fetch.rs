//! Blocking HTTP transport behind a small trait so the network facing components can
//! be given test doubles.

use std::time::Duration;

use tracing::error;

use crate::error::{Result, SoundingError};

/// Fetch the body of a URL as text.
///
/// Implementations are expected to treat any transport failure or non success status
/// as [`SoundingError::UpstreamUnavailable`]; retry policy belongs to the callers.
pub trait TextFetcher: Send + Sync {
    /// Perform a blocking GET and return the response body.
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// The production fetcher, a thin wrapper around a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTextFetcher {
    client: reqwest::blocking::Client,
}

impl HttpTextFetcher {
    /// Create a fetcher with a sensible default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SoundingError::UpstreamUnavailable(err.to_string()))?;

        Ok(HttpTextFetcher { client })
    }
}

impl TextFetcher for HttpTextFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SoundingError::UpstreamUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "unexpected status from upstream");
            return Err(SoundingError::UpstreamUnavailable(format!(
                "status {} from {}",
                status, url
            )));
        }

        response
            .text()
            .map_err(|err| SoundingError::UpstreamUnavailable(err.to_string()))
    }
}
