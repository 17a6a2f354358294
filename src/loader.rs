//! File and HTTP transport for document fetches.

use std::fs;
use std::time::Duration;

use tracing::debug;
use yacs_core::context::is_url;
use yacs_core::{Error, Loader, Result};

/// Reads local files and fetches `http`/`https` URLs.
#[derive(Debug, Clone)]
pub struct TransportLoader {
    client: reqwest::blocking::Client,
}

impl TransportLoader {
    /// `timeout` of `None` lets a request wait indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::fetch("http client", e))?;
        Ok(Self { client })
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Timeout taken from `http.timeout_seconds` (0 = none).
    pub fn with_timeout_seconds(seconds: u64) -> Result<Self> {
        Self::new((seconds > 0).then(|| Duration::from_secs(seconds)))
    }

    fn get_url(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;
        let body = response.bytes().map_err(|e| Error::fetch(url, e))?;
        Ok(body.to_vec())
    }
}

impl Loader for TransportLoader {
    fn load(&self, locator: &str) -> Result<Vec<u8>> {
        if is_url(locator) {
            debug!(url = %locator, "GET");
            return self.get_url(locator);
        }

        let path = locator.strip_prefix("file://").unwrap_or(locator);
        debug!(%path, "reading file");
        fs::read(path).map_err(|e| Error::fetch(locator, e))
    }
}
