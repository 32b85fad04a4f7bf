// src/releases/client.rs

//! HTTP client for download listings and tarballs

use crate::error::{Error, Result};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
}

impl ReleaseClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("godeb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Download(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch a listing page as text
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        self.get(url)?
            .text()
            .map_err(|e| Error::Download(format!("cannot read response from {url}: {e}")))
    }

    /// Start a streaming download; the response body is read as it arrives
    pub fn open(&self, url: &str) -> Result<Download> {
        info!("Downloading {}", url);
        let response = self.get(url)?;
        Ok(Download {
            length: response.content_length(),
            response,
        })
    }

    fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Download(format!("failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "got status code {} from {}",
                response.status().as_u16(),
                url
            )));
        }
        Ok(response)
    }
}

/// An in-flight tarball download
#[derive(Debug)]
pub struct Download {
    /// Content length announced by the server, if any
    pub length: Option<u64>,
    pub response: Response,
}
