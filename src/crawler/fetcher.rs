//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the fixed identifying header set
//! - Resolving relative page URLs against the target host
//! - GET requests to fetch listing pages
//! - Error classification

use crate::config::{Config, FetchConfig};
use crate::url::resolve_href;
use crate::{ExportError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A single-page GET capability
///
/// The walker only ever talks to this trait, so tests and embedders can swap
/// the transport without touching the crawl logic.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body as text
    ///
    /// Relative URLs are resolved against the implementation's target host.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use vndb_export::config::FetchConfig;
/// use vndb_export::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`PageFetcher`] bound to one target host
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    host: Url,
    accept_error_status: bool,
}

impl HttpFetcher {
    /// Creates a fetcher from the target and fetch sections of the config
    pub fn new(config: &Config) -> Result<Self> {
        let host = Url::parse(&config.target.host)?;
        let client = build_http_client(&config.fetch)?;

        Ok(Self {
            client,
            host,
            accept_error_status: config.fetch.accept_error_status,
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let url = resolve_href(&self.host, url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            if !self.accept_error_status {
                return Err(ExportError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            tracing::debug!("Keeping HTTP {} body for {}", status.as_u16(), url);
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(url.as_str(), e))
    }
}

/// Maps a reqwest failure onto a transport error
fn classify_error(url: &str, error: reqwest::Error) -> ExportError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    ExportError::Transport {
        url: url.to_string(),
        message,
    }
}
