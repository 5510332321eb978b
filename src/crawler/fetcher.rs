//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client with the configured identity header
//! - GET requests for listing pages, paced after every request
//! - GET requests for product images
//! - Classifying failures into transport and status failures

use crate::config::FetcherConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Connection, timeout or body read failure; a later attempt may succeed
    TransportFailure {
        /// Error description
        error: String,
    },

    /// The server answered with a non-success status
    StatusFailure {
        /// The HTTP status code
        status_code: u16,
    },
}

impl FetchResult {
    /// Converts the outcome into the body or a `FetchError` naming `url`
    pub fn into_result(self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.into_page(url).map(|(_, body)| body)
    }

    /// Like [`into_result`](Self::into_result), but keeps the URL the body
    /// was actually served from after redirects
    pub fn into_page(self, url: &str) -> Result<(String, Vec<u8>), FetchError> {
        match self {
            Self::Success {
                final_url, body, ..
            } => Ok((final_url, body)),
            Self::TransportFailure { error } => Err(FetchError::Transport {
                url: url.to_string(),
                message: error,
            }),
            Self::StatusFailure { status_code } => Err(FetchError::Status {
                url: url.to_string(),
                status_code,
            }),
        }
    }
}

/// Source of remote pages and images
///
/// `HttpFetcher` is the production implementation; tests substitute their
/// own.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a listing page; implementations pace the caller afterwards
    async fn fetch_page(&self, url: &str) -> FetchResult;

    /// Fetches image bytes without pacing
    async fn fetch_image(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_ingest::config::FetcherConfig;
/// use catalog_ingest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited fetcher over one reused HTTP client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    pacing_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            pacing_delay: Duration::from_millis(config.pacing_delay_ms),
        })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> FetchResult {
        let result = fetch_url(&self.client, url).await;

        if !self.pacing_delay.is_zero() {
            tokio::time::sleep(self.pacing_delay).await;
        }

        result
    }

    async fn fetch_image(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Issues a single GET and classifies the outcome
///
/// No retries: a failure is reported to the caller as-is.
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` |
/// | Any other status | `StatusFailure` |
/// | Timeout / connect / body read error | `TransportFailure` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::StatusFailure {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body: body.to_vec(),
        },
        Err(e) => classify_transport_error(&e),
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::TransportFailure { error }
}
