//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the checker, including:
//! - Building the HTTP client with the checker's user agent
//! - GET requests with redirects left unfollowed, so 3xx responses surface
//! - Reading bodies only for successful HTML responses
//! - Describing transport failures
//!
//! The `Fetcher` trait is the seam the coordinator depends on; tests swap in
//! scripted fetchers without a network.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("sitecheck/", env!("CARGO_PKG_VERSION"));

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered
    Response {
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value, if any
        content_type: Option<String>,
        /// Page body; only read for 2xx HTML responses
        body: Option<String>,
    },

    /// No response was obtained (DNS, connect, timeout, TLS, body read)
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => Some(*status_code),
            Self::Failed { .. } => None,
        }
    }
}

/// Fetches a single URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one request; transport errors are reported in the outcome
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `request_timeout` - Upper bound for a whole request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type value denotes an HTML document
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("text/html")
                || mime.eq_ignore_ascii_case("application/xhtml+xml")
        })
        .unwrap_or(false)
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(request_timeout)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Sends a GET request and collects what the checker needs
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx, HTML | Response with body |
    /// | any other status | Response without body |
    /// | Timeout | Failed, "request timeout" |
    /// | Connect error | Failed, "connection failed: ..." |
    /// | Body read error | Failed |
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed {
                    error: describe_error(&e),
                }
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() || !is_html(content_type.as_deref()) {
            return FetchOutcome::Response {
                status_code: status.as_u16(),
                content_type,
                body: None,
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Response {
                status_code: status.as_u16(),
                content_type,
                body: Some(body),
            },
            Err(e) => FetchOutcome::Failed {
                error: describe_error(&e),
            },
        }
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("failed to read body: {}", error)
    } else {
        error.to_string()
    }
}
