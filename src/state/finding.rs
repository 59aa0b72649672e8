//! Finding definitions for reported responses
//!
//! A finding is created once, when a fetched URL's response falls into a
//! checked category, and is never modified afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use url::Url;

/// Response classes a finding can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// HTTP 300-399
    Redirection,

    /// HTTP 400-499
    ClientError,

    /// HTTP 500-599
    ServerError,

    /// The request never produced a response (DNS, connect, timeout)
    FetchError,
}

impl Category {
    /// All categories, in report order
    pub const ALL: [Category; 4] = [
        Self::Redirection,
        Self::ClientError,
        Self::ServerError,
        Self::FetchError,
    ];

    /// Maps an HTTP status code to its category
    ///
    /// Codes outside 300-599 (including every 2xx) have no category.
    pub fn from_status(status_code: u16) -> Option<Self> {
        match status_code {
            300..=399 => Some(Self::Redirection),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redirection => "redirection",
            Self::ClientError => "clientError",
            Self::ServerError => "serverError",
            Self::FetchError => "fetchError",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reportable event for one fetched URL
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// The URL that was fetched
    pub url: String,

    /// The page the URL was discovered on (`None` for the seed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// HTTP status code (`None` for fetch errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    pub category: Category,

    /// Transport error description, for fetch errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl Finding {
    /// Creates a finding for an HTTP response
    pub fn from_response(
        url: &Url,
        parent: Option<&Url>,
        status_code: u16,
        category: Category,
    ) -> Self {
        Self {
            url: url.to_string(),
            parent: parent.map(Url::to_string),
            status_code: Some(status_code),
            category,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a finding for a request that failed before any response
    pub fn from_fetch_error(url: &Url, parent: Option<&Url>, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            parent: parent.map(Url::to_string),
            status_code: None,
            category: Category::FetchError,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}
