//! Reporter traits and types
//!
//! This module defines the trait interface for reporters and the summary
//! record produced at the end of every crawl.

use crate::state::{Category, CrawlStats, Finding, TerminationReason};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Normalized seed URL
    pub seed: String,

    /// Why the crawl stopped
    pub reason: TerminationReason,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Wall-clock duration of the crawl
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,

    #[serde(flatten)]
    pub stats: CrawlStats,
}

impl CrawlSummary {
    /// Number of distinct URLs visited
    pub fn visited(&self) -> usize {
        self.stats.visited
    }

    /// Number of findings reported
    pub fn reported_errors(&self) -> usize {
        self.stats.reported_errors
    }

    /// Findings reported in one category
    pub fn findings_in(&self, category: Category) -> usize {
        self.stats
            .findings_by_category
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    pub fn has_findings(&self) -> bool {
        self.reported_errors() > 0
    }

    /// Returns true if the crawl ran to completion without findings
    pub fn is_clean(&self) -> bool {
        self.reason == TerminationReason::Completed && !self.has_findings()
    }
}

/// Trait for reporters
///
/// Reporters receive findings while the crawl runs and the summary once it
/// ends. Workers report concurrently, so implementations must be
/// thread-safe.
pub trait Reporter: Send + Sync {
    /// Records a single finding
    ///
    /// # Arguments
    ///
    /// * `finding` - The finding to emit
    fn report(&self, finding: &Finding) -> OutputResult<()>;

    /// Records the end-of-crawl summary
    ///
    /// # Arguments
    ///
    /// * `summary` - Counters and termination reason of the finished crawl
    fn report_summary(&self, summary: &CrawlSummary) -> OutputResult<()>;
}
