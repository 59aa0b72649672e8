//! Crawler module for fetching pages and checking references
//!
//! This module contains the core crawling logic, including:
//! - The frontier queue and the global request rate limiter
//! - HTTP fetching and HTML reference extraction
//! - Response classification
//! - The idle watchdog and the termination state machine
//! - Overall crawl coordination

mod classifier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod rate_limit;
mod scheduler;
mod watchdog;

pub use classifier::Classifier;
pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, is_html, FetchOutcome, Fetcher, HttpFetcher, USER_AGENT};
pub use frontier::{Claim, Frontier, FrontierEntry};
pub use parser::{
    Extracted, HtmlExtractor, Reference, ReferenceExtractor, ReferenceKind, WatchKinds,
};
pub use rate_limit::RateLimiter;
pub use scheduler::{CrawlPhase, Scheduler, SchedulerEvent, DRAIN_GRACE};
pub use watchdog::IdleWatchdog;

use crate::config::Settings;
use crate::output::{CrawlSummary, Reporter};
use crate::CheckError;
use std::sync::Arc;

/// Runs a complete site check
///
/// This is the main entry point for checking a site. It will:
/// 1. Build the HTTP client
/// 2. Crawl from the seed, reporting findings as they appear
/// 3. Stop on budget exhaustion, idle timeout, or natural completion
/// 4. Report and return the summary
///
/// # Arguments
///
/// * `settings` - Validated crawl settings
/// * `reporter` - Destination for findings and the summary
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The crawl ended; see `reason` for why
/// * `Err(CheckError)` - The crawl could not run to an end
pub async fn check_site(
    settings: Settings,
    reporter: Arc<dyn Reporter>,
) -> Result<CrawlSummary, CheckError> {
    Coordinator::with_http(settings, reporter)?.run().await
}
