//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties every component together:
//! - Seeding the frontier and spawning the worker pool
//! - Per-URL work: dedup, rate limiting, fetch, classify, report, extract
//! - Supervising termination (budget, idle timeout, natural exhaustion)
//! - Shutting the pool down and producing the summary

use crate::config::Settings;
use crate::crawler::classifier::Classifier;
use crate::crawler::fetcher::{FetchOutcome, Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{HtmlExtractor, ReferenceExtractor, WatchKinds};
use crate::crawler::rate_limit::RateLimiter;
use crate::crawler::scheduler::{CrawlPhase, Scheduler, SchedulerEvent, DRAIN_GRACE};
use crate::crawler::watchdog::IdleWatchdog;
use crate::output::{CrawlSummary, Reporter};
use crate::state::{Admission, CrawlState, Finding, TerminationReason};
use crate::url::{resolve_reference, ScopeDecision, ScopeFilter};
use crate::CheckError;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fetches between two progress log lines
const PROGRESS_INTERVAL: usize = 25;

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: Arc<Settings>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ReferenceExtractor>,
    reporter: Arc<dyn Reporter>,
}

/// Everything a worker needs, shared by the whole pool
struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ReferenceExtractor>,
    reporter: Arc<dyn Reporter>,
    frontier: Frontier,
    state: CrawlState,
    limiter: RateLimiter,
    scope: ScopeFilter,
    classifier: Classifier,
    kinds: WatchKinds,
}

impl Coordinator {
    /// Creates a coordinator from its collaborators
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated crawl settings
    /// * `fetcher` - Performs requests
    /// * `extractor` - Pulls references out of fetched documents
    /// * `reporter` - Receives findings and the final summary
    pub fn new(
        settings: Settings,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn ReferenceExtractor>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fetcher,
            extractor,
            reporter,
        }
    }

    /// Creates a coordinator that fetches over HTTP and parses HTML
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CheckError)` - The HTTP client could not be built
    pub fn with_http(settings: Settings, reporter: Arc<dyn Reporter>) -> Result<Self, CheckError> {
        let fetcher = HttpFetcher::new(settings.request_timeout)?;
        Ok(Self::new(
            settings,
            Arc::new(fetcher),
            Arc::new(HtmlExtractor::new()),
            reporter,
        ))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the crawl to termination
    ///
    /// # Flow
    ///
    /// 1. Seed the frontier with the seed URL (the seed is never scope filtered)
    /// 2. Spawn `concurrency` workers
    /// 3. Supervise until a termination reason is reached
    /// 4. Close the frontier, abandon in-flight fetches, report the summary
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl ended; the reason is in the summary
    /// * `Err(CheckError)` - A worker panicked or the summary could not be written
    pub async fn run(self) -> Result<CrawlSummary, CheckError> {
        let settings = Arc::clone(&self.settings);
        let started_at = Utc::now();
        let clock = tokio::time::Instant::now();

        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher,
            extractor: self.extractor,
            reporter: Arc::clone(&self.reporter),
            frontier: Frontier::new(),
            state: CrawlState::new(settings.max_visited, settings.max_errors),
            limiter: RateLimiter::new(settings.request_delay),
            scope: ScopeFilter::from_settings(&settings),
            classifier: Classifier::from_settings(&settings),
            kinds: settings.watch_kinds(),
        });

        tracing::info!(
            "Checking {} with {} worker(s), delay {:?}, idle timeout {:?}",
            settings.seed,
            settings.concurrency,
            settings.request_delay,
            settings.idle_timeout
        );

        ctx.frontier.push(FrontierEntry::seed(settings.seed.clone()));
        ctx.state.touch_activity();

        let mut workers = JoinSet::new();
        for id in 0..settings.concurrency.max(1) {
            workers.spawn(run_worker(Arc::clone(&ctx), id));
        }

        let watchdog = IdleWatchdog::new(settings.idle_timeout, settings.idle_check_interval);
        let reason = supervise(&ctx, &watchdog).await;

        ctx.frontier.close();
        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        let stats = ctx.state.stats();
        tracing::info!(
            "Crawl finished ({}): {} visited, {} fetched, {} error(s) reported",
            reason,
            stats.visited,
            stats.fetched,
            stats.reported_errors
        );

        let summary = CrawlSummary {
            seed: settings.seed.to_string(),
            reason,
            started_at,
            finished_at: Utc::now(),
            elapsed: clock.elapsed(),
            stats,
        };
        self.reporter.report_summary(&summary)?;

        Ok(summary)
    }
}

/// Feeds observations to the scheduler until it reaches a terminal phase
async fn supervise(ctx: &CrawlContext, watchdog: &IdleWatchdog) -> TerminationReason {
    let mut scheduler = Scheduler::new();

    loop {
        let phase = scheduler.phase();

        let event = tokio::select! {
            reason = ctx.state.terminated() => match reason {
                TerminationReason::BudgetExceeded => SchedulerEvent::BudgetExhausted,
                other => break other,
            },
            _ = watchdog.expired(&ctx.state) => SchedulerEvent::IdleTimeout,
            _ = ctx.frontier.wait_exhausted(), if phase == CrawlPhase::Running => {
                SchedulerEvent::FrontierExhausted
            }
            _ = tokio::time::sleep(DRAIN_GRACE), if phase == CrawlPhase::Draining => {
                SchedulerEvent::GraceElapsed {
                    work_pending: !ctx.frontier.is_exhausted(),
                }
            }
        };

        if let CrawlPhase::Terminated(reason) = scheduler.handle(event) {
            break ctx.state.terminate(reason);
        }
    }
}

/// Worker loop: runs until the frontier is closed or the crawl terminates
async fn run_worker(ctx: Arc<CrawlContext>, id: usize) {
    tracing::debug!("Worker {} started", id);

    while let Some(claim) = ctx.frontier.pop().await {
        if ctx.state.is_terminated() {
            break;
        }

        let entry = claim.entry();
        if !ctx.state.try_mark(&entry.url) {
            tracing::trace!("Worker {}: {} already visited", id, entry.url);
            continue;
        }

        let fetch = async {
            ctx.limiter.acquire().await;
            tracing::debug!("Worker {}: fetching {}", id, entry.url);
            ctx.fetcher.fetch(&entry.url).await
        };

        let outcome = tokio::select! {
            biased;
            _ = ctx.state.terminated() => break,
            outcome = fetch => outcome,
        };
        ctx.handle_outcome(entry, outcome);
    }

    tracing::debug!("Worker {} stopped", id);
}

impl CrawlContext {
    /// Classifies, reports and follows one fetch result
    fn handle_outcome(&self, entry: &FrontierEntry, outcome: FetchOutcome) {
        let fetched = self.state.record_fetch();
        if fetched % PROGRESS_INTERVAL == 0 {
            self.log_progress();
        }

        if self.state.is_terminated() {
            tracing::debug!("Discarding result for {}: crawl terminated", entry.url);
            return;
        }

        match outcome {
            FetchOutcome::Failed { error } => {
                tracing::debug!("Fetch failed for {}: {}", entry.url, error);
                if self.classifier.classify_fetch_error().is_some() {
                    self.emit(Finding::from_fetch_error(
                        &entry.url,
                        entry.parent.as_ref(),
                        error,
                    ));
                }
            }
            FetchOutcome::Response {
                status_code,
                content_type,
                body,
            } => {
                tracing::debug!("{} {}", status_code, entry.url);

                if let Some(category) = self.classifier.classify(status_code) {
                    let finding = Finding::from_response(
                        &entry.url,
                        entry.parent.as_ref(),
                        status_code,
                        category,
                    );
                    if !self.emit(finding) {
                        return;
                    }
                }

                if let Some(body) = body {
                    if self.kinds.any() {
                        self.follow_references(entry, &body, content_type.as_deref());
                    }
                }
            }
        }
    }

    /// Reports a finding if the budget admits it
    ///
    /// # Returns
    ///
    /// `true` while the crawl should keep going
    fn emit(&self, finding: Finding) -> bool {
        match self.state.admit_finding(finding.category) {
            Admission::Discard => false,
            admission => {
                if let Err(e) = self.reporter.report(&finding) {
                    tracing::warn!("Failed to report finding for {}: {}", finding.url, e);
                }
                if admission == Admission::ReportAndStop {
                    tracing::info!("Error budget exhausted at {}", finding.url);
                }
                admission == Admission::Report
            }
        }
    }

    /// Extracts, normalizes and scope-filters references, enqueueing new ones
    fn follow_references(&self, entry: &FrontierEntry, body: &str, content_type: Option<&str>) {
        let extracted = self.extractor.extract(body, content_type, self.kinds);

        let base = extracted
            .base_href
            .as_deref()
            .and_then(|href| resolve_reference(href, &entry.url).ok())
            .unwrap_or_else(|| entry.url.clone());

        let mut enqueued = 0;
        for reference in extracted.references {
            if !self.kinds.includes(reference.kind) {
                continue;
            }

            let url = match resolve_reference(&reference.raw, &base) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Dropping reference '{}': {}", reference.raw, e);
                    continue;
                }
            };

            match self.scope.check(&url) {
                ScopeDecision::Eligible => {}
                decision => {
                    tracing::trace!("Out of scope ({:?}): {}", decision, url);
                    self.state.record_out_of_scope();
                    continue;
                }
            }

            if self.state.is_visited(&url) {
                continue;
            }

            if self
                .frontier
                .push(FrontierEntry::discovered(url, entry.url.clone()))
            {
                self.state.record_enqueued();
                enqueued += 1;
            }
        }

        if enqueued > 0 {
            tracing::debug!("{}: enqueued {} reference(s)", entry.url, enqueued);
        }
    }

    fn log_progress(&self) {
        let stats = self.state.stats();
        tracing::info!(
            "Progress: {} fetched, {} queued, {} in flight, {} error(s) reported",
            stats.fetched,
            self.frontier.len(),
            self.frontier.in_progress(),
            stats.reported_errors
        );
    }
}
