use crate::state::finding::Category;
use crate::state::visited::VisitedSet;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use url::Url;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    /// The frontier was exhausted before any budget ran out
    Completed,

    /// No activity was seen for longer than the idle timeout
    IdleTimeout,

    /// The reported error count reached the configured maximum
    BudgetExceeded,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::IdleTimeout => "idleTimeout",
            Self::BudgetExceeded => "budgetExceeded",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a worker should do with a finding it produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Report the finding; the crawl continues
    Report,

    /// Report the finding; it exhausted the error budget and the crawl is
    /// now terminated
    ReportAndStop,

    /// The crawl already terminated; drop the finding
    Discard,
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    /// URLs newly marked as visited
    pub visited: usize,

    /// Fetches that completed, with a response or a transport error
    pub fetched: usize,

    /// Discovered URLs that passed the scope filter and were enqueued
    pub enqueued: usize,

    /// Discovered URLs dropped by the scope filter
    pub out_of_scope: usize,

    /// Dequeued URLs that had already been visited
    pub duplicates: usize,

    /// Findings reported
    pub reported_errors: usize,

    /// Findings reported per category
    pub findings_by_category: HashMap<Category, usize>,
}

#[derive(Debug)]
struct Counters {
    stats: CrawlStats,
    last_activity: Instant,
    termination: Option<TerminationReason>,
}

/// Shared, synchronized crawl state
///
/// Owned by the coordinator and shared with every worker. All mutation goes
/// through read-modify-write methods so that no caller ever sees a torn
/// update.
#[derive(Debug)]
pub struct CrawlState {
    visited: VisitedSet,
    max_errors: usize,
    counters: Mutex<Counters>,
    terminated: Notify,
}

impl CrawlState {
    /// Creates the state for a new crawl
    ///
    /// # Arguments
    ///
    /// * `max_visited` - Capacity of the visited set
    /// * `max_errors` - Reported findings after which the crawl stops
    pub fn new(max_visited: usize, max_errors: usize) -> Self {
        Self {
            visited: VisitedSet::new(max_visited),
            max_errors: max_errors.max(1),
            counters: Mutex::new(Counters {
                stats: CrawlStats::default(),
                last_activity: Instant::now(),
                termination: None,
            }),
            terminated: Notify::new(),
        }
    }

    /// Marks a URL as visited, returning true if it was not seen before
    pub fn try_mark(&self, url: &Url) -> bool {
        let fresh = self.visited.try_mark(url);
        let mut counters = self.lock();
        if fresh {
            counters.stats.visited += 1;
        } else {
            counters.stats.duplicates += 1;
        }
        fresh
    }

    /// Returns true if the URL is currently remembered as visited
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs currently held by the visited set
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Records crawl activity, resetting the idle clock
    pub fn touch_activity(&self) {
        self.lock().last_activity = Instant::now();
    }

    /// Records a completed fetch; counts as activity
    ///
    /// # Returns
    ///
    /// The number of fetches completed so far, this one included
    pub fn record_fetch(&self) -> usize {
        let mut counters = self.lock();
        counters.stats.fetched += 1;
        counters.last_activity = Instant::now();
        counters.stats.fetched
    }

    /// Records a newly enqueued URL; counts as activity
    pub fn record_enqueued(&self) {
        let mut counters = self.lock();
        counters.stats.enqueued += 1;
        counters.last_activity = Instant::now();
    }

    /// Records a discovered URL rejected by the scope filter
    pub fn record_out_of_scope(&self) {
        self.lock().stats.out_of_scope += 1;
    }

    /// Time elapsed since the last recorded activity
    pub fn idle_for(&self) -> Duration {
        self.lock().last_activity.elapsed()
    }

    /// Counts a finding against the error budget
    ///
    /// The termination check and the increment happen under one lock: once
    /// the budget is exhausted no further finding is admitted, regardless
    /// of how many workers race here.
    pub fn admit_finding(&self, category: Category) -> Admission {
        let admission = {
            let mut counters = self.lock();
            if counters.termination.is_some() {
                return Admission::Discard;
            }

            counters.stats.reported_errors += 1;
            *counters
                .stats
                .findings_by_category
                .entry(category)
                .or_insert(0) += 1;

            if counters.stats.reported_errors >= self.max_errors {
                counters.termination = Some(TerminationReason::BudgetExceeded);
                Admission::ReportAndStop
            } else {
                Admission::Report
            }
        };

        if admission == Admission::ReportAndStop {
            self.terminated.notify_waiters();
        }
        admission
    }

    /// Number of findings reported so far
    pub fn reported_errors(&self) -> usize {
        self.lock().stats.reported_errors
    }

    /// Terminates the crawl
    ///
    /// Termination is absorbing: the first reason recorded wins.
    ///
    /// # Returns
    ///
    /// The reason the crawl is terminated with, which differs from `reason`
    /// if another caller terminated it first.
    pub fn terminate(&self, reason: TerminationReason) -> TerminationReason {
        let (effective, first) = {
            let mut counters = self.lock();
            match counters.termination {
                Some(existing) => (existing, false),
                None => {
                    counters.termination = Some(reason);
                    (reason, true)
                }
            }
        };

        if first {
            tracing::debug!("Crawl terminated: {}", effective);
            self.terminated.notify_waiters();
        }
        effective
    }

    /// The termination reason, if the crawl has terminated
    pub fn termination(&self) -> Option<TerminationReason> {
        self.lock().termination
    }

    pub fn is_terminated(&self) -> bool {
        self.termination().is_some()
    }

    /// Waits until the crawl terminates
    pub async fn terminated(&self) -> TerminationReason {
        loop {
            let notified = self.terminated.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(reason) = self.termination() {
                return reason;
            }
            notified.await;
        }
    }

    /// Copies the current counters
    pub fn stats(&self) -> CrawlStats {
        self.lock().stats.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
