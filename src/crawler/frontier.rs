//! Frontier queue of URLs awaiting fetch
//!
//! A FIFO shared by every worker. Workers both consume from it and push
//! newly discovered URLs back onto it. The queue tracks how many popped
//! entries are still being worked on, so "empty" and "exhausted" (empty
//! with nobody left who could refill it) are distinguishable.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Absolute URL to fetch
    pub url: Url,

    /// Page the URL was discovered on (`None` for the seed)
    pub parent: Option<Url>,
}

impl FrontierEntry {
    pub fn seed(url: Url) -> Self {
        Self { url, parent: None }
    }

    pub fn discovered(url: Url, parent: Url) -> Self {
        Self {
            url,
            parent: Some(parent),
        }
    }
}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<Url>,
    in_progress: usize,
    closed: bool,
}

/// Multi-producer, multi-consumer FIFO with blocking pop
///
/// A URL is held at most once while it waits. Once popped it may be pushed
/// again; the visited set decides whether a rediscovered URL is fetched.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    available: Notify,
    settled: Notify,
}

/// An entry claimed by a worker
///
/// The entry counts as in progress until the claim is dropped. Workers hold
/// the claim while pushing the URLs they discover, so the frontier cannot be
/// observed as exhausted in between.
#[derive(Debug)]
pub struct Claim<'a> {
    frontier: &'a Frontier,
    entry: FrontierEntry,
}

impl Claim<'_> {
    pub fn entry(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; never blocks
    ///
    /// # Returns
    ///
    /// * `true` - The entry was queued
    /// * `false` - The frontier is closed, or the URL is already waiting
    pub fn push(&self, entry: FrontierEntry) -> bool {
        {
            let mut inner = self.lock();
            if inner.closed || !inner.queued.insert(entry.url.clone()) {
                return false;
            }
            tracing::trace!("Enqueued {}", entry.url);
            inner.queue.push_back(entry);
        }
        self.available.notify_one();
        true
    }

    /// Removes the oldest entry, suspending while the queue is empty
    ///
    /// # Returns
    ///
    /// * `Some(Claim)` - The next entry to work on
    /// * `None` - The frontier was closed
    pub async fn pop(&self) -> Option<Claim<'_>> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if inner.closed {
                    return None;
                }
                if let Some(entry) = inner.queue.pop_front() {
                    inner.queued.remove(&entry.url);
                    inner.in_progress += 1;
                    return Some(Claim {
                        frontier: self,
                        entry,
                    });
                }
            }

            notified.await;
        }
    }

    /// Closes the frontier, waking every suspended `pop`
    ///
    /// Queued entries are discarded and later pushes are refused.
    pub fn close(&self) {
        {
            let mut inner = self.lock();
            inner.closed = true;
            inner.queue.clear();
            inner.queued.clear();
        }
        self.available.notify_waiters();
        self.settled.notify_waiters();
    }

    /// Returns true when nothing is queued and no claimed entry is in progress
    pub fn is_exhausted(&self) -> bool {
        let inner = self.lock();
        inner.queue.is_empty() && inner.in_progress == 0
    }

    /// Waits until the frontier is exhausted or closed
    pub async fn wait_exhausted(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let inner = self.lock();
                if inner.closed || (inner.queue.is_empty() && inner.in_progress == 0) {
                    return;
                }
            }

            notified.await;
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of claimed entries still being worked on
    pub fn in_progress(&self) -> usize {
        self.lock().in_progress
    }

    fn task_done(&self) {
        let exhausted = {
            let mut inner = self.lock();
            inner.in_progress = inner.in_progress.saturating_sub(1);
            inner.queue.is_empty() && inner.in_progress == 0
        };
        if exhausted {
            self.settled.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
