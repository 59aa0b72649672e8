use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Capped set of visited URLs with first-in-first-out eviction
///
/// Once `capacity` entries are held, marking a new URL evicts the oldest
/// one. An evicted URL counts as unseen again and may be fetched a second
/// time if it is rediscovered; memory stays bounded at the cost of some
/// duplicate work.
#[derive(Debug)]
pub struct VisitedSet {
    capacity: usize,
    inner: Mutex<VisitedInner>,
}

#[derive(Debug, Default)]
struct VisitedInner {
    /// URL -> time it was first marked
    entries: HashMap<String, DateTime<Utc>>,

    /// Insertion order, oldest at the front
    order: VecDeque<String>,
}

impl VisitedSet {
    /// Creates an empty set holding at most `capacity` URLs (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(VisitedInner {
                entries: HashMap::with_capacity(capacity.min(4096)),
                order: VecDeque::with_capacity(capacity.min(4096)),
            }),
        }
    }

    /// Marks a URL as visited
    ///
    /// The membership check and the insertion happen under one lock, so two
    /// callers racing on the same URL can never both see it as new.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not in the set and has been inserted
    /// * `false` - The URL was already present
    pub fn try_mark(&self, url: &Url) -> bool {
        let mut inner = self.lock();
        if inner.entries.contains_key(url.as_str()) {
            return false;
        }

        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    tracing::trace!("Evicted {} from visited set", oldest);
                }
                None => break,
            }
        }

        let key = url.as_str().to_string();
        inner.entries.insert(key.clone(), Utc::now());
        inner.order.push_back(key);
        true
    }

    /// Returns true if the URL is currently remembered
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().entries.contains_key(url.as_str())
    }

    /// Returns when the URL was marked, if it is still remembered
    pub fn visited_at(&self, url: &Url) -> Option<DateTime<Utc>> {
        self.lock().entries.get(url.as_str()).copied()
    }

    /// Number of URLs currently remembered
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VisitedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(path: &str) -> Url {
        Url::parse(&format!("http://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_try_mark_once() {
        let visited = VisitedSet::new(10);
        assert!(visited.try_mark(&url("/a")));
        assert!(!visited.try_mark(&url("/a")));
        assert!(visited.contains(&url("/a")));
        assert!(visited.visited_at(&url("/a")).is_some());
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let visited = VisitedSet::new(3);
        for i in 0..20 {
            visited.try_mark(&url(&format!("/{}", i)));
            assert!(visited.len() <= 3);
        }
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn test_oldest_evicted_first() {
        let visited = VisitedSet::new(2);
        visited.try_mark(&url("/a"));
        visited.try_mark(&url("/b"));
        visited.try_mark(&url("/c"));

        assert!(!visited.contains(&url("/a")));
        assert!(visited.contains(&url("/b")));
        assert!(visited.contains(&url("/c")));
    }

    #[test]
    fn test_capacity_one_allows_refetch_after_eviction() {
        let visited = VisitedSet::new(1);
        assert!(visited.try_mark(&url("/first")));
        assert!(visited.try_mark(&url("/second")));
        assert_eq!(visited.len(), 1);

        // The first URL was evicted, so it counts as new again
        assert!(visited.try_mark(&url("/first")));
        assert!(!visited.contains(&url("/second")));
    }

    #[test]
    fn test_zero_capacity_treated_as_one() {
        let visited = VisitedSet::new(0);
        assert_eq!(visited.capacity(), 1);
        assert!(visited.try_mark(&url("/a")));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_concurrent_marking_single_winner() {
        let visited = Arc::new(VisitedSet::new(100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || visited.try_mark(&url("/race")))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
