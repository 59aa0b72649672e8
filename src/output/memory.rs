//! In-memory reporter
//!
//! Keeps every finding and the summary for later inspection. Used by tests
//! and by library callers that post-process results themselves.

use crate::output::traits::{CrawlSummary, OutputResult, Reporter};
use crate::state::{Category, Finding};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct CollectingReporter {
    findings: Mutex<Vec<Finding>>,
    summary: Mutex<Option<CrawlSummary>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings in the order they were reported
    pub fn findings(&self) -> Vec<Finding> {
        lock(&self.findings).clone()
    }

    pub fn findings_in(&self, category: Category) -> Vec<Finding> {
        lock(&self.findings)
            .iter()
            .filter(|f| f.category == category)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Option<CrawlSummary> {
        lock(&self.summary).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Reporter for CollectingReporter {
    fn report(&self, finding: &Finding) -> OutputResult<()> {
        lock(&self.findings).push(finding.clone());
        Ok(())
    }

    fn report_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        *lock(&self.summary) = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_collects_in_order() {
        let reporter = CollectingReporter::new();
        let a = Url::parse("http://example.com/a").unwrap();
        let b = Url::parse("http://example.com/b").unwrap();

        reporter
            .report(&Finding::from_response(&a, None, 404, Category::ClientError))
            .unwrap();
        reporter
            .report(&Finding::from_response(&b, None, 500, Category::ServerError))
            .unwrap();

        let findings = reporter.findings();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].url, "http://example.com/a");
        assert_eq!(reporter.findings_in(Category::ServerError).len(), 1);
        assert!(reporter.summary().is_none());
    }
}
