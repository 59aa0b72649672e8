use crate::config::Settings;
use crate::url::domain::{filename, host_key, is_same_or_subdomain};
use regex::Regex;
use url::Url;

/// Outcome of a scope check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeDecision {
    /// URL may be enqueued
    Eligible,
    /// Host is outside the configured host scope
    OutOfScopeHost,
    /// Last path segment does not match the watch pattern
    FilenameMismatch,
}

impl ScopeDecision {
    /// Returns true if the URL may be enqueued
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decides which discovered URLs the crawl may fetch
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    seed_host: String,
    span_hosts: bool,
    span_subdomains: bool,
    filename_pattern: Option<Regex>,
}

impl ScopeFilter {
    pub fn new(
        seed_host: impl Into<String>,
        span_hosts: bool,
        span_subdomains: bool,
        filename_pattern: Option<Regex>,
    ) -> Self {
        Self {
            seed_host: seed_host.into().to_lowercase(),
            span_hosts,
            span_subdomains,
            filename_pattern,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.seed_host.clone(),
            settings.span_hosts,
            settings.span_subdomains,
            settings.filename_pattern.clone(),
        )
    }

    /// Classifies a normalized URL
    ///
    /// Host rules are evaluated in priority order:
    /// 1. `span_hosts`: any host
    /// 2. `span_subdomains`: the seed host or a dot-suffixed subdomain of it
    /// 3. otherwise: the seed host exactly
    ///
    /// The filename pattern, when present, must additionally match the last
    /// path segment.
    pub fn check(&self, url: &Url) -> ScopeDecision {
        let host = match host_key(url) {
            Some(h) => h,
            None => return ScopeDecision::OutOfScopeHost,
        };

        let host_ok = if self.span_hosts {
            true
        } else if self.span_subdomains {
            is_same_or_subdomain(&host, &self.seed_host)
        } else {
            host == self.seed_host
        };

        if !host_ok {
            return ScopeDecision::OutOfScopeHost;
        }

        match &self.filename_pattern {
            Some(pattern) if !pattern.is_match(filename(url)) => ScopeDecision::FilenameMismatch,
            _ => ScopeDecision::Eligible,
        }
    }

    /// Returns true if the URL may be enqueued
    pub fn is_eligible(&self, url: &Url) -> bool {
        self.check(url).is_eligible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_only() {
        let filter = ScopeFilter::new("example.com", false, false, None);
        assert!(filter.is_eligible(&url("http://example.com/a")));
        assert!(filter.is_eligible(&url("https://EXAMPLE.com/b")));
        assert_eq!(
            filter.check(&url("http://blog.example.com/x")),
            ScopeDecision::OutOfScopeHost
        );
        assert!(!filter.is_eligible(&url("http://other.com/y")));
    }

    #[test]
    fn test_span_subdomains() {
        let filter = ScopeFilter::new("example.com", false, true, None);
        assert!(filter.is_eligible(&url("http://example.com/a")));
        assert!(filter.is_eligible(&url("http://blog.example.com/x")));
        assert!(!filter.is_eligible(&url("http://other.com/y")));
        assert!(!filter.is_eligible(&url("http://notexample.com/y")));
    }

    #[test]
    fn test_span_hosts_overrides_everything() {
        let filter = ScopeFilter::new("example.com", true, false, None);
        assert!(filter.is_eligible(&url("http://other.com/y")));
        assert!(filter.is_eligible(&url("http://blog.example.com/x")));
    }

    #[test]
    fn test_port_is_part_of_host() {
        let filter = ScopeFilter::new("127.0.0.1:8080", false, false, None);
        assert!(filter.is_eligible(&url("http://127.0.0.1:8080/a")));
        assert!(!filter.is_eligible(&url("http://127.0.0.1:9090/a")));
    }

    #[test]
    fn test_filename_pattern() {
        let pattern = Regex::new(r"\.html$").unwrap();
        let filter = ScopeFilter::new("example.com", false, false, Some(pattern));

        assert!(filter.is_eligible(&url("http://example.com/index.html")));
        assert_eq!(
            filter.check(&url("http://example.com/image.png")),
            ScopeDecision::FilenameMismatch
        );
        assert_eq!(
            filter.check(&url("http://example.com/docs/")),
            ScopeDecision::FilenameMismatch
        );
    }

    #[test]
    fn test_host_checked_before_filename() {
        let pattern = Regex::new(r"\.html$").unwrap();
        let filter = ScopeFilter::new("example.com", false, false, Some(pattern));
        assert_eq!(
            filter.check(&url("http://other.com/image.png")),
            ScopeDecision::OutOfScopeHost
        );
    }
}
