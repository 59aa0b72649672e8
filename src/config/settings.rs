use crate::config::types::Config;
use crate::config::validation::{compile_pattern, validate, validate_seed};
use crate::crawler::WatchKinds;
use crate::state::Category;
use crate::url::host_key;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Shortest interval at which the idle watchdog polls
const MIN_IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Immutable snapshot of everything the crawl engine needs
///
/// Built once from a validated [`Config`]; the engine never sees the raw
/// configuration. Fields are public so tests can tune pacing directly.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute seed URL
    pub seed: Url,

    /// Host (plus explicit port) of the seed
    pub seed_host: String,

    pub span_hosts: bool,
    pub span_subdomains: bool,

    /// Pattern the last path segment must match
    pub filename_pattern: Option<Regex>,

    pub watch_href: bool,
    pub watch_src: bool,

    /// Categories that produce findings
    pub checked_categories: HashSet<Category>,

    pub max_visited: usize,
    pub max_errors: usize,
    pub request_delay: Duration,
    pub idle_timeout: Duration,
    pub concurrency: usize,
    pub request_timeout: Duration,

    /// How often the watchdog compares the clock to the last activity
    pub idle_check_interval: Duration,

    /// Output findings as JSON
    pub json: bool,
}

impl Settings {
    /// Validates the configuration and derives the engine settings from it
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - The configuration is valid
    /// * `Err(ConfigError)` - The configuration was rejected
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let seed = validate_seed(config.url.as_deref())?;
        let seed_host = host_key(&seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("'{}' has no host", seed)))?;

        let filename_pattern = match &config.watch.pattern {
            Some(pattern) => compile_pattern(pattern)?,
            None => None,
        };

        let mut checked_categories = HashSet::new();
        if config.checks.redirection {
            checked_categories.insert(Category::Redirection);
        }
        if config.checks.client_errors {
            checked_categories.insert(Category::ClientError);
        }
        if config.checks.server_errors {
            checked_categories.insert(Category::ServerError);
        }
        if config.checks.fetch_errors {
            checked_categories.insert(Category::FetchError);
        }

        let idle_timeout = config.limits.time_wait;

        Ok(Self {
            seed,
            seed_host,
            span_hosts: config.scope.span_hosts,
            span_subdomains: config.scope.span_subdomains,
            filename_pattern,
            watch_href: config.watch.href,
            watch_src: config.watch.src,
            checked_categories,
            max_visited: config.limits.max_visited,
            max_errors: config.limits.max_errors,
            request_delay: config.limits.time_delay,
            idle_timeout,
            concurrency: config.limits.concurrency,
            request_timeout: config.limits.request_timeout,
            idle_check_interval: idle_check_interval(idle_timeout),
            json: config.output.json,
        })
    }

    /// Returns true if findings of this category are reported
    pub fn checks(&self, category: Category) -> bool {
        self.checked_categories.contains(&category)
    }

    /// Reference kinds to extract from fetched documents
    pub fn watch_kinds(&self) -> WatchKinds {
        WatchKinds {
            href: self.watch_href,
            src: self.watch_src,
        }
    }
}

/// Polls four times per timeout window
fn idle_check_interval(idle_timeout: Duration) -> Duration {
    std::cmp::max(idle_timeout / 4, MIN_IDLE_CHECK_INTERVAL)
}
