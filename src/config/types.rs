use serde::Deserialize;
use std::time::Duration;

/// Number of concurrent fetch workers when none is configured
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Maximum reported findings before the crawl stops
pub const DEFAULT_MAX_ERRORS: usize = 1000;

/// Maximum number of URLs remembered as visited
pub const DEFAULT_MAX_VISITED: usize = 1000;

/// Inactivity allowed before the crawl is abandoned
pub const DEFAULT_TIME_WAIT: Duration = Duration::from_secs(3);

/// Minimum spacing between two fetches
pub const DEFAULT_TIME_DELAY: Duration = Duration::from_secs(1);

/// Per-request transport timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Main configuration structure for Sitecheck
///
/// Every section is optional in TOML; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// The website to check
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub scope: ScopeConfig,

    #[serde(default)]
    pub checks: ChecksConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which references are followed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchConfig {
    /// Follow `href` attributes
    #[serde(default)]
    pub href: bool,

    /// Follow `src` attributes
    #[serde(default)]
    pub src: bool,

    /// Regular expression the last path segment must match to be fetched
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Host scope of the crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeConfig {
    /// Follow links to any host
    #[serde(rename = "span-hosts", default)]
    pub span_hosts: bool,

    /// Follow links to subdomains of the seed host
    #[serde(rename = "span-subdomains", default)]
    pub span_subdomains: bool,
}

/// Response classes that produce findings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecksConfig {
    /// Report 3xx responses
    #[serde(default)]
    pub redirection: bool,

    /// Report 4xx responses
    #[serde(rename = "client-errors", default)]
    pub client_errors: bool,

    /// Report 5xx responses
    #[serde(rename = "server-errors", default)]
    pub server_errors: bool,

    /// Report transport failures (DNS, connection, timeout)
    #[serde(rename = "fetch-errors", default)]
    pub fetch_errors: bool,
}

/// Crawl budgets and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(rename = "max-errors-count", default = "default_max_errors")]
    pub max_errors: usize,

    #[serde(rename = "max-visited-count", default = "default_max_visited")]
    pub max_visited: usize,

    #[serde(rename = "concurrency-level", default = "default_concurrency")]
    pub concurrency: usize,

    /// Inactivity before the crawl exits
    #[serde(
        rename = "time-wait",
        default = "default_time_wait",
        with = "humantime_serde"
    )]
    pub time_wait: Duration,

    /// Delay between two consecutive fetches
    #[serde(
        rename = "time-delay",
        default = "default_time_delay",
        with = "humantime_serde"
    )]
    pub time_delay: Duration,

    #[serde(
        rename = "request-timeout",
        default = "default_request_timeout",
        with = "humantime_serde"
    )]
    pub request_timeout: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            max_visited: DEFAULT_MAX_VISITED,
            concurrency: DEFAULT_CONCURRENCY,
            time_wait: DEFAULT_TIME_WAIT,
            time_delay: DEFAULT_TIME_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Emit findings as JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

fn default_max_errors() -> usize {
    DEFAULT_MAX_ERRORS
}

fn default_max_visited() -> usize {
    DEFAULT_MAX_VISITED
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_time_wait() -> Duration {
    DEFAULT_TIME_WAIT
}

fn default_time_delay() -> Duration {
    DEFAULT_TIME_DELAY
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}
