//! Sitecheck main entry point
//!
//! This is the command-line interface for the sitecheck link checker.

use anyhow::Context;
use clap::{ArgAction, Parser};
use sitecheck::config::{read_config, Config};
use sitecheck::output::reporter_for;
use sitecheck::{check_site, Settings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sitecheck: a single-site link checker
///
/// Sitecheck crawls every page reachable from a seed URL and reports
/// references that answer with redirections, client errors, server errors
/// or transport failures.
#[derive(Parser, Debug)]
#[command(name = "sitecheck")]
#[command(version, disable_version_flag = true)]
#[command(about = "Crawl a site and report broken links", long_about = None)]
struct Cli {
    /// Seed URL; the scheme defaults to http
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Follow href attributes (a, area, link)
    #[arg(long)]
    watch_href: bool,

    /// Follow src attributes (img, script, iframe, ...)
    #[arg(long)]
    watch_src: bool,

    /// Only fetch URLs whose last path segment matches this regex
    #[arg(long, value_name = "REGEX")]
    watch_pattern: Option<String>,

    /// Follow references to any host
    #[arg(long)]
    span_hosts: bool,

    /// Follow references to subdomains of the seed host
    #[arg(long)]
    span_subdomains: bool,

    /// Report 3xx responses
    #[arg(long)]
    check_redirection: bool,

    /// Report 4xx responses
    #[arg(long)]
    check_client_errors: bool,

    /// Report 5xx responses
    #[arg(long)]
    check_server_errors: bool,

    /// Report requests that failed without a response
    #[arg(long)]
    check_fetch_errors: bool,

    /// Stop after this many findings
    #[arg(long, value_name = "N")]
    max_errors_count: Option<usize>,

    /// Capacity of the visited URL set
    #[arg(long, value_name = "N")]
    max_visited_count: Option<usize>,

    /// Number of concurrent fetch workers
    #[arg(long, value_name = "N")]
    concurrency_level: Option<usize>,

    /// Stop after this long without activity (e.g. "3s")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    time_wait: Option<Duration>,

    /// Minimum delay between two requests (e.g. "1s", "250ms")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    time_delay: Option<Duration>,

    /// Timeout for a single request
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    request_timeout: Option<Duration>,

    /// Output findings as JSON lines
    #[arg(short, long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    debug: bool,

    /// Suppress everything but errors on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Layers the command-line flags over a base configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }

        config.watch.href |= self.watch_href;
        config.watch.src |= self.watch_src;
        if let Some(pattern) = &self.watch_pattern {
            config.watch.pattern = Some(pattern.clone());
        }

        config.scope.span_hosts |= self.span_hosts;
        config.scope.span_subdomains |= self.span_subdomains;

        config.checks.redirection |= self.check_redirection;
        config.checks.client_errors |= self.check_client_errors;
        config.checks.server_errors |= self.check_server_errors;
        config.checks.fetch_errors |= self.check_fetch_errors;

        if let Some(n) = self.max_errors_count {
            config.limits.max_errors = n;
        }
        if let Some(n) = self.max_visited_count {
            config.limits.max_visited = n;
        }
        if let Some(n) = self.concurrency_level {
            config.limits.concurrency = n;
        }
        if let Some(d) = self.time_wait {
            config.limits.time_wait = d;
        }
        if let Some(d) = self.time_delay {
            config.limits.time_delay = d;
        }
        if let Some(d) = self.request_timeout {
            config.limits.request_timeout = d;
        }

        config.output.json |= self.json;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.debug, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Sets up the logging/tracing subscriber; logs go to stderr
fn setup_logging(debug: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if debug {
        EnvFilter::new("sitecheck=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitecheck=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the settings, runs the crawl and maps the outcome to an exit code
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    let config = cli.apply(base);
    let settings = Settings::from_config(&config).context("invalid configuration")?;

    let reporter = reporter_for(settings.json, std::io::stdout());
    let summary = check_site(settings, reporter).await?;

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
