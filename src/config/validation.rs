use crate::config::types::{ChecksConfig, Config, LimitsConfig, WatchConfig};
use crate::url::normalize_seed;
use crate::ConfigError;
use regex::Regex;
use std::time::Duration;
use url::Url;

/// Upper bound for every configured duration
const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed(config.url.as_deref())?;
    validate_watch_config(&config.watch)?;
    validate_checks_config(&config.checks)?;
    validate_limits_config(&config.limits)?;
    Ok(())
}

/// Validates the seed URL and returns it in absolute form
pub(crate) fn validate_seed(seed: Option<&str>) -> Result<Url, ConfigError> {
    let seed = match seed {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => {
            return Err(ConfigError::Validation(
                "URL to be checked is missing".to_string(),
            ))
        }
    };

    normalize_seed(seed).map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", seed, e)))
}

/// Validates watch configuration
fn validate_watch_config(config: &WatchConfig) -> Result<(), ConfigError> {
    if !config.href && !config.src {
        return Err(ConfigError::Validation(
            "nothing to watch, enable href and/or src".to_string(),
        ));
    }

    if let Some(pattern) = &config.pattern {
        compile_pattern(pattern)?;
    }

    Ok(())
}

/// Compiles a filename pattern
///
/// Patterns are matched against the last path segment only, so a slash can
/// never match and is rejected outright.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Option<Regex>, ConfigError> {
    if pattern.is_empty() {
        return Ok(None);
    }

    if pattern.contains('/') {
        return Err(ConfigError::InvalidPattern(format!(
            "file pattern '{}' should not contain a slash '/'",
            pattern
        )));
    }

    Regex::new(pattern)
        .map(Some)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}' failed to compile: {}", pattern, e)))
}

/// Validates that at least one response class is checked
fn validate_checks_config(config: &ChecksConfig) -> Result<(), ConfigError> {
    if !config.redirection && !config.client_errors && !config.server_errors && !config.fetch_errors
    {
        return Err(ConfigError::Validation(
            "nothing to check, enable at least one check category".to_string(),
        ));
    }
    Ok(())
}

/// Validates crawl limits
fn validate_limits_config(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency-level must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.max_errors < 1 {
        return Err(ConfigError::Validation(format!(
            "max-errors-count must be >= 1, got {}",
            config.max_errors
        )));
    }

    if config.max_visited < 1 {
        return Err(ConfigError::Validation(format!(
            "max-visited-count must be >= 1, got {}",
            config.max_visited
        )));
    }

    if config.time_wait.is_zero() {
        return Err(ConfigError::Validation(
            "time-wait must be greater than zero".to_string(),
        ));
    }

    for (name, value) in [
        ("time-wait", config.time_wait),
        ("time-delay", config.time_delay),
        ("request-timeout", config.request_timeout),
    ] {
        if value > MAX_DURATION {
            return Err(ConfigError::Validation(format!(
                "{} must not exceed {:?}, got {:?}",
                name, MAX_DURATION, value
            )));
        }
    }

    Ok(())
}
