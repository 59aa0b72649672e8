//! Configuration module for Sitecheck
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and deriving the immutable [`Settings`] snapshot the crawl engine
//! runs with.
//!
//! # Example
//!
//! ```no_run
//! use sitecheck::config::{load_config, Settings};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitecheck.toml")).unwrap();
//! let settings = Settings::from_config(&config).unwrap();
//! println!("Checking {} with {} workers", settings.seed, settings.concurrency);
//! ```

mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use settings::Settings;
pub use types::{
    ChecksConfig, Config, LimitsConfig, OutputConfig, ScopeConfig, WatchConfig,
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ERRORS, DEFAULT_MAX_VISITED, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TIME_DELAY, DEFAULT_TIME_WAIT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, read_config};
pub use validation::validate;
