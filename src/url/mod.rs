//! URL handling module for Sitecheck
//!
//! This module provides reference resolution, seed normalization, host
//! extraction, and the scope filter that decides which discovered URLs
//! the crawl may fetch.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{filename, host_key, is_same_or_subdomain};
pub use normalize::{normalize_seed, resolve_reference};
pub use scope::{ScopeDecision, ScopeFilter};
