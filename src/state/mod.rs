//! State module for tracking crawl progress
//!
//! This module provides the state shared by every worker during a crawl.
//!
//! # Components
//!
//! - `VisitedSet`: capped, FIFO-evicting record of URLs already fetched
//! - `CrawlState`: counters, the idle clock, and the termination flag
//! - `Finding` / `Category`: the immutable records produced for reporting

mod crawl_state;
mod finding;
mod visited;

// Re-export main types
pub use crawl_state::{Admission, CrawlState, CrawlStats, TerminationReason};
pub use finding::{Category, Finding};
pub use visited::VisitedSet;
