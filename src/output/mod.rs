//! Output module for reporting findings and crawl summaries
//!
//! This module handles:
//! - Emitting findings as they are produced (text or JSON lines)
//! - Writing the end-of-crawl summary
//! - Collecting results in memory for library callers and tests

mod json;
mod memory;
mod text;
mod traits;

pub use json::JsonReporter;
pub use memory::CollectingReporter;
pub use text::{format_finding, TextReporter};
pub use traits::{CrawlSummary, OutputError, OutputResult, Reporter};

use std::io::Write;
use std::sync::Arc;

/// Builds the reporter selected by the output settings
///
/// # Arguments
///
/// * `json` - Emit JSON lines instead of plain text
/// * `writer` - Destination for findings and the summary
pub fn reporter_for<W>(json: bool, writer: W) -> Arc<dyn Reporter>
where
    W: Write + Send + 'static,
{
    if json {
        Arc::new(JsonReporter::new(writer))
    } else {
        Arc::new(TextReporter::new(writer))
    }
}
