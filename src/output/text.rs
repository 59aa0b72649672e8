//! Plain-text reporter
//!
//! One line per finding, followed by a short summary block:
//!
//! ```text
//! 404 clientError http://example.com/missing (from http://example.com/)
//! ERR fetchError http://example.com/down: request timeout
//!
//! Finished: budgetExceeded after 1s 204ms
//!   visited: 2
//!   fetched: 2
//!   errors reported: 2
//!     clientError: 1
//!     fetchError: 1
//! ```

use crate::output::traits::{CrawlSummary, OutputResult, Reporter};
use crate::state::{Category, Finding};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

pub struct TextReporter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the reporter, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Formats a finding as a single line, without the trailing newline
pub fn format_finding(finding: &Finding) -> String {
    let status = finding
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "ERR".to_string());

    let mut line = format!("{} {} {}", status, finding.category, finding.url);
    if let Some(error) = &finding.error {
        line.push_str(": ");
        line.push_str(error);
    }
    if let Some(parent) = &finding.parent {
        line.push_str(&format!(" (from {})", parent));
    }
    line
}

impl<W: Write + Send> Reporter for TextReporter<W> {
    fn report(&self, finding: &Finding) -> OutputResult<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", format_finding(finding))?;
        writer.flush()?;
        Ok(())
    }

    fn report_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        writeln!(writer)?;
        writeln!(
            writer,
            "Finished: {} after {}",
            summary.reason,
            humantime::format_duration(round_to_millis(summary.elapsed))
        )?;
        writeln!(writer, "  visited: {}", summary.visited())?;
        writeln!(writer, "  fetched: {}", summary.stats.fetched)?;
        writeln!(writer, "  errors reported: {}", summary.reported_errors())?;
        for category in Category::ALL {
            let count = summary.findings_in(category);
            if count > 0 {
                writeln!(writer, "    {}: {}", category, count)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn round_to_millis(duration: std::time::Duration) -> std::time::Duration {
    std::time::Duration::from_millis(duration.as_millis() as u64)
}
