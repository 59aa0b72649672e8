//! JSON lines reporter
//!
//! Writes one JSON object per finding and a final `{"summary": {...}}` line,
//! so output can be streamed into `jq` or a log pipeline.

use crate::output::traits::{CrawlSummary, OutputResult, Reporter};
use crate::state::Finding;
use serde::Serialize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a CrawlSummary,
}

pub struct JsonReporter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonReporter<W> {
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

    fn write_line<T: Serialize>(&self, value: &T) -> OutputResult<()> {
        let line = serde_json::to_string(value)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn report(&self, finding: &Finding) -> OutputResult<()> {
        self.write_line(finding)
    }

    fn report_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        self.write_line(&SummaryLine { summary })
    }
}
