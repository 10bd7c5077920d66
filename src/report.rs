use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::inspector::StreamQueryResult;

pub const DEFAULT_REPORT_PATH: &str = "invidious_test_results.json";

/// Snapshot of a streams run, saved for later manual inspection
#[derive(Debug, Serialize)]
pub struct TestReport<'a> {
    pub timestamp: DateTime<Utc>,
    pub channel_id: &'a str,
    pub results: &'a [StreamQueryResult],
}

impl<'a> TestReport<'a> {
    #[must_use]
    pub fn new(channel_id: &'a str, results: &'a [StreamQueryResult]) -> Self {
        Self {
            timestamp: Utc::now(),
            channel_id,
            results,
        }
    }

    /// Writes the report as pretty-printed JSON, replacing any existing file
    ///
    /// # Errors
    /// Errors when the file cannot be written
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Serializing test report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Writing test report to {}", path.display()))
    }
}
