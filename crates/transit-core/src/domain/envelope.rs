use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{SourceSummary, SummaryStatus, UtcDateTime};

/// Aggregate result of one pipeline run, keyed by source name.
///
/// Built by the orchestrator and handed to the persistence writer once
/// complete; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEnvelope {
    pub timestamp: UtcDateTime,
    pub sources: BTreeMap<String, SourceSummary>,
}

impl RunEnvelope {
    pub fn new(timestamp: UtcDateTime, sources: BTreeMap<String, SourceSummary>) -> Self {
        Self { timestamp, sources }
    }

    /// Source name → "success"/"error".
    pub fn status_summary(&self) -> BTreeMap<String, SummaryStatus> {
        self.sources
            .iter()
            .map(|(name, summary)| (name.clone(), summary.status()))
            .collect()
    }
}

/// Run-level outcome returned to the invoking collaborator.
///
/// Carries statuses only, never summary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// True iff every persistence write of the run succeeded.
    pub success: bool,
    pub timestamp: UtcDateTime,
    pub summary: BTreeMap<String, SummaryStatus>,
}

impl RunReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = &str> {
        self.summary
            .iter()
            .filter(|(_, status)| **status == SummaryStatus::Error)
            .map(|(name, _)| name.as_str())
    }
}
