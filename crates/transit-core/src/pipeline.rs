use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::data_source::SourceAdapter;
use crate::domain::{RunEnvelope, RunReport, SourceSummary, UtcDateTime};
use crate::error::ValidationError;
use crate::writer::PersistenceWriter;

/// When run results reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteGranularity {
    /// One record holding every source, written after all sources ran.
    #[default]
    PerRun,
    /// One record per source, written as soon as that source is summarized.
    PerSource,
}

impl WriteGranularity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerRun => "per_run",
            Self::PerSource => "per_source",
        }
    }
}

impl Display for WriteGranularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteGranularity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_run" | "run" => Ok(Self::PerRun),
            "per_source" | "source" => Ok(Self::PerSource),
            _ => Err(ValidationError::InvalidWriteGranularity {
                value: value.to_owned(),
            }),
        }
    }
}

/// Runs every configured source once, isolating per-source failures.
pub struct Pipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    writer: PersistenceWriter,
    granularity: WriteGranularity,
}

impl Pipeline {
    /// Adapters run in the given order. Source names must be unique since
    /// they key the run envelope.
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        writer: PersistenceWriter,
        granularity: WriteGranularity,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(adapters.len());
        for adapter in &adapters {
            if !seen.insert(adapter.name()) {
                return Err(ValidationError::DuplicateSourceName {
                    name: adapter.name().to_owned(),
                });
            }
        }

        Ok(Self {
            adapters,
            writer,
            granularity,
        })
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub const fn granularity(&self) -> WriteGranularity {
        self.granularity
    }

    /// Fetches and summarizes every source without writing anything.
    pub async fn collect(&self) -> RunEnvelope {
        let (envelope, _) = self.gather(UtcDateTime::now(), false).await;
        envelope
    }

    /// One full run. `success` reflects persistence only; source failures
    /// show up as `error` entries in the summary.
    pub async fn run(&self) -> RunReport {
        let timestamp = UtcDateTime::now();
        let started = Instant::now();
        info!(
            sources = self.adapters.len(),
            granularity = %self.granularity,
            timestamp = %timestamp,
            "starting ingestion run"
        );

        let per_source = self.granularity == WriteGranularity::PerSource;
        let (envelope, all_written) = self.gather(timestamp, per_source).await;
        let success = match self.granularity {
            WriteGranularity::PerRun => self.writer.store(&envelope).await,
            WriteGranularity::PerSource => all_written,
        };

        let report = RunReport {
            success,
            timestamp,
            summary: envelope.status_summary(),
        };
        info!(
            success,
            failed_sources = report.failed_sources().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingestion run finished"
        );
        report
    }

    /// Summarizes every source in order. With `write_each`, each summary is
    /// stored as soon as it exists; the flag is false if any of those writes
    /// failed.
    async fn gather(&self, timestamp: UtcDateTime, write_each: bool) -> (RunEnvelope, bool) {
        let mut sources = BTreeMap::new();
        let mut all_written = true;
        for adapter in &self.adapters {
            let summary = summarize_source(adapter.as_ref()).await;
            if write_each {
                all_written &= self
                    .writer
                    .store_source(timestamp, adapter.name(), &summary)
                    .await;
            }
            sources.insert(adapter.name().to_owned(), summary);
        }
        (RunEnvelope::new(timestamp, sources), all_written)
    }
}

async fn summarize_source(adapter: &dyn SourceAdapter) -> SourceSummary {
    let started = Instant::now();
    let outcome = match adapter.fetch().await {
        Ok(raw) => adapter.summarize(&raw),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(data) => {
            debug!(
                source = adapter.name(),
                kind = %adapter.kind(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "source summarized"
            );
            SourceSummary::success(data)
        }
        Err(e) => {
            warn!(
                source = adapter.name(),
                code = e.code(),
                error = e.message(),
                "source failed"
            );
            SourceSummary::error(e.message())
        }
    }
}
