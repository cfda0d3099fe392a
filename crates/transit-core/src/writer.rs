//! Durable writes of run results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};
use transit_warehouse::{StoredRecord, Warehouse, WarehouseError, PROCESSED_STATUS};
use uuid::Uuid;

use crate::domain::{RunEnvelope, SourceSummary, UtcDateTime};

/// Default bound on a single durable write.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

/// Append-only sink for stored records.
///
/// Implementations are blocking; the writer moves calls onto the blocking pool.
pub trait RecordStore: Send + Sync {
    fn put(&self, record: &StoredRecord) -> Result<(), WarehouseError>;
}

impl RecordStore for Warehouse {
    fn put(&self, record: &StoredRecord) -> Result<(), WarehouseError> {
        self.put_record(record)
    }
}

/// Serializes run results into [`StoredRecord`]s and hands them to a store.
///
/// Failures are logged and reported as `false`; they never propagate.
#[derive(Clone)]
pub struct PersistenceWriter {
    store: Arc<dyn RecordStore>,
    write_timeout: Duration,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn RecordStore>, write_timeout: Duration) -> Self {
        Self {
            store,
            write_timeout,
        }
    }

    pub const fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Stores the whole envelope as one record whose `data` is the `sources` map.
    pub async fn store(&self, envelope: &RunEnvelope) -> bool {
        let data = match serde_json::to_string(&envelope.sources) {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "failed to serialize run envelope");
                return false;
            }
        };

        self.put(new_record(envelope.timestamp, None, data)).await
    }

    /// Stores one source's summary as its own record.
    pub async fn store_source(
        &self,
        timestamp: UtcDateTime,
        name: &str,
        summary: &SourceSummary,
    ) -> bool {
        let data = match serde_json::to_string(summary) {
            Ok(data) => data,
            Err(e) => {
                error!(source = name, error = %e, "failed to serialize source summary");
                return false;
            }
        };

        self.put(new_record(timestamp, Some(name.to_owned()), data))
            .await
    }

    async fn put(&self, record: StoredRecord) -> bool {
        let store = Arc::clone(&self.store);
        let record_id = record.id.clone();
        let source = record.source.clone().unwrap_or_default();
        let started = Instant::now();

        let task = tokio::task::spawn_blocking(move || store.put(&record));
        match tokio::time::timeout(self.write_timeout, task).await {
            Ok(Ok(Ok(()))) => {
                info!(
                    record_id = %record_id,
                    source = %source,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "stored transit record"
                );
                true
            }
            Ok(Ok(Err(e))) => {
                error!(record_id = %record_id, source = %source, error = %e, "record write failed");
                false
            }
            Ok(Err(join_err)) => {
                error!(record_id = %record_id, error = %join_err, "record write task failed");
                false
            }
            Err(_) => {
                error!(
                    record_id = %record_id,
                    timeout_ms = self.write_timeout.as_millis() as u64,
                    "record write timed out"
                );
                false
            }
        }
    }
}

fn new_record(timestamp: UtcDateTime, source: Option<String>, data: String) -> StoredRecord {
    StoredRecord {
        id: Uuid::new_v4().to_string(),
        timestamp: timestamp.format_rfc3339(),
        source,
        data,
        status: PROCESSED_STATUS.to_owned(),
    }
}
