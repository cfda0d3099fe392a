//! Invocation entry point: configuration → pipeline → `{statusCode, body}`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use transit_warehouse::Warehouse;

use crate::adapters::build_adapter;
use crate::config::PipelineConfig;
use crate::domain::RunReport;
use crate::error::CoreError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::pipeline::Pipeline;
use crate::writer::{PersistenceWriter, RecordStore};

pub const SUCCESS_MESSAGE: &str = "Data ingestion complete";
pub const FAILURE_MESSAGE: &str = "Data ingestion failed";

/// Response handed back to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

impl InvocationResponse {
    pub fn completed(report: &RunReport) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "message": SUCCESS_MESSAGE,
                "success": report.success,
                "timestamp": report.timestamp,
                "summary": report.summary,
            }),
        }
    }

    pub fn failed(error: &CoreError) -> Self {
        Self {
            status_code: 500,
            body: json!({
                "error": error.to_string(),
                "message": FAILURE_MESSAGE,
            }),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// `success` flag of a completed run; `false` for failed invocations.
    pub fn storage_succeeded(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Wires adapters and writer for `config`.
pub fn build_pipeline(
    config: &PipelineConfig,
    http_client: Arc<dyn HttpClient>,
    store: Arc<dyn RecordStore>,
) -> Result<Pipeline, CoreError> {
    config.validate()?;

    let adapters = config
        .sources
        .iter()
        .cloned()
        .map(|spec| {
            build_adapter(
                spec,
                Arc::clone(&http_client),
                config.http_timeout_ms,
                config.aircraft_strategy,
            )
        })
        .collect();
    let writer = PersistenceWriter::new(store, config.write_timeout());

    Ok(Pipeline::new(adapters, writer, config.write_granularity)?)
}

/// Opens the configured warehouse and runs one pipeline pass.
pub async fn invoke(
    config: &PipelineConfig,
    http_client: Arc<dyn HttpClient>,
) -> Result<RunReport, CoreError> {
    let warehouse = Warehouse::open(config.warehouse.clone())?;
    info!(db_path = %warehouse.db_path().display(), "warehouse ready");

    let pipeline = build_pipeline(config, http_client, Arc::new(warehouse))?;
    Ok(pipeline.run().await)
}

/// Runs one invocation with the given transport. Only configuration or
/// wiring failures produce a 500; per-source and storage failures do not.
pub async fn handle_with(
    config: Result<PipelineConfig, CoreError>,
    http_client: Arc<dyn HttpClient>,
) -> InvocationResponse {
    let outcome = match config {
        Ok(config) => invoke(&config, http_client).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => InvocationResponse::completed(&report),
        Err(e) => {
            error!(error = %e, "invocation failed");
            InvocationResponse::failed(&e)
        }
    }
}

/// Runs one invocation over the network.
pub async fn handle(config: Result<PipelineConfig, CoreError>) -> InvocationResponse {
    handle_with(config, Arc::new(ReqwestHttpClient::new())).await
}

/// Reads the environment and runs one invocation over the network.
pub async fn handle_env() -> InvocationResponse {
    handle(PipelineConfig::from_env().map_err(CoreError::from)).await
}
