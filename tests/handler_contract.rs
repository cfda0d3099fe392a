//! Contract tests for the invocation handler response shape.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use transit_core::{
    handle_with, CoreError, HttpClient, HttpError, HttpRequest, HttpResponse, PipelineConfig,
    SourceKind, SourceSpec, ValidationError, Warehouse, WarehouseConfig, WriteGranularity,
};

struct TrafficOnlyClient;

impl HttpClient for TrafficOnlyClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = if request.url.contains("traffic") {
            Ok(HttpResponse::ok_json(r#"[{"speed":"20"},{"speed":"8"}]"#))
        } else {
            Err(HttpError::new("connection refused"))
        };
        Box::pin(async move { response })
    }
}

fn config(home: &std::path::Path) -> PipelineConfig {
    PipelineConfig::builder()
        .with_source(
            SourceSpec::new("NYC_Traffic", SourceKind::Traffic, "https://traffic.example.test")
                .expect("spec"),
        )
        .with_source(
            SourceSpec::new("Weather_NYC", SourceKind::Weather, "https://weather.example.test")
                .expect("spec"),
        )
        .with_warehouse(WarehouseConfig::at_home(home))
        .build()
        .expect("config")
}

#[tokio::test]
async fn completed_run_returns_200_with_status_summary() {
    let temp = tempdir().expect("tempdir");

    let response = handle_with(Ok(config(temp.path())), Arc::new(TrafficOnlyClient)).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["message"], "Data ingestion complete");
    assert_eq!(response.body["success"], true);
    assert_eq!(
        response.body["summary"],
        json!({"NYC_Traffic": "success", "Weather_NYC": "error"})
    );
    let timestamp = response.body["timestamp"].as_str().expect("timestamp");
    assert!(timestamp.ends_with('Z'), "timestamp is UTC: {timestamp}");

    let warehouse =
        Warehouse::open(WarehouseConfig::at_home(temp.path())).expect("warehouse reopen");
    assert_eq!(warehouse.record_count().expect("count"), 1);
}

#[tokio::test]
async fn per_source_configuration_is_honored() {
    let temp = tempdir().expect("tempdir");
    let mut config = config(temp.path());
    config.write_granularity = WriteGranularity::PerSource;

    let response = handle_with(Ok(config), Arc::new(TrafficOnlyClient)).await;
    assert!(response.storage_succeeded());

    let warehouse =
        Warehouse::open(WarehouseConfig::at_home(temp.path())).expect("warehouse reopen");
    assert_eq!(warehouse.record_count().expect("count"), 2);
}

#[tokio::test]
async fn invalid_configuration_returns_500() {
    let response = handle_with(
        Err(CoreError::from(ValidationError::InvalidAircraftStrategy {
            value: String::from("histogram"),
        })),
        Arc::new(TrafficOnlyClient),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body["message"], "Data ingestion failed");
    assert!(response.body["error"]
        .as_str()
        .expect("error")
        .contains("histogram"));
    assert!(response.body.get("summary").is_none());
}

#[tokio::test]
async fn unusable_warehouse_location_returns_500() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").expect("write file");

    let response = handle_with(
        Ok(config(&blocker.join("nested"))),
        Arc::new(TrafficOnlyClient),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert!(!response.storage_succeeded());
    assert_eq!(response.body["message"], "Data ingestion failed");
}
