//! Contract checks every built-in source adapter must satisfy.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};
use transit_core::{
    build_adapter, AircraftStrategy, HttpClient, HttpError, HttpRequest, HttpResponse,
    SourceErrorKind, SourceKind, SourceSpec, SummaryData,
};

/// Serves one fixed body for every request.
struct FixedHttpClient {
    response: Result<HttpResponse, HttpError>,
}

impl HttpClient for FixedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

struct AdapterCase {
    kind: SourceKind,
    strategy: AircraftStrategy,
    valid: Value,
    malformed: Vec<Value>,
}

fn adapter_cases() -> Vec<AdapterCase> {
    vec![
        AdapterCase {
            kind: SourceKind::Traffic,
            strategy: AircraftStrategy::default(),
            valid: json!([{"speed": "42.1", "borough": "Queens", "link_name": "BQE"}]),
            malformed: vec![json!({"rows": []}), json!([{"speed": "fast"}]), json!([7])],
        },
        AdapterCase {
            kind: SourceKind::BikeShare,
            strategy: AircraftStrategy::default(),
            valid: json!({"network": {"stations": [{"name": "W 52 St", "free_bikes": 3}]}}),
            malformed: vec![
                json!([]),
                json!({"network": {"stations": {}}}),
                json!({"network": {"stations": [{"free_bikes": "3"}]}}),
            ],
        },
        AdapterCase {
            kind: SourceKind::AircraftPosition,
            strategy: AircraftStrategy::FilteredRows,
            valid: json!({"states": [["abc123", "UAL1", "United States", null, null, 40.7, -73.9]]}),
            malformed: vec![
                json!([]),
                json!({"states": "none"}),
                json!({"states": [["abc", "X", "Y", null, null, "40.7", -73.9]]}),
            ],
        },
        AdapterCase {
            kind: SourceKind::AircraftPosition,
            strategy: AircraftStrategy::CategoryCounts,
            valid: json!({"states": [["abc123", "UAL1", "United States"]]}),
            malformed: vec![json!("down"), json!({"states": [42]})],
        },
        AdapterCase {
            kind: SourceKind::VesselArrival,
            strategy: AircraftStrategy::default(),
            valid: json!([{"type": "Tanker"}]),
            malformed: vec![json!(3), json!({"arrivals": "soon"}), json!(["Tanker"])],
        },
        AdapterCase {
            kind: SourceKind::Weather,
            strategy: AircraftStrategy::default(),
            valid: json!({"name": "New York", "main": {"temp": 12.0}}),
            malformed: vec![json!([]), json!({"main": []}), json!({"wind": {"speed": "4"}})],
        },
    ]
}

fn spec(kind: SourceKind) -> SourceSpec {
    SourceSpec::new(kind.as_str(), kind, "https://feeds.example.test/v1").expect("valid spec")
}

fn unreachable_client() -> Arc<dyn HttpClient> {
    Arc::new(FixedHttpClient {
        response: Err(HttpError::new("connection refused")),
    })
}

#[test]
fn every_adapter_summarizes_its_valid_payload() {
    for case in adapter_cases() {
        let adapter = build_adapter(spec(case.kind), unreachable_client(), 1_000, case.strategy);

        let data = adapter.summarize(&case.valid).unwrap_or_else(|error| {
            panic!("adapter '{}' ({}) rejected valid input: {error}", case.kind, case.strategy)
        });
        let matches_kind = match case.kind {
            SourceKind::Traffic => matches!(data, SummaryData::Traffic(_)),
            SourceKind::BikeShare => matches!(data, SummaryData::BikeShare(_)),
            SourceKind::AircraftPosition => match case.strategy {
                AircraftStrategy::FilteredRows => matches!(data, SummaryData::Aircraft(_)),
                AircraftStrategy::CategoryCounts => matches!(data, SummaryData::AircraftCounts(_)),
            },
            SourceKind::VesselArrival => matches!(data, SummaryData::VesselArrivals(_)),
            SourceKind::Weather => matches!(data, SummaryData::Weather(_)),
        };
        assert!(matches_kind, "adapter '{}': summary shape", case.kind);
    }
}

#[test]
fn malformed_payloads_become_summarize_errors_with_messages() {
    for case in adapter_cases() {
        let adapter = build_adapter(spec(case.kind), unreachable_client(), 1_000, case.strategy);

        for payload in &case.malformed {
            let error = adapter.summarize(payload).expect_err(&format!(
                "adapter '{}' accepted malformed payload {payload}",
                case.kind
            ));
            assert_eq!(
                error.kind(),
                SourceErrorKind::Summarize,
                "adapter '{}': error kind",
                case.kind
            );
            assert!(
                !error.message().trim().is_empty(),
                "adapter '{}': error message must not be empty",
                case.kind
            );
        }
    }
}

#[tokio::test]
async fn every_adapter_reports_transport_failures_as_fetch_errors() {
    for case in adapter_cases() {
        let adapter = build_adapter(spec(case.kind), unreachable_client(), 1_000, case.strategy);

        let error = adapter.fetch().await.expect_err("transport is down");
        assert_eq!(error.kind(), SourceErrorKind::Fetch, "adapter '{}'", case.kind);
        assert!(error.message().contains("connection refused"));
    }
}

#[tokio::test]
async fn non_json_bodies_are_summarize_errors() {
    let client: Arc<dyn HttpClient> = Arc::new(FixedHttpClient {
        response: Ok(HttpResponse::ok_json("<html>maintenance</html>")),
    });

    for kind in SourceKind::ALL {
        let adapter = build_adapter(
            spec(kind),
            Arc::clone(&client),
            1_000,
            AircraftStrategy::default(),
        );
        let error = adapter.fetch().await.expect_err("body is not JSON");
        assert_eq!(error.kind(), SourceErrorKind::Summarize, "adapter '{kind}'");
    }
}
