//! Built-in source adapters.
//!
//! Each adapter owns a [`SourceSpec`] and a shared transport, performs one GET
//! per run and reduces the payload with a pure `summarize_*` function that can
//! be exercised without a network.

mod aircraft;
mod bike_share;
pub(crate) mod fields;
mod traffic;
mod vessel;
mod weather;

use std::sync::Arc;

pub use aircraft::{
    summarize_aircraft, summarize_aircraft_counts, AircraftAdapter, AircraftStrategy,
};
pub use bike_share::{summarize_bike_share, BikeShareAdapter, MAX_SUMMARIZED_STATIONS};
pub use traffic::{summarize_traffic, TrafficAdapter, CONGESTION_THRESHOLD_MPH};
pub use vessel::{summarize_vessel_arrivals, VesselArrivalAdapter};
pub use weather::{summarize_weather, WeatherAdapter};

use crate::data_source::{fetch_json, RawResponse, SourceAdapter, SourceError};
use crate::http_client::HttpClient;
use crate::source::{SourceKind, SourceSpec};

/// Spec, transport and timeout shared by every HTTP-backed adapter.
#[derive(Clone)]
pub(crate) struct HttpSource {
    spec: SourceSpec,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl HttpSource {
    pub(crate) fn new(spec: SourceSpec, http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            spec,
            http_client,
            timeout_ms,
        }
    }

    pub(crate) fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    pub(crate) async fn fetch(&self) -> Result<RawResponse, SourceError> {
        fetch_json(self.http_client.as_ref(), &self.spec, self.timeout_ms).await
    }
}

/// Builds the adapter matching `spec.kind`.
pub fn build_adapter(
    spec: SourceSpec,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    aircraft_strategy: AircraftStrategy,
) -> Arc<dyn SourceAdapter> {
    match spec.kind {
        SourceKind::Traffic => Arc::new(TrafficAdapter::new(spec, http_client, timeout_ms)),
        SourceKind::BikeShare => Arc::new(BikeShareAdapter::new(spec, http_client, timeout_ms)),
        SourceKind::AircraftPosition => Arc::new(AircraftAdapter::new(
            spec,
            http_client,
            timeout_ms,
            aircraft_strategy,
        )),
        SourceKind::VesselArrival => {
            Arc::new(VesselArrivalAdapter::new(spec, http_client, timeout_ms))
        }
        SourceKind::Weather => Arc::new(WeatherAdapter::new(spec, http_client, timeout_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SummaryData;
    use crate::http_client::{HttpError, HttpRequest, HttpResponse};
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;

    struct StaticHttpClient(&'static str);

    impl HttpClient for StaticHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let body = self.0;
            Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
        }
    }

    fn spec(kind: SourceKind) -> SourceSpec {
        SourceSpec::new(kind.as_str(), kind, "https://api.example.test/feed").expect("valid spec")
    }

    #[test]
    fn factory_dispatches_on_kind() {
        let client: Arc<dyn HttpClient> = Arc::new(StaticHttpClient("[]"));

        for kind in SourceKind::ALL {
            let adapter = build_adapter(
                spec(kind),
                Arc::clone(&client),
                1_000,
                AircraftStrategy::default(),
            );
            assert_eq!(adapter.kind(), kind);
            assert_eq!(adapter.name(), kind.as_str());
        }
    }

    #[test]
    fn aircraft_strategy_selects_summary_shape() {
        let client: Arc<dyn HttpClient> = Arc::new(StaticHttpClient("{}"));
        let adapter = build_adapter(
            spec(SourceKind::AircraftPosition),
            client,
            1_000,
            AircraftStrategy::CategoryCounts,
        );

        let data = adapter.summarize(&json!({"states": []})).expect("summary");
        assert!(matches!(data, SummaryData::AircraftCounts(_)));
    }

    #[tokio::test]
    async fn adapter_fetch_then_summarize() {
        let client: Arc<dyn HttpClient> =
            Arc::new(StaticHttpClient(r#"[{"speed":"30"},{"speed":"10"}]"#));
        let adapter = build_adapter(
            spec(SourceKind::Traffic),
            client,
            1_000,
            AircraftStrategy::default(),
        );

        let raw = adapter.fetch().await.expect("fetch");
        let data = adapter.summarize(&raw).expect("summary");
        let SummaryData::Traffic(summary) = data else {
            panic!("expected traffic summary");
        };
        assert_eq!(summary.average_speed, 20.0);
        assert_eq!(summary.congested_segments, 1);
    }
}
