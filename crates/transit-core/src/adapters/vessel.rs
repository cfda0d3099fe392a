use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::adapters::{fields, HttpSource};
use crate::data_source::{RawResponse, SourceAdapter, SourceError};
use crate::domain::{SummaryData, VesselArrivalSummary};
use crate::http_client::HttpClient;
use crate::source::SourceSpec;

/// Expected port arrivals feed.
#[derive(Clone)]
pub struct VesselArrivalAdapter {
    source: HttpSource,
}

impl VesselArrivalAdapter {
    pub fn new(spec: SourceSpec, http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            source: HttpSource::new(spec, http_client, timeout_ms),
        }
    }
}

impl SourceAdapter for VesselArrivalAdapter {
    fn spec(&self) -> &SourceSpec {
        self.source.spec()
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>> {
        Box::pin(self.source.fetch())
    }

    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError> {
        summarize_vessel_arrivals(raw).map(SummaryData::from)
    }
}

/// Counts arrivals per vessel `type`.
///
/// Accepts either a bare list or an object wrapping it under `arrivals`.
pub fn summarize_vessel_arrivals(raw: &RawResponse) -> Result<VesselArrivalSummary, SourceError> {
    let arrivals = match raw {
        Value::Object(payload) => match payload.get("arrivals") {
            None | Some(Value::Null) => &[][..],
            Some(arrivals) => fields::array(arrivals, "arrivals")?,
        },
        other => fields::array(other, "vessel payload")?,
    };

    let mut vessel_types = BTreeMap::new();
    for (index, arrival) in arrivals.iter().enumerate() {
        let arrival = fields::object(arrival, &format!("arrival {index}"))?;
        *vessel_types
            .entry(fields::label(arrival.get("type")))
            .or_insert(0) += 1;
    }

    Ok(VesselArrivalSummary {
        total_arrivals: arrivals.len(),
        vessel_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use serde_json::json;

    #[test]
    fn tallies_vessel_types() {
        let raw = json!([
            {"mmsi": 1, "type": "Cargo"},
            {"mmsi": 2, "type": "Cargo"},
            {"mmsi": 3, "type": 70},
            {"mmsi": 4}
        ]);

        let summary = summarize_vessel_arrivals(&raw).expect("summary");
        assert_eq!(summary.total_arrivals, 4);
        assert_eq!(summary.vessel_types.get("Cargo"), Some(&2));
        assert_eq!(summary.vessel_types.get("70"), Some(&1));
        assert_eq!(summary.vessel_types.get("Unknown"), Some(&1));
    }

    #[test]
    fn accepts_wrapped_arrivals() {
        let summary = summarize_vessel_arrivals(&json!({"arrivals": [{"type": "Tanker"}]}))
            .expect("summary");
        assert_eq!(summary.total_arrivals, 1);

        let empty = summarize_vessel_arrivals(&json!({})).expect("summary");
        assert_eq!(empty.total_arrivals, 0);
        assert!(empty.vessel_types.is_empty());
    }

    #[test]
    fn scalar_payload_is_malformed() {
        let error = summarize_vessel_arrivals(&json!("quota exceeded")).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Summarize);
        assert!(error.message().contains("string"));
    }
}
