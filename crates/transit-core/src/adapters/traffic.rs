use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::{fields, HttpSource};
use crate::data_source::{RawResponse, SourceAdapter, SourceError};
use crate::domain::{SummaryData, TrafficLocation, TrafficSummary};
use crate::http_client::HttpClient;
use crate::source::SourceSpec;

/// Segments slower than this (mph) count as congested.
pub const CONGESTION_THRESHOLD_MPH: f64 = 15.0;

/// Real-time traffic speed feed (NYC DOT shape: a list of link records).
#[derive(Clone)]
pub struct TrafficAdapter {
    source: HttpSource,
}

impl TrafficAdapter {
    pub fn new(spec: SourceSpec, http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            source: HttpSource::new(spec, http_client, timeout_ms),
        }
    }
}

impl SourceAdapter for TrafficAdapter {
    fn spec(&self) -> &SourceSpec {
        self.source.spec()
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>> {
        Box::pin(self.source.fetch())
    }

    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError> {
        summarize_traffic(raw).map(SummaryData::from)
    }
}

/// Average speed, congested segment count and per-link listing.
///
/// Missing `speed` counts as 0; it may arrive as a number or numeric text.
pub fn summarize_traffic(raw: &RawResponse) -> Result<TrafficSummary, SourceError> {
    let records = fields::array(raw, "traffic payload")?;

    let mut total_speed = 0.0;
    let mut congested_segments = 0;
    let mut locations = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let record = fields::object(record, &format!("traffic record {index}"))?;
        let speed = fields::lenient_f64(record.get("speed"), &format!("record {index} speed"))?
            .unwrap_or(0.0);

        total_speed += speed;
        if speed < CONGESTION_THRESHOLD_MPH {
            congested_segments += 1;
        }

        locations.push(TrafficLocation {
            speed,
            borough: fields::text_or_unknown(record, "borough"),
            link_name: fields::text_or_unknown(record, "link_name"),
        });
    }

    let total_records = records.len();
    let average_speed = if total_records == 0 {
        0.0
    } else {
        total_speed / total_records as f64
    };

    Ok(TrafficSummary {
        total_records,
        average_speed,
        congested_segments,
        locations,
    })
}
