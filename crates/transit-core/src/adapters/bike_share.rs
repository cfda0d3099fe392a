use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::{fields, HttpSource};
use crate::data_source::{RawResponse, SourceAdapter, SourceError};
use crate::domain::{BikeShareSummary, StationSnapshot, SummaryData};
use crate::http_client::HttpClient;
use crate::source::SourceSpec;

/// Only the leading stations of a network are summarized.
pub const MAX_SUMMARIZED_STATIONS: usize = 10;

/// CityBikes network feed (`{"network": {"stations": [..]}}`).
#[derive(Clone)]
pub struct BikeShareAdapter {
    source: HttpSource,
}

impl BikeShareAdapter {
    pub fn new(spec: SourceSpec, http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            source: HttpSource::new(spec, http_client, timeout_ms),
        }
    }
}

impl SourceAdapter for BikeShareAdapter {
    fn spec(&self) -> &SourceSpec {
        self.source.spec()
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>> {
        Box::pin(self.source.fetch())
    }

    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError> {
        summarize_bike_share(raw).map(SummaryData::from)
    }
}

pub fn summarize_bike_share(raw: &RawResponse) -> Result<BikeShareSummary, SourceError> {
    let payload = fields::object(raw, "bike-share payload")?;
    let stations = match fields::optional_object(payload, "network")? {
        Some(network) => match network.get("stations") {
            None | Some(serde_json::Value::Null) => &[][..],
            Some(stations) => fields::array(stations, "network.stations")?,
        },
        None => &[][..],
    };

    let mut available_bikes = 0_u64;
    let mut available_docks = 0_u64;
    let mut stations_data = Vec::with_capacity(stations.len().min(MAX_SUMMARIZED_STATIONS));

    for (index, station) in stations.iter().take(MAX_SUMMARIZED_STATIONS).enumerate() {
        let station = fields::object(station, &format!("station {index}"))?;
        let bikes =
            fields::count_or_zero(station.get("free_bikes"), &format!("station {index} free_bikes"))?;
        let docks = fields::count_or_zero(
            station.get("empty_slots"),
            &format!("station {index} empty_slots"),
        )?;

        available_bikes = available_bikes.saturating_add(bikes);
        available_docks = available_docks.saturating_add(docks);

        stations_data.push(StationSnapshot {
            name: fields::text_or_unknown(station, "name"),
            available_bikes: bikes,
            available_docks: docks,
            latitude: fields::optional_f64(
                station.get("latitude"),
                &format!("station {index} latitude"),
            )?,
            longitude: fields::optional_f64(
                station.get("longitude"),
                &format!("station {index} longitude"),
            )?,
        });
    }

    Ok(BikeShareSummary {
        total_stations: stations.len(),
        available_bikes,
        available_docks,
        stations_data,
    })
}
