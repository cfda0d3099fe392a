use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::adapters::{fields, HttpSource};
use crate::data_source::{RawResponse, SourceAdapter, SourceError};
use crate::domain::{AircraftCategoryCounts, AircraftPosition, AircraftSummary, SummaryData};
use crate::error::ValidationError;
use crate::http_client::HttpClient;
use crate::source::SourceSpec;

// State vector offsets.
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const LATITUDE: usize = 5;
const LONGITUDE: usize = 6;
const CATEGORY: usize = 17;

/// How aircraft state vectors are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AircraftStrategy {
    /// Keep rows with both coordinates and list them.
    #[default]
    FilteredRows,
    /// Tally every row by category code and origin country.
    CategoryCounts,
}

impl AircraftStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FilteredRows => "filtered_rows",
            Self::CategoryCounts => "category_counts",
        }
    }
}

impl Display for AircraftStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AircraftStrategy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "filtered_rows" | "rows" | "a" => Ok(Self::FilteredRows),
            "category_counts" | "counts" | "b" => Ok(Self::CategoryCounts),
            _ => Err(ValidationError::InvalidAircraftStrategy {
                value: value.to_owned(),
            }),
        }
    }
}

/// OpenSky `states/all` feed.
#[derive(Clone)]
pub struct AircraftAdapter {
    source: HttpSource,
    strategy: AircraftStrategy,
}

impl AircraftAdapter {
    pub fn new(
        spec: SourceSpec,
        http_client: Arc<dyn HttpClient>,
        timeout_ms: u64,
        strategy: AircraftStrategy,
    ) -> Self {
        Self {
            source: HttpSource::new(spec, http_client, timeout_ms),
            strategy,
        }
    }

    pub const fn strategy(&self) -> AircraftStrategy {
        self.strategy
    }
}

impl SourceAdapter for AircraftAdapter {
    fn spec(&self) -> &SourceSpec {
        self.source.spec()
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>> {
        Box::pin(self.source.fetch())
    }

    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError> {
        match self.strategy {
            AircraftStrategy::FilteredRows => summarize_aircraft(raw).map(SummaryData::from),
            AircraftStrategy::CategoryCounts => {
                summarize_aircraft_counts(raw).map(SummaryData::from)
            }
        }
    }
}

/// Lists aircraft that report both coordinates; rows missing either are dropped.
pub fn summarize_aircraft(raw: &RawResponse) -> Result<AircraftSummary, SourceError> {
    let mut aircraft_data = Vec::new();

    for (index, row) in state_rows(raw)?.iter().enumerate() {
        let row = fields::array(row, &format!("state {index}"))?;
        let latitude = coordinate(row, LATITUDE, index, "latitude")?;
        let longitude = coordinate(row, LONGITUDE, index, "longitude")?;

        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            continue;
        };

        aircraft_data.push(AircraftPosition {
            icao24: text_at(row, ICAO24),
            callsign: text_at(row, CALLSIGN),
            origin_country: text_at(row, ORIGIN_COUNTRY),
            latitude,
            longitude,
        });
    }

    Ok(AircraftSummary {
        total_aircraft: aircraft_data.len(),
        aircraft_data,
    })
}

pub fn summarize_aircraft_counts(
    raw: &RawResponse,
) -> Result<AircraftCategoryCounts, SourceError> {
    let rows = state_rows(raw)?;
    let mut by_type_code = BTreeMap::new();
    let mut by_origin_country = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        let row = fields::array(row, &format!("state {index}"))?;
        *by_type_code.entry(fields::label(row.get(CATEGORY))).or_insert(0) += 1;
        *by_origin_country
            .entry(fields::label(row.get(ORIGIN_COUNTRY)))
            .or_insert(0) += 1;
    }

    Ok(AircraftCategoryCounts {
        total_aircraft: rows.len(),
        by_type_code,
        by_origin_country,
    })
}

fn state_rows(raw: &RawResponse) -> Result<&[Value], SourceError> {
    let payload = fields::object(raw, "aircraft payload")?;
    match payload.get("states") {
        None | Some(Value::Null) => Ok(&[]),
        Some(states) => fields::array(states, "states"),
    }
}

fn coordinate(
    row: &[Value],
    offset: usize,
    index: usize,
    axis: &str,
) -> Result<Option<f64>, SourceError> {
    fields::optional_f64(row.get(offset), &format!("state {index} {axis}"))
}

fn text_at(row: &[Value], offset: usize) -> Option<String> {
    row.get(offset)
        .and_then(Value::as_str)
        .map(|text| text.trim().to_owned())
}
