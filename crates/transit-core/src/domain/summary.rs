use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Outcome label for one source in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Success,
    Error,
}

impl SummaryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl Display for SummaryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source result of one run: the reduced data, or why there is none.
///
/// Serializes as `{"status":"success","data":{..}}` or
/// `{"status":"error","message":".."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceSummary {
    Success { data: SummaryData },
    Error { message: String },
}

impl SourceSummary {
    pub fn success(data: impl Into<SummaryData>) -> Self {
        Self::Success { data: data.into() }
    }

    /// Error summary. A blank message is replaced so the error is never silent.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            String::from("unspecified source error")
        } else {
            message
        };
        Self::Error { message }
    }

    pub const fn status(&self) -> SummaryStatus {
        match self {
            Self::Success { .. } => SummaryStatus::Success,
            Self::Error { .. } => SummaryStatus::Error,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&SummaryData> {
        match self {
            Self::Success { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Error { message } => Some(message.as_str()),
        }
    }
}

/// Reduced payload produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryData {
    Traffic(TrafficSummary),
    BikeShare(BikeShareSummary),
    Aircraft(AircraftSummary),
    AircraftCounts(AircraftCategoryCounts),
    VesselArrivals(VesselArrivalSummary),
    Weather(WeatherSummary),
}

macro_rules! impl_from_summary {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SummaryData {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_summary! {
    Traffic => TrafficSummary,
    BikeShare => BikeShareSummary,
    Aircraft => AircraftSummary,
    AircraftCounts => AircraftCategoryCounts,
    VesselArrivals => VesselArrivalSummary,
    Weather => WeatherSummary,
}

/// Road-speed summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub total_records: usize,
    pub average_speed: f64,
    pub congested_segments: usize,
    pub locations: Vec<TrafficLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficLocation {
    pub speed: f64,
    pub borough: String,
    pub link_name: String,
}

/// Bike-share availability over the leading stations of a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeShareSummary {
    pub total_stations: usize,
    pub available_bikes: u64,
    pub available_docks: u64,
    pub stations_data: Vec<StationSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub name: String,
    pub available_bikes: u64,
    pub available_docks: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Positioned aircraft listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftSummary {
    pub total_aircraft: usize,
    pub aircraft_data: Vec<AircraftPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftPosition {
    pub icao24: Option<String>,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Aircraft tallies by category code and by origin country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftCategoryCounts {
    pub total_aircraft: usize,
    pub by_type_code: BTreeMap<String, usize>,
    pub by_origin_country: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselArrivalSummary {
    pub total_arrivals: usize,
    pub vessel_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub city: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub conditions: String,
    pub wind_speed: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_summary_serializes_with_status_tag() {
        let summary = SourceSummary::success(VesselArrivalSummary {
            total_arrivals: 1,
            vessel_types: BTreeMap::from([(String::from("Cargo"), 1)]),
        });

        let value = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(
            value,
            json!({
                "status": "success",
                "data": {"total_arrivals": 1, "vessel_types": {"Cargo": 1}}
            })
        );
    }

    #[test]
    fn error_summary_never_has_blank_message() {
        let summary = SourceSummary::error("   ");
        assert_eq!(summary.status(), SummaryStatus::Error);
        assert!(!summary.message().expect("message").trim().is_empty());

        let value = serde_json::to_value(&SourceSummary::error("boom")).expect("serialize");
        assert_eq!(value, json!({"status": "error", "message": "boom"}));
    }
}
