//! Domain types produced and consumed by the pipeline.

mod envelope;
mod summary;
mod timestamp;

pub use envelope::{RunEnvelope, RunReport};
pub use summary::{
    AircraftCategoryCounts, AircraftPosition, AircraftSummary, BikeShareSummary, SourceSummary,
    StationSnapshot, SummaryData, SummaryStatus, TrafficLocation, TrafficSummary,
    VesselArrivalSummary, WeatherSummary,
};
pub use timestamp::UtcDateTime;
