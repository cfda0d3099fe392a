//! Invocation configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NYC_TRAFFIC_API_URL` | NYC DOT real-time speeds |
//! | `CITYBIKES_API_URL` | CityBikes `citi-bike-nyc` network |
//! | `OPENSKY_API_URL` | OpenSky `states/all`, NYC bounding box |
//! | `VESSEL_ARRIVALS_API_URL` / `VESSEL_API_KEY` | expected arrivals, enabled by key |
//! | `WEATHER_API_URL` / `WEATHER_API_KEY` | OpenWeatherMap current weather, enabled by key |
//! | `TRANSIT_AIRCRAFT_STRATEGY` | `filtered_rows` |
//! | `TRANSIT_WRITE_GRANULARITY` | `per_run` |
//! | `TRANSIT_HTTP_TIMEOUT_MS` | `10000` |
//! | `TRANSIT_WRITE_TIMEOUT_MS` | `5000` |
//! | `TRANSIT_HOME` | `$HOME/.transit-ingest` |

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use transit_warehouse::WarehouseConfig;

use crate::adapters::AircraftStrategy;
use crate::error::ValidationError;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::pipeline::WriteGranularity;
use crate::source::{SourceKind, SourceSpec};
use crate::writer::DEFAULT_WRITE_TIMEOUT_MS;

pub const TRAFFIC_SOURCE: &str = "NYC_Traffic";
pub const BIKE_SHARE_SOURCE: &str = "CityBikes_NYC";
pub const AIRCRAFT_SOURCE: &str = "OpenSky_NYC";
pub const VESSEL_SOURCE: &str = "Vessel_Arrivals_NYC";
pub const WEATHER_SOURCE: &str = "Weather_NYC";

const DEFAULT_TRAFFIC_URL: &str = "https://data.cityofnewyork.us/resource/i4gi-tjb9.json";
const DEFAULT_CITYBIKES_URL: &str = "http://api.citybik.es/v2/networks/citi-bike-nyc";
const DEFAULT_OPENSKY_URL: &str = "https://opensky-network.org/api/states/all";
const DEFAULT_VESSEL_URL: &str = "https://services.marinetraffic.com/api/expectedarrivals";
const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

// NYC bounding box for aircraft queries.
const NYC_BOUNDS: [(&str, &str); 4] = [
    ("lamin", "40.4774"),
    ("lomin", "-74.2591"),
    ("lamax", "40.9176"),
    ("lomax", "-73.7004"),
];

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Vec<SourceSpec>,
    pub aircraft_strategy: AircraftStrategy,
    pub write_granularity: WriteGranularity,
    pub http_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub warehouse: WarehouseConfig,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        PipelineConfigBuilder::from_lookup(|key| env::var(key).ok())?.build()
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|spec| spec.name.as_str())
    }

    /// Keeps only the named sources, in configured order.
    ///
    /// Names match case-insensitively; an empty list keeps everything.
    pub fn retain_sources<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, ValidationError> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut wanted = HashSet::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            let key = name.to_ascii_lowercase();
            if !self.sources.iter().any(|spec| spec.name.to_ascii_lowercase() == key) {
                return Err(ValidationError::UnknownSource {
                    name: name.to_owned(),
                });
            }
            wanted.insert(key);
        }

        self.sources
            .retain(|spec| wanted.contains(&spec.name.to_ascii_lowercase()));
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sources.is_empty() {
            return Err(ValidationError::NoSources);
        }

        let mut seen = HashSet::with_capacity(self.sources.len());
        for spec in &self.sources {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ValidationError::DuplicateSourceName {
                    name: spec.name.clone(),
                });
            }
        }

        positive("TRANSIT_HTTP_TIMEOUT_MS", self.http_timeout_ms)?;
        positive("TRANSIT_WRITE_TIMEOUT_MS", self.write_timeout_ms)?;
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
///
/// `new()` starts with no sources; `from_lookup` fills in the stock NYC sources
/// from an environment-like lookup.
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    sources: Vec<SourceSpec>,
    aircraft_strategy: AircraftStrategy,
    write_granularity: WriteGranularity,
    http_timeout_ms: u64,
    write_timeout_ms: u64,
    warehouse: Option<WarehouseConfig>,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            aircraft_strategy: AircraftStrategy::default(),
            write_granularity: WriteGranularity::default(),
            http_timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            warehouse: None,
        }
    }

    /// Builder populated from `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut builder = Self::new();

        builder = builder
            .with_source(
                SourceSpec::new(
                    TRAFFIC_SOURCE,
                    SourceKind::Traffic,
                    get("NYC_TRAFFIC_API_URL").unwrap_or_else(|| DEFAULT_TRAFFIC_URL.to_owned()),
                )?
                .with_param("$limit", "10")
                .with_param("$where", "speed IS NOT NULL"),
            )
            .with_source(SourceSpec::new(
                BIKE_SHARE_SOURCE,
                SourceKind::BikeShare,
                get("CITYBIKES_API_URL").unwrap_or_else(|| DEFAULT_CITYBIKES_URL.to_owned()),
            )?);

        let mut aircraft = SourceSpec::new(
            AIRCRAFT_SOURCE,
            SourceKind::AircraftPosition,
            get("OPENSKY_API_URL").unwrap_or_else(|| DEFAULT_OPENSKY_URL.to_owned()),
        )?;
        for (key, value) in NYC_BOUNDS {
            aircraft = aircraft.with_param(key, value);
        }
        builder = builder.with_source(aircraft);

        if let Some(key) = get("VESSEL_API_KEY") {
            let endpoint =
                get("VESSEL_ARRIVALS_API_URL").unwrap_or_else(|| DEFAULT_VESSEL_URL.to_owned());
            builder = builder.with_source(
                SourceSpec::new(VESSEL_SOURCE, SourceKind::VesselArrival, endpoint)?
                    .with_param("api_key", key)
                    .with_param("protocol", "jsono"),
            );
        }

        if let Some(key) = get("WEATHER_API_KEY") {
            builder = builder.with_source(
                SourceSpec::new(
                    WEATHER_SOURCE,
                    SourceKind::Weather,
                    get("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_WEATHER_URL.to_owned()),
                )?
                .with_param("q", "New York,US")
                .with_param("appid", key)
                .with_param("units", "metric"),
            );
        }

        if let Some(value) = get("TRANSIT_AIRCRAFT_STRATEGY") {
            builder = builder.with_aircraft_strategy(value.parse()?);
        }
        if let Some(value) = get("TRANSIT_WRITE_GRANULARITY") {
            builder = builder.with_write_granularity(value.parse()?);
        }
        if let Some(value) = get("TRANSIT_HTTP_TIMEOUT_MS") {
            builder =
                builder.with_http_timeout_ms(parse_millis("TRANSIT_HTTP_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = get("TRANSIT_WRITE_TIMEOUT_MS") {
            builder =
                builder.with_write_timeout_ms(parse_millis("TRANSIT_WRITE_TIMEOUT_MS", &value)?);
        }
        if let Some(home) = get("TRANSIT_HOME") {
            builder = builder.with_warehouse(WarehouseConfig::at_home(PathBuf::from(home)));
        }

        Ok(builder)
    }

    pub fn with_source(mut self, spec: SourceSpec) -> Self {
        self.sources.push(spec);
        self
    }

    pub fn with_aircraft_strategy(mut self, strategy: AircraftStrategy) -> Self {
        self.aircraft_strategy = strategy;
        self
    }

    pub fn with_write_granularity(mut self, granularity: WriteGranularity) -> Self {
        self.write_granularity = granularity;
        self
    }

    pub fn with_http_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http_timeout_ms = timeout_ms;
        self
    }

    pub fn with_write_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.write_timeout_ms = timeout_ms;
        self
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseConfig) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ValidationError> {
        let config = PipelineConfig {
            sources: self.sources,
            aircraft_strategy: self.aircraft_strategy,
            write_granularity: self.write_granularity,
            http_timeout_ms: self.http_timeout_ms,
            write_timeout_ms: self.write_timeout_ms,
            warehouse: self.warehouse.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_millis(field: &'static str, value: &str) -> Result<u64, ValidationError> {
    let millis = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidTimeout {
            field,
            value: value.to_owned(),
        })?;
    positive(field, millis)?;
    Ok(millis)
}

fn positive(field: &'static str, millis: u64) -> Result<(), ValidationError> {
    if millis == 0 {
        return Err(ValidationError::InvalidTimeout {
            field,
            value: millis.to_string(),
        });
    }
    Ok(())
}
