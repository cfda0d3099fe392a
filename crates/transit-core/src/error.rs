use thiserror::Error;

/// Configuration and contract errors exposed by `transit-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source name cannot be empty")]
    EmptySourceName,
    #[error("duplicate source name '{name}'")]
    DuplicateSourceName { name: String },
    #[error("endpoint for '{name}' must be an http(s) URL: '{value}'")]
    InvalidEndpoint { name: String, value: String },

    #[error(
        "invalid source kind '{value}', expected one of traffic, bike_share, aircraft_position, vessel_arrival, weather"
    )]
    InvalidSourceKind { value: String },
    #[error("invalid aircraft strategy '{value}', expected filtered_rows or category_counts")]
    InvalidAircraftStrategy { value: String },
    #[error("invalid write granularity '{value}', expected per_run or per_source")]
    InvalidWriteGranularity { value: String },

    #[error("'{field}' must be a positive integer: '{value}'")]
    InvalidTimeout { field: &'static str, value: String },

    #[error("no configured source matches '{name}'")]
    UnknownSource { name: String },
    #[error("at least one source must be configured")]
    NoSources,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Top-level error type for core operations that abort a whole invocation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("warehouse error: {0}")]
    Warehouse(#[from] transit_warehouse::WarehouseError),
}
