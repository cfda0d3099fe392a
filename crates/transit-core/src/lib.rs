//! # Transit Core
//!
//! Fetch, summarize and persist snapshots of urban transit feeds.
//!
//! ## Overview
//!
//! One invocation calls every configured upstream once, reduces each payload
//! to a small summary, and writes the results to the warehouse:
//!
//! - **Source adapters** for traffic speeds, bike-share stations, aircraft
//!   positions, vessel arrivals and weather
//! - **Pipeline** that isolates per-source failures into error summaries
//! - **Persistence writer** producing append-only [`StoredRecord`]s
//! - **Handler** mapping a run onto a `{statusCode, body}` response
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Built-in source adapters and their summarize functions |
//! | [`config`] | Environment-driven configuration |
//! | [`data_source`] | Adapter trait and source error type |
//! | [`domain`] | Summaries, run envelope and report, UTC timestamps |
//! | [`error`] | Core error types |
//! | [`handler`] | Invocation entry point |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | Run orchestration |
//! | [`source`] | Source kinds and specs |
//! | [`writer`] | Durable writes |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use transit_core::handle_env;
//!
//! #[tokio::main]
//! async fn main() {
//!     let response = handle_env().await;
//!     println!("{}", response.body);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Handler         │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Pipeline        │────▶│ Persistence      │
//! └────────┬────────┘     │ Writer → DuckDB  │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Source Adapter  │────▶│ HTTP Client      │
//! │ (fetch/summary) │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only (never logged)
//! - All HTTPS requests use rustls

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod handler;
pub mod http_client;
pub mod pipeline;
pub mod source;
pub mod writer;

// Adapters
pub use adapters::{
    build_adapter, summarize_aircraft, summarize_aircraft_counts, summarize_bike_share,
    summarize_traffic, summarize_vessel_arrivals, summarize_weather, AircraftAdapter,
    AircraftStrategy, BikeShareAdapter, TrafficAdapter, VesselArrivalAdapter, WeatherAdapter,
};

// Configuration
pub use config::{PipelineConfig, PipelineConfigBuilder};

// Adapter contract
pub use data_source::{fetch_json, RawResponse, SourceAdapter, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    AircraftCategoryCounts, AircraftPosition, AircraftSummary, BikeShareSummary, RunEnvelope,
    RunReport, SourceSummary, StationSnapshot, SummaryData, SummaryStatus, TrafficLocation,
    TrafficSummary, UtcDateTime, VesselArrivalSummary, WeatherSummary,
};

// Error types
pub use error::{CoreError, ValidationError};

// Invocation
pub use handler::{build_pipeline, handle, handle_env, handle_with, invoke, InvocationResponse};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Orchestration
pub use pipeline::{Pipeline, WriteGranularity};

// Sources
pub use source::{SourceKind, SourceSpec};

// Persistence (store re-exported from transit-warehouse)
pub use transit_warehouse::{StoredRecord, Warehouse, WarehouseConfig, WarehouseError};
pub use writer::{PersistenceWriter, RecordStore};
