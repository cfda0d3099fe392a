use std::collections::BTreeMap;
use std::process::ExitCode;

use serde::Serialize;
use transit_core::{PipelineConfig, SourceKind, SourceSpec};

use crate::cli::SourcesArgs;
use crate::error::CliError;
use crate::output;

const SECRET_PARAMS: [&str; 3] = ["appid", "api_key", "key"];
const REDACTED: &str = "***";

#[derive(Debug, Serialize)]
struct SourceEntry<'a> {
    name: &'a str,
    kind: SourceKind,
    endpoint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<BTreeMap<&'a str, &'a str>>,
}

#[derive(Debug, Serialize)]
struct SourcesReport<'a> {
    sources: Vec<SourceEntry<'a>>,
    aircraft_strategy: &'static str,
    write_granularity: &'static str,
    http_timeout_ms: u64,
    write_timeout_ms: u64,
    warehouse: String,
}

pub fn run(args: &SourcesArgs, pretty: bool) -> Result<ExitCode, CliError> {
    let config = PipelineConfig::from_env()?;
    output::render(&report(&config, args.verbose), pretty)?;
    Ok(ExitCode::SUCCESS)
}

fn report(config: &PipelineConfig, verbose: bool) -> SourcesReport<'_> {
    SourcesReport {
        sources: config
            .sources
            .iter()
            .map(|spec| SourceEntry {
                name: &spec.name,
                kind: spec.kind,
                endpoint: &spec.endpoint,
                params: verbose.then(|| redacted_params(spec)),
            })
            .collect(),
        aircraft_strategy: config.aircraft_strategy.as_str(),
        write_granularity: config.write_granularity.as_str(),
        http_timeout_ms: config.http_timeout_ms,
        write_timeout_ms: config.write_timeout_ms,
        warehouse: config.warehouse.db_path.display().to_string(),
    }
}

fn redacted_params(spec: &SourceSpec) -> BTreeMap<&str, &str> {
    spec.params
        .iter()
        .map(|(key, value)| {
            let value = if SECRET_PARAMS.contains(&key.to_ascii_lowercase().as_str()) {
                REDACTED
            } else {
                value.as_str()
            };
            (key.as_str(), value)
        })
        .collect()
}
