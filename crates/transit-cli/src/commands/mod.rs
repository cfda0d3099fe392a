mod run;
mod schedule;
mod sources;

use std::process::ExitCode;
use std::sync::Arc;

use transit_core::{
    HttpClient, InvocationResponse, PipelineConfig, ReqwestHttpClient, ValidationError,
};

use crate::cli::{Cli, Command, SourceFilter};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Run(args) => run::run(args, cli.pretty).await,
        Command::Schedule(args) => schedule::run(args).await,
        Command::Sources(args) => sources::run(args, cli.pretty),
    }
}

/// Environment configuration narrowed to `--only`.
fn load_config(filter: &SourceFilter) -> Result<PipelineConfig, ValidationError> {
    PipelineConfig::from_env()?.retain_sources(filter.only.as_slice())
}

fn http_client() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestHttpClient::new())
}

/// 0 when the run was stored, 3 when it completed but storage failed.
fn exit_code(response: &InvocationResponse) -> Result<ExitCode, CliError> {
    if !response.is_success() {
        let reason = response
            .body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error");
        return Err(CliError::Invocation(reason.to_owned()));
    }

    if response.storage_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(3))
    }
}
