use std::process::ExitCode;

use transit_core::{handle_with, CoreError};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(args: &RunArgs, pretty: bool) -> Result<ExitCode, CliError> {
    let config = super::load_config(&args.filter);
    let invalid = config.as_ref().err().cloned();

    let response = handle_with(config.map_err(CoreError::from), super::http_client()).await;
    output::render(&response, pretty)?;

    match invalid {
        Some(error) => Err(CliError::Validation(error)),
        None => super::exit_code(&response),
    }
}
