use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use transit_core::{handle_with, CoreError};

use crate::cli::ScheduleArgs;
use crate::error::CliError;
use crate::output;

/// Independent invocations on a fixed interval. Each response is printed as one
/// JSON line. Stops on Ctrl-C or after `--max-runs`.
pub async fn run(args: &ScheduleArgs) -> Result<ExitCode, CliError> {
    // Configuration errors abort before the first tick.
    super::load_config(&args.filter)?;

    let http_client = super::http_client();
    let filter = &args.filter;
    drive(
        Duration::from_secs(args.interval_secs),
        args.max_runs,
        ctrl_c_watch(),
        |run| {
            let http_client = http_client.clone();
            async move {
                let config = super::load_config(filter).map_err(CoreError::from);
                let response = handle_with(config, http_client).await;
                output::render(&response, false)?;

                if !response.is_success() || !response.storage_succeeded() {
                    warn!(run, status = response.status_code, "scheduled run did not persist");
                }
                Ok(())
            }
        },
    )
    .await?;

    Ok(ExitCode::SUCCESS)
}

/// Flag latched to `true` by the first Ctrl-C, including one that arrives
/// while a run is in flight.
fn ctrl_c_watch() -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl-C, stopping after the current run");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });
    shutdown_rx
}

/// Calls `run_once` on every tick until shutdown is latched or `max_runs`
/// runs completed. Returns the number of completed runs.
async fn drive<F, Fut>(
    interval: Duration,
    max_runs: Option<u64>,
    mut shutdown: watch::Receiver<bool>,
    mut run_once: F,
) -> Result<u64, CliError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut watching = true;
    let mut completed = 0_u64;
    loop {
        if max_runs.is_some_and(|max| completed >= max) {
            break;
        }

        tokio::select! {
            biased;
            stopped = async { shutdown.wait_for(|stop| *stop).await.is_ok() }, if watching => {
                if stopped {
                    info!(completed, "stopping scheduler");
                    break;
                }
                // Watcher gone without a signal.
                watching = false;
                continue;
            }
            _ = ticker.tick() => {}
        }

        completed += 1;
        run_once(completed).await?;
    }

    Ok(completed)
}
