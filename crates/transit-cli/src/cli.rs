//! CLI argument definitions for transit-ingest.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Run one ingestion pass and print the invocation response |
//! | `schedule` | Run ingestion passes on a fixed interval |
//! | `sources` | Show the sources the current environment enables |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-json` | `false` | Emit logs to stderr as JSON lines |
//!
//! # Examples
//!
//! ```bash
//! # One pass over every enabled source
//! transit-ingest run
//!
//! # Only traffic and aircraft
//! transit-ingest run --only NYC_Traffic,OpenSky_NYC
//!
//! # Every five minutes, JSON logs for a collector
//! transit-ingest --log-json schedule --interval-secs 300
//! ```

use clap::{Args, Parser, Subcommand};

/// Transit feed ingestion: fetch, summarize and store urban transit snapshots.
#[derive(Debug, Parser)]
#[command(
    name = "transit-ingest",
    author,
    version,
    about = "Fetch, summarize and store urban transit feed snapshots"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Emit logs as JSON lines on stderr. Level comes from `RUST_LOG`.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one ingestion pass.
    ///
    /// Exit code 0 when the run was stored, 3 when it completed but the
    /// write failed.
    Run(RunArgs),

    /// Run ingestion passes on a fixed interval until interrupted.
    Schedule(ScheduleArgs),

    /// List the sources enabled by the current environment.
    Sources(SourcesArgs),
}

/// Source filter shared by `run` and `schedule`.
#[derive(Debug, Clone, Args)]
pub struct SourceFilter {
    /// Comma-separated source names to run (default: all enabled sources).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub filter: SourceFilter,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub filter: SourceFilter,

    /// Seconds between the start of consecutive runs.
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Stop after this many runs (default: run until interrupted).
    #[arg(long)]
    pub max_runs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include query parameters (secrets redacted).
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_accepts_comma_separated_names() {
        let cli = Cli::try_parse_from([
            "transit-ingest",
            "run",
            "--only",
            "NYC_Traffic,OpenSky_NYC",
        ])
        .expect("parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.filter.only, vec!["NYC_Traffic", "OpenSky_NYC"]);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["transit-ingest", "sources", "--pretty", "--log-json"])
            .expect("parse");
        assert!(cli.pretty);
        assert!(cli.log_json);
    }

    #[test]
    fn schedule_rejects_zero_interval() {
        let zero = Cli::try_parse_from(["transit-ingest", "schedule", "--interval-secs", "0"]);
        assert!(zero.is_err());

        let cli = Cli::try_parse_from(["transit-ingest", "schedule", "--max-runs", "2"])
            .expect("parse");
        let Command::Schedule(args) = cli.command else {
            panic!("expected schedule command");
        };
        assert_eq!(args.interval_secs, 300);
        assert_eq!(args.max_runs, Some(2));
        assert!(args.filter.only.is_empty());
    }
}
