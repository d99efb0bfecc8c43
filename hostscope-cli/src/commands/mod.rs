//! Command implementations
//!
//! Each command builds its own pipeline around the local procfs source and
//! talks to it through the read API only.

mod identity;
mod snapshot;
mod watch;

use std::sync::Arc;

use hostscope_core::{ProcStatsSource, StatsPipeline, StatsSettings};

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatches a parsed command
pub async fn dispatch(settings: StatsSettings, command: &Commands) -> Result<(), CliError> {
    match command {
        Commands::Snapshot {
            format,
            count,
            sort,
        } => snapshot::run(settings, *format, *count, *sort).await,
        Commands::Watch {
            format,
            interval_ms,
            ticks,
        } => watch::run(settings, *format, *interval_ms, *ticks).await,
        Commands::Identity { format } => identity::run(settings, *format).await,
    }
}

/// Builds a pipeline over the local host, failing fast when the stats
/// capability is absent
fn build_pipeline(settings: StatsSettings) -> Result<StatsPipeline, CliError> {
    let pipeline = StatsPipeline::new(Arc::new(ProcStatsSource::new()), settings);
    if !pipeline.is_available() {
        return Err(CliError::Unavailable);
    }
    Ok(pipeline)
}
