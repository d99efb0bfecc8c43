//! Continuous watch command
//!
//! Lets the pipeline poll on its own interval and prints the latest history
//! point once per tick. A point is only printed once, keyed by timestamp,
//! so a slow cycle doesn't produce duplicate lines.

use chrono::{DateTime, Utc};

use hostscope_core::StatsSettings;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{format_bytes, format_rate};

pub async fn run(
    mut settings: StatsSettings,
    format: OutputFormat,
    interval_ms: Option<u64>,
    ticks: Option<u64>,
) -> Result<(), CliError> {
    if let Some(interval_ms) = interval_ms {
        settings.poll_interval_ms = interval_ms;
    }
    settings.auto_start = true;

    let interval = settings.effective_interval();
    let mut pipeline = super::build_pipeline(settings)?;

    let mut ticker = tokio::time::interval(interval);
    let mut last_printed: Option<DateTime<Utc>> = None;
    let mut printed: u64 = 0;

    while ticks.is_none_or(|limit| printed < limit) {
        ticker.tick().await;

        let Some(point) = pipeline.history().pop() else {
            // First poll hasn't landed yet
            continue;
        };
        if last_printed == Some(point.timestamp) {
            continue;
        }
        last_printed = Some(point.timestamp);

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&point)?),
            OutputFormat::Text => {
                let memory = point.memory.map_or_else(
                    || "mem --".to_string(),
                    |m| format!("mem {:>5.1}%", m.used_percent),
                );
                let network = point.network.map_or_else(
                    || "net --".to_string(),
                    |n| {
                        format!(
                            "rx {:>10}  tx {:>10}",
                            format_rate(n.rx_bytes_per_sec),
                            format_rate(n.tx_bytes_per_sec)
                        )
                    },
                );
                println!(
                    "{}  {}  {}",
                    point.timestamp.format("%H:%M:%S"),
                    memory,
                    network
                );
            }
        }
        printed += 1;
    }

    pipeline.shutdown().await;
    Ok(())
}
