//! One-shot snapshot command

use hostscope_core::{StatsSettings, StatsSnapshot};

use crate::cli::{OutputFormat, SortOrder};
use crate::error::CliError;
use crate::util::{format_bytes, format_rate};

pub async fn run(
    mut settings: StatsSettings,
    format: OutputFormat,
    count: Option<usize>,
    sort: SortOrder,
) -> Result<(), CliError> {
    settings.auto_start = false;
    if let Some(count) = count {
        settings.top_process_count = count;
    }

    let pipeline = super::build_pipeline(settings)?;
    pipeline.refresh_stats().await;
    // Join the one-shot identity fetch so the snapshot is complete
    let _ = pipeline.system_identity().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pipeline.snapshot())?);
        }
        OutputFormat::Text => {
            let processes = pipeline.top_processes_by(sort.into());
            print_text(&pipeline.snapshot(), processes.as_deref());
        }
    }
    Ok(())
}

fn print_text(
    snapshot: &StatsSnapshot,
    processes: Option<&[hostscope_core::ProcessSample]>,
) {
    if let Some(identity) = &snapshot.system_identity {
        println!(
            "{}  {} {}  {} ({} cores)",
            identity.hostname,
            identity.os_name,
            identity.os_version,
            identity.cpu_model,
            identity.cpu_core_count
        );
    }

    match &snapshot.memory {
        Some(memory) => println!(
            "memory   {} / {} ({:.1}%)",
            format_bytes(memory.used_bytes),
            format_bytes(memory.total_bytes),
            memory.used_percent
        ),
        None => println!("memory   unavailable"),
    }

    match &snapshot.network {
        Some(network) => println!(
            "network  rx {} ({} total)  tx {} ({} total)",
            format_rate(network.rx_bytes_per_sec),
            format_bytes(network.rx_bytes_total),
            format_rate(network.tx_bytes_per_sec),
            format_bytes(network.tx_bytes_total)
        ),
        None => println!("network  unavailable"),
    }

    if let Some(processes) = processes {
        println!("{:>7}  {:<24} {:>6} {:>10} {:>6}", "PID", "NAME", "CPU%", "MEM", "MEM%");
        for process in processes {
            println!(
                "{:>7}  {:<24} {:>6.1} {:>10} {:>6.1}",
                process.pid,
                process.name,
                process.cpu_percent,
                format_bytes(process.memory_bytes),
                process.memory_percent
            );
        }
    }
}
