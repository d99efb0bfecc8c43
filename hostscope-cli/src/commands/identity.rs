//! System identity command

use hostscope_core::StatsSettings;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub async fn run(mut settings: StatsSettings, format: OutputFormat) -> Result<(), CliError> {
    settings.auto_start = false;
    let pipeline = super::build_pipeline(settings)?;

    match pipeline.system_identity().await {
        Some(identity) => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&identity)?),
            OutputFormat::Text => {
                println!("hostname   {}", identity.hostname);
                println!("os         {} {}", identity.os_name, identity.os_version);
                println!("cpu        {}", identity.cpu_model);
                println!("cores      {}", identity.cpu_core_count);
            }
        },
        None => println!("system identity unavailable"),
    }
    Ok(())
}
