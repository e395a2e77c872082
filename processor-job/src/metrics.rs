use metrics_exporter_dogstatsd::DogStatsDBuilder;
use tracing::info;

/// Installs the global `DogStatsD` recorder that ships the worker's counters
///
/// Without a recorder the `metrics` macros are no-ops.
///
/// # Errors
///
/// Returns an error if the agent address is invalid or a recorder is already installed
pub fn install_dogstatsd(address: &str) -> anyhow::Result<()> {
    DogStatsDBuilder::default()
        .with_remote_address(address)?
        .install()?;

    info!(address, "✅ Initialized DogStatsD metrics");
    Ok(())
}
