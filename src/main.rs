use distributor::{config::Config, pipeline};
use tracing::{error, info};

/// The main entry point for the distributor application.
///
/// Initializes logging, loads the run configuration, and hands control to
/// the pipeline. The configuration path may be given as the first argument;
/// it defaults to config/default.toml.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging using tracing_subscriber.
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("distributor starting with config from {config_path}");

    // The pipeline aborts on the first fatal error; partial on-chain state
    // (an orphaned batch) is named in the error for manual cleanup.
    if let Err(e) = pipeline::run(config).await {
        error!("run aborted: {e}");
        return Err(e.into());
    }

    Ok(())
}
