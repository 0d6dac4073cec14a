//! Engine Fault Detection - Main Entry Point

use anyhow::{anyhow, Context};
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_logging(&settings.log.level, settings.log.json).map_err(|e| anyhow!(e))?;

    settings
        .model_config()
        .validate()
        .context("invalid [model] settings")?;

    info!("=== Engine Fault Detection v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model: {} estimators, retention {} detections",
        settings.model.n_estimators, settings.storage.max_records
    );

    run_server(&settings).await.map_err(|e| anyhow!(e))?;

    Ok(())
}
