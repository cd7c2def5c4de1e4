// src/bin/sync_warehouse.rs
use anyhow::{Context, Result};
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, db, warehouse};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let pool = db::connect()
        .await
        .context("Failed to connect to database")?;
    let (synced, exported) = warehouse::sync_from_csv(&pool, &cfg).await?;
    info!(
        "Warehouse sync finished: {} rows loaded, {} rows exported",
        synced, exported
    );
    Ok(())
}
