// src/bin/choose_best_model.rs
use anyhow::{Context, Result};
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, db, modeling::selector};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let pool = db::connect()
        .await
        .context("Failed to connect to database")?;
    let verdict = selector::choose_best_model(&pool, &cfg).await?;
    info!("Champion selection finished: {:?}", verdict);
    Ok(())
}
