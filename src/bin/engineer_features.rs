// src/bin/engineer_features.rs
use anyhow::Result;
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, features};

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let summary = features::engineer_features(&cfg)?;
    info!(
        "Feature engineering finished: {} train / {} test rows",
        summary.train_rows, summary.test_rows
    );
    Ok(())
}
