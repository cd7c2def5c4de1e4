// src/bin/train_model.rs
use anyhow::Result;
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, modeling::trainer};

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let report = trainer::train_candidate(&cfg)?;
    info!(
        "Training finished: CV MAE {:.2}, test MAE {:.2}, test R2 {:.2}",
        report.cv_mae, report.test_mae, report.test_r2
    );
    Ok(())
}
