// src/bin/clean_listings.rs
use anyhow::Result;
use log::info;

use house_prediction_lib::{cleaning, config, config::PipelineConfig};

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let summary = cleaning::clean_listings(&cfg)?;
    info!(
        "Cleaning finished: {} rows kept of {} scraped",
        summary.output_rows, summary.input_rows
    );
    Ok(())
}
