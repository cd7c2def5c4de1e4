// src/bin/scrape_listings.rs
use anyhow::Result;
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, scrape};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let scraped = scrape::listings::scrape_listings(&cfg).await?;
    info!("Content fetching finished: {} listings", scraped);
    Ok(())
}
