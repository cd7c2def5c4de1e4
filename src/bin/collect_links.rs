// src/bin/collect_links.rs
use anyhow::Result;
use log::info;

use house_prediction_lib::{config, config::PipelineConfig, scrape};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    let collected = scrape::links::collect_links(&cfg).await?;
    info!("Link collection finished: {} links", collected);
    Ok(())
}
