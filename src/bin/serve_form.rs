// src/bin/serve_form.rs
use anyhow::Result;

use house_prediction_lib::{config, config::PipelineConfig, serving};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();

    serving::serve(&cfg).await
}
