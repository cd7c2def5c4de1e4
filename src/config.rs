// src/config.rs

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Runtime configuration for every pipeline stage, resolved once from the
/// environment. Paths are all rooted under `data_dir` so the scheduler can
/// mount a single volume for the whole run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,

    /// Listing-search page URL with a `{page}` placeholder.
    pub search_page_url: String,
    /// Base URL the collected relative listing links are resolved against.
    pub site_base_url: String,
    pub scrape_start_page: u32,
    pub scrape_end_page: u32,
    pub page_delay_secs: u64,
    pub listing_delay_secs: u64,

    /// Rendering-proxy endpoint that returns browser-rendered HTML.
    pub render_api_url: String,
    pub render_api_key: String,

    /// OpenAI-compatible chat-completions endpoint for schema extraction.
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,

    pub serve_addr: String,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or("DATA_DIR", "./data")),
            search_page_url: env_or(
                "SEARCH_PAGE_URL",
                "https://www.rumah123.com/jual/cari/?q=rumah+jabodetabek&page={page}",
            ),
            site_base_url: env_or("SITE_BASE_URL", "https://www.rumah123.com"),
            scrape_start_page: env_parse_or("SCRAPE_START_PAGE", 1),
            scrape_end_page: env_parse_or("SCRAPE_END_PAGE", 2),
            page_delay_secs: env_parse_or("PAGE_DELAY_SECS", 2),
            listing_delay_secs: env_parse_or("LISTING_DELAY_SECS", 1),
            render_api_url: env_or("RENDER_API_URL", "https://api.zyte.com/v1/extract"),
            render_api_key: env_or("RENDER_API_KEY", ""),
            llm_api_url: env_or("LLM_API_URL", "https://api.openai.com/v1"),
            llm_api_key: env_or("LLM_API_KEY", ""),
            llm_model: env_or("LLM_MODEL", "gpt-3.5-turbo"),
            serve_addr: env_or("SERVE_ADDR", "0.0.0.0:8501"),
        }
    }

    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join("link_properties.csv")
    }

    pub fn scraped_path(&self) -> PathBuf {
        self.data_dir.join("Property_Scraping.csv")
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.data_dir.join("data_cleaned.csv")
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.data_dir.join("data_after_fe.json")
    }

    /// The candidate slot: overwritten by every trainer run.
    pub fn candidate_model_path(&self) -> PathBuf {
        self.data_dir.join("best_model.json")
    }

    /// The incumbent slot: only the champion selector writes here.
    pub fn champion_model_path(&self) -> PathBuf {
        self.data_dir.join("best_model_ever.json")
    }

    pub fn report_path(&self, run_id: &str) -> PathBuf {
        self.data_dir.join(format!("pipeline_report_{run_id}.json"))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Loads environment variables from a .env file. Existing variables win.
pub fn load_env_from_file(file_path: &str) -> Result<()> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open(file_path)
        .with_context(|| format!("Failed to open env file {file_path}"))?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.context("Failed to read line from env file")?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        if let Some(idx) = line.find('=') {
            let key = line[..idx].trim();
            let value = line[idx + 1..].trim().trim_matches('"');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

/// Checks the usual .env locations and loads the first one found, the same
/// way the pipeline binaries expect to be configured in development.
pub fn try_load_dotenv() {
    let env_paths = [".env", ".env.local", "../.env"];
    for path in env_paths.iter() {
        if Path::new(path).exists() {
            match load_env_from_file(path) {
                Ok(()) => {
                    info!("Loaded environment variables from {}", path);
                    return;
                }
                Err(e) => warn!("Failed to load environment from {}: {}", path, e),
            }
        }
    }
    info!("No .env file found, using environment variables from system");
}
