// src/scrape/render.rs

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde_json::Value;
use std::time::Duration;

use crate::config::PipelineConfig;

/// Client for the rendering-proxy API: posts a target URL, gets back the
/// browser-rendered HTML. The API key is passed as basic-auth username.
pub struct RenderClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RenderClient {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build render HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        Self::new(&cfg.render_api_url, &cfg.render_api_key)
    }

    /// Fetches fully-rendered HTML for a URL.
    pub async fn browser_html(&self, url: &str) -> Result<String> {
        debug!("Rendering {url}");
        let body = serde_json::json!({ "url": url, "browserHtml": true });

        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.api_key, None::<&str>)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Render request for {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(anyhow!("Render API error ({status}): {message}"));
        }

        let payload: Value = response
            .json()
            .await
            .context("Render API returned a non-JSON body")?;
        payload
            .get("browserHtml")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Render API response missing browserHtml for {url}"))
    }
}
