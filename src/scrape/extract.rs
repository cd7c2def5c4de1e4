// src/scrape/extract.rs
//
// Structured extraction of listing attributes from page text via an
// OpenAI-compatible chat-completions endpoint. The model is asked for a
// JSON object against a fixed 35-field schema; its reply is untrusted and
// parsed defensively.

use anyhow::{anyhow, Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::PipelineConfig;

/// The fixed attribute schema sent with every extraction prompt. Missing
/// numbers are zero-filled and missing certificates labeled by the model,
/// per the field descriptions; nothing is validated on return.
pub static EXTRACTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "title": {"type": "string", "description": "The title of the house"},
        "description": {"type": "string", "description": "The description of the house"},
        "price": {"type": "number", "description": "The price of the house"},
        "address": {"type": "string", "description": "The address of the house"},
        "city": {"type": "string", "description": "The city of the house"},
        "land_size_m2": {"type": "number", "description": "The landsize (LT) without m2 of the house, if there is NaN fill 0"},
        "building_size_m2": {"type": "number", "description": "The buildingsize (LB) without m2 of the house, if there is NaN fill 0"},
        "bedroom": {"type": "number", "description": "The number of bedroom in the house, if there is NaN fill 0"},
        "bathroom": {"type": "number", "description": "The number of bathroom in the house, if there is NaN fill 0"},
        "garage": {"type": "number", "description": "The number of garage in the house, only the number and string that means number, if there is NaN fill 0"},
        "carport": {"type": "number", "description": "The number of carport in the house if there is NaN fill 0"},
        "property_type": {"type": "string", "description": "The type of the property, only if property_type = house"},
        "certificate": {"type": "string", "description": "The certificate of the house, if there is Null fill Not Specified"},
        "voltage_watt": {"type": "number", "description": "The voltage without watt of the house, if there is Null fill Not Specified"},
        "maid_bedroom": {"type": "number", "description": "The number of maid bedroom in the house, if there is NaN fill 0"},
        "maid_bathroom": {"type": "number", "description": "The number of maid bathroom in the house, if there is NaN fill 0"},
        "kitchen": {"type": "number", "description": "The number of kitchen in the house, if there is NaN fill 0"},
        "dining_room": {"type": "number", "description": "The number of dining room in the house, if there is NaN fill 0"},
        "living_room": {"type": "number", "description": "The number of living room in the house, if there is NaN fill 0"},
        "furniture": {"type": "string", "description": "The number of furniture in the house", "enum": ["Semi Furnished", "Furnished", "Unfurnished"]},
        "building_material": {"type": "string", "description": "The building material of the house"},
        "floor_material": {"type": "string", "description": "The floor material of the house"},
        "floor_level": {"type": "number", "description": "The number of floor level in the house, if there is NaN fill 0"},
        "house_facing": {"type": "string", "description": "The facing direction of the house", "enum": ["North", "South", "East", "West", "Southeast", "Southwest", "Northeast", "Northwest"]},
        "concept_and_style": {"type": "string", "description": "The concept and style of the house"},
        "view": {"type": "string", "description": "The view from the house"},
        "internet_access": {"type": "string", "description": "Whether the house has internet access"},
        "road_width": {"type": "string", "description": "The road width in front of the house"},
        "year_built": {"type": "number", "description": "The year the house was built"},
        "year_renovated": {"type": "number", "description": "The year the house was last renovated"},
        "water_source": {"type": "string", "description": "The water source for the house"},
        "corner_property": {"type": "boolean", "description": "Whether the house is a corner property (hook)"},
        "property_condition": {"type": "string", "description": "The condition of the property"},
        "ad_type": {"type": "string", "description": "The type of advertisement for the property"},
        "ad_id": {"type": "string", "description": "The ID of the advertisement"}
    })
});

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct ExtractionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ExtractionClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build extraction HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        Self::new(&cfg.llm_api_url, &cfg.llm_api_key, &cfg.llm_model)
    }

    /// Asks the model to extract the attribute schema from page text and
    /// returns the parsed JSON object.
    pub async fn extract_listing(&self, text: &str) -> Result<Value> {
        let schema = serde_json::to_string_pretty(&*EXTRACTION_SCHEMA)
            .context("Failed to render extraction schema")?;
        let instruction = format!(
            "Extract data from the following text or web page:\n\n\
             [TEXT START]\n{text}\n[TEXT END]\n\n\
             The output must be a JSON object compliant with this schema:\n{schema}\n\n\
             If a value is missing, set it to null."
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a helpful assistant.",
                },
                ChatMessage {
                    role: "user",
                    content: &instruction,
                },
            ],
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Extraction request to {} (model {})", url, self.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Extraction request failed")?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(anyhow!("Extraction API error ({status}): {message}"));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Extraction API returned a non-JSON body")?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Extraction reply had no content"))?;

        let cleaned = strip_code_fences(&content);
        serde_json::from_str(cleaned).context("Extraction reply was not valid JSON")
    }
}

/// Cuts the reply down to the JSON object between the first `{` and the
/// last `}`, dropping any markdown fences the model wrapped it in.
pub fn strip_code_fences(reply: &str) -> &str {
    let start = reply.find('{');
    let end = reply.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_plain_json() {
        assert_eq!(strip_code_fences(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_code_fences_markdown_wrapped() {
        let reply = "```json\n{\"price\": 100, \"note\": \"json inside\"}\n```";
        let cleaned = strip_code_fences(reply);
        let value: Value = serde_json::from_str(cleaned).unwrap();
        assert_eq!(value["price"], 100);
        assert_eq!(value["note"], "json inside");
    }

    #[test]
    fn test_strip_code_fences_with_prose_around() {
        let reply = "Here is the data you asked for: {\"city\": \"Depok\"} hope it helps";
        assert_eq!(strip_code_fences(reply), "{\"city\": \"Depok\"}");
    }

    #[test]
    fn test_schema_covers_all_extracted_fields() {
        let schema = EXTRACTION_SCHEMA.as_object().unwrap();
        assert_eq!(schema.len(), 35);
        assert!(schema.contains_key("price"));
        assert!(schema.contains_key("road_width"));
        assert!(schema.contains_key("ad_id"));
    }
}
