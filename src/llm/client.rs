// src/llm/client.rs

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::config::PulseConfig;

/// Hosted text-generation backend. The conversation service and the
/// satisfaction classifier both go through this seam, so tests can swap in
/// a scripted generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one rendered prompt, get the raw model text back.
    async fn generate(&self, input: &str) -> Result<String>;
}

/// Client for a watsonx-style text-generation endpoint.
#[derive(Clone)]
pub struct WatsonxClient {
    client: Client,
    api_key: String,
    base_url: String,
    project_id: String,
    version: String,
    model_id: String,
    decoding_method: String,
    temperature: f32,
    min_new_tokens: u32,
    max_new_tokens: u32,
}

impl WatsonxClient {
    pub fn new(config: &PulseConfig) -> Result<Self> {
        if config.watsonx_api_key.is_empty() {
            return Err(anyhow!("WATSONX_API_KEY not set"));
        }
        if config.watsonx_project_id.is_empty() {
            return Err(anyhow!("WATSONX_PROJECT_ID not set"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: config.watsonx_api_key.clone(),
            base_url: config.watsonx_url.trim_end_matches('/').to_string(),
            project_id: config.watsonx_project_id.clone(),
            version: config.watsonx_version.clone(),
            model_id: config.model_id.clone(),
            decoding_method: config.decoding_method.clone(),
            temperature: config.temperature,
            min_new_tokens: config.min_new_tokens,
            max_new_tokens: config.max_new_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for WatsonxClient {
    async fn generate(&self, input: &str) -> Result<String> {
        let url = format!(
            "{}/ml/v1/text/generation?version={}",
            self.base_url, self.version
        );

        let payload = json!({
            "model_id": self.model_id,
            "input": input,
            "project_id": self.project_id,
            "parameters": {
                "decoding_method": self.decoding_method,
                "temperature": self.temperature,
                "min_new_tokens": self.min_new_tokens,
                "max_new_tokens": self.max_new_tokens,
            },
        });

        debug!("Sending generation request ({} chars)", input.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .context("Failed to send generation request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("watsonx API error {}: {}", status, error_text));
        }

        let response_json: Value = response
            .json()
            .await
            .context("Failed to parse generation response")?;

        let text = response_json["results"][0]["generated_text"]
            .as_str()
            .ok_or_else(|| anyhow!("No generated_text in model response"))?;

        Ok(text.to_string())
    }
}
