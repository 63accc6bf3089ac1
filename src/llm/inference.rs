//! Non-streaming client for an Ollama-compatible generate endpoint
//!
//! One POST per prompt, no conversation context, no retries.

use crate::llm::config::InferenceConfig;
use crate::utils::runtime::BlockingRuntime;
use crate::{MurmurError, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Shown in place of a reply when the server answers without any text
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(The model returned an empty reply.)";

/// Anything that can turn a prompt into a reply
pub trait ResponseGenerator: Send + Sync {
    /// Produce a reply for `prompt`, blocking the calling thread
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// HTTP client for the local inference server
pub struct OllamaClient {
    config: InferenceConfig,
    client: reqwest::Client,
    runtime: BlockingRuntime,
}

impl OllamaClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MurmurError::ConfigError(format!("HTTP client: {}", e)))?;
        let runtime = BlockingRuntime::new()?;

        info!(
            "Inference client ready: model {} at {}",
            config.model, config.endpoint
        );

        Ok(Self {
            config,
            client,
            runtime,
        })
    }

    async fn post(&self, prompt: &str) -> Result<Vec<u8>> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| MurmurError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MurmurError::ConnectionError(format!(
                "server answered {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MurmurError::ConnectionError(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl ResponseGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending prompt ({} chars)", prompt.len());
        let body = self.runtime.block_on(self.post(prompt))?;
        parse_reply(&body)
    }
}

/// Extract the reply text from a generate response body
pub(crate) fn parse_reply(body: &[u8]) -> Result<String> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| MurmurError::MalformedResponseError(e.to_string()))?;

    match value
        .get("response")
        .and_then(|v| v.as_str())
        .map(str::trim)
    {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => {
            warn!("Inference reply had no text, using placeholder");
            Ok(EMPTY_REPLY_PLACEHOLDER.to_string())
        }
    }
}
