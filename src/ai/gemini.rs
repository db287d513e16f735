use crate::ai::http::{format_latency, join_url, send_json};
use crate::ai::{
    prompt_template::PromptTemplate, response_processor::ResponseProcessor, AiProvider,
    CommandResult, Metrics, ProviderConfig, SystemMetadata,
};
use crate::error::{CmdfyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

impl GeminiProvider {
    pub const NAME: &'static str = "gemini";

    pub fn create(config: ProviderConfig) -> Result<Arc<dyn AiProvider>> {
        if config.api_key.is_empty() {
            return Err(CmdfyError::provider_init(Self::NAME, "api key is required for Gemini"));
        }

        Ok(Arc::new(Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: if config.base_url.is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                config.base_url
            },
            model: if config.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                config.model
            },
        }))
    }

    fn endpoint(&self) -> String {
        join_url(&self.base_url, &format!("/models/{}:generateContent", self.model))
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, query: &str, meta: &SystemMetadata) -> Result<CommandResult> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: PromptTemplate::full_prompt(query, meta),
                }],
            }],
        };

        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let (response, latency): (GenerateResponse, _) = send_json(Self::NAME, request).await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CmdfyError::generation(Self::NAME, "no response candidates received"))?;

        let text: String = candidate.content.parts.into_iter().map(|p| p.text).collect();

        let mut result = ResponseProcessor::process(Self::NAME, &text)?;
        result.metrics = Metrics {
            latency: format_latency(latency),
            token_count: response.usage_metadata.map(|u| u.total_token_count).unwrap_or(0),
        };

        Ok(result)
    }
}
