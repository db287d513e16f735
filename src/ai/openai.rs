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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI chat completions provider (also serves OpenAI-compatible endpoints)
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl OpenAiProvider {
    pub const NAME: &'static str = "openai";

    pub fn create(config: ProviderConfig) -> Result<Arc<dyn AiProvider>> {
        if config.api_key.is_empty() {
            return Err(CmdfyError::provider_init(Self::NAME, "api key is required for OpenAI"));
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
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, query: &str, meta: &SystemMetadata) -> Result<CommandResult> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant that generates structured shell commands in JSON.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: PromptTemplate::full_prompt(query, meta),
                },
            ],
        };

        let request = self
            .client
            .post(join_url(&self.base_url, "/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body);

        let (response, latency): (ChatResponse, _) = send_json(Self::NAME, request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CmdfyError::generation(Self::NAME, "no response choices received"))?;

        let mut result = ResponseProcessor::process(Self::NAME, &choice.message.content)?;
        result.metrics = Metrics {
            latency: format_latency(latency),
            token_count: response.usage.map(|u| u.total_tokens).unwrap_or(0),
        };

        Ok(result)
    }
}
