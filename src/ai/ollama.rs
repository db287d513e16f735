use crate::ai::http::{format_latency, join_url, send_json};
use crate::ai::{
    prompt_template::PromptTemplate, response_processor::ResponseProcessor, AiProvider,
    CommandResult, Metrics, ProviderConfig, SystemMetadata,
};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3";

/// Local Ollama server; the only provider that needs no API key
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

impl OllamaProvider {
    pub const NAME: &'static str = "ollama";

    pub fn new(config: ProviderConfig) -> Self {
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url
        };
        let model = if config.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model
        };

        Self {
            client: Client::new(),
            base_url,
            model,
        }
    }

    pub fn create(config: ProviderConfig) -> Result<Arc<dyn AiProvider>> {
        Ok(Arc::new(Self::new(config)))
    }

    fn build_request(&self, query: &str, meta: &SystemMetadata) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant that generates structured shell commands in JSON. Do not output anything other than JSON.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: PromptTemplate::full_prompt(query, meta),
                },
            ],
            stream: false,
        }
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, query: &str, meta: &SystemMetadata) -> Result<CommandResult> {
        let url = join_url(&self.base_url, "/api/chat");
        let request = self.client.post(&url).json(&self.build_request(query, meta));

        let (response, latency): (ChatResponse, _) = send_json(Self::NAME, request).await?;

        let mut result = ResponseProcessor::process(Self::NAME, &response.message.content)?;
        result.metrics = Metrics {
            latency: format_latency(latency),
            token_count: response.prompt_eval_count + response.eval_count,
        };

        Ok(result)
    }
}
