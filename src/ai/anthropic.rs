use crate::ai::http::{format_latency, send_json};
use crate::ai::{
    prompt_template::PromptTemplate, response_processor::ResponseProcessor, AiProvider,
    CommandResult, Metrics, ProviderConfig, SystemMetadata,
};
use crate::error::{CmdfyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicProvider {
    pub const NAME: &'static str = "anthropic";

    pub fn create(config: ProviderConfig) -> Result<Arc<dyn AiProvider>> {
        if config.api_key.is_empty() {
            return Err(CmdfyError::provider_init(Self::NAME, "api key is required for Anthropic"));
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
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, query: &str, meta: &SystemMetadata) -> Result<CommandResult> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: PromptTemplate::system_prompt(meta),
            messages: vec![Message {
                role: "user",
                content: query,
            }],
        };

        let request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let (response, latency): (MessagesResponse, _) = send_json(Self::NAME, request).await?;

        let text = response
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        let mut result = ResponseProcessor::process(Self::NAME, &text)?;
        result.metrics = Metrics {
            latency: format_latency(latency),
            token_count: response
                .usage
                .map(|u| u.input_tokens + u.output_tokens)
                .unwrap_or(0),
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_requires_api_key() {
        let result = AnthropicProvider::create(ProviderConfig::default());
        assert!(matches!(result, Err(CmdfyError::ProviderInit { .. })));
    }

    #[test]
    fn test_default_model() {
        let provider = AnthropicProvider::create(ProviderConfig {
            api_key: "sk-ant-test".to_string(),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_generate_sends_headers_and_counts_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{
                    "type": "text",
                    "text": "```json\n{\"steps\":[{\"tool\":\"df\",\"args\":[\"-h\"]}],\"explanation\":\"disk usage\",\"dangerous\":false}\n```"
                }],
                "usage": {"input_tokens": 100, "output_tokens": 20}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::create(ProviderConfig {
            api_key: "sk-ant-test".to_string(),
            base_url: server.uri(),
            model: String::new(),
        })
        .unwrap();

        let result = provider
            .generate("show disk usage", &SystemMetadata::default())
            .await
            .unwrap();

        assert_eq!(result.steps[0].tool, "df");
        assert_eq!(result.metrics.token_count, 120);
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::create(ProviderConfig {
            api_key: "sk-ant-test".to_string(),
            base_url: server.uri(),
            model: String::new(),
        })
        .unwrap();

        let err = provider
            .generate("anything", &SystemMetadata::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }
}
