pub mod anthropic;
pub mod command;
pub mod compare;
pub mod factory;
pub mod gemini;
pub mod history;
pub mod ollama;
pub mod openai;
pub mod prompt_template;
pub mod response_processor;

mod http;

pub use command::{CommandResult, CommandStep, Metrics};
pub use compare::{ComparisonEngine, ProviderResult};
pub use factory::ProviderRegistry;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A past accepted query/command pair offered to the model as an example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub query: String,
    pub command: String,
    pub provider: String,
}

/// Facts about the user's system that help the model pick the right tools.
///
/// Built once per invocation and shared read-only with every provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemMetadata {
    pub os: String,
    pub shell: String,
    pub available_commands: Vec<String>,
    pub current_dir_files: Vec<String>,
    pub previous_error: Option<String>,
    pub few_shot_examples: Vec<FewShotExample>,
}

/// Credentials and endpoint overrides handed to a provider factory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// LLM backend that turns a query into a command pipeline
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name (e.g. "anthropic", "gemini", "ollama")
    fn name(&self) -> &str;

    /// Model the provider will call
    fn model(&self) -> &str;

    /// Generate one command pipeline.
    ///
    /// Dropping the returned future cancels the request; callers bound it
    /// with `tokio::time::timeout`.
    async fn generate(&self, query: &str, meta: &SystemMetadata) -> Result<CommandResult>;
}
