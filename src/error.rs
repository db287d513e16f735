use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdfyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Failed to initialize provider '{provider}': {message}")]
    ProviderInit { provider: String, message: String },

    #[error("{provider} failed to generate a command: {message}")]
    Generation { provider: String, message: String },

    #[error("{provider} timed out after {}s", .after.as_secs())]
    Timeout { provider: String, after: Duration },

    #[error("No eligible providers: configure an API key or a local provider first")]
    NoEligibleProviders,

    #[error("Command execution failed: {0}")]
    Execution(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CmdfyError {
    pub fn generation(provider: &str, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn provider_init(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderInit {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CmdfyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_message_names_provider() {
        let err = CmdfyError::generation("gemini", "empty reply");
        assert_eq!(err.to_string(), "gemini failed to generate a command: empty reply");
    }

    #[test]
    fn test_timeout_message() {
        let err = CmdfyError::Timeout {
            provider: "openai".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "openai timed out after 30s");
    }
}
