use crate::ai::{
    anthropic::AnthropicProvider, gemini::GeminiProvider, ollama::OllamaProvider,
    openai::OpenAiProvider, AiProvider, ProviderConfig,
};
use crate::error::{CmdfyError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a live provider from its resolved configuration
pub type ProviderFactory = fn(ProviderConfig) -> Result<Arc<dyn AiProvider>>;

/// Name → factory table for AI providers.
///
/// Built once at start-up and passed by reference; nothing writes to it after
/// that. Names are case-insensitive.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
    aliases: BTreeMap<String, String>,
}

impl ProviderRegistry {
    /// Empty registry (tests register fakes into it)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider and its aliases
    ///
    /// # Examples
    /// ```
    /// use cmdfy::ai::ProviderRegistry;
    ///
    /// let registry = ProviderRegistry::with_builtin();
    /// assert!(registry.is_supported("claude"));
    /// assert_eq!(registry.names(), vec!["anthropic", "gemini", "ollama", "openai"]);
    /// ```
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(AnthropicProvider::NAME, AnthropicProvider::create);
        registry.register(GeminiProvider::NAME, GeminiProvider::create);
        registry.register(OllamaProvider::NAME, OllamaProvider::create);
        registry.register(OpenAiProvider::NAME, OpenAiProvider::create);
        registry.alias("claude", AnthropicProvider::NAME);
        registry.alias("chatgpt", OpenAiProvider::NAME);
        registry
    }

    pub fn register(&mut self, name: &str, factory: ProviderFactory) {
        self.factories.insert(name.to_lowercase(), factory);
    }

    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_lowercase(), target.to_lowercase());
    }

    /// Map an alias to its primary name; other names are only lower-cased
    pub fn canonical_name(&self, name: &str) -> String {
        let name = name.to_lowercase();
        self.aliases.get(&name).cloned().unwrap_or(name)
    }

    /// Create a provider instance by name
    ///
    /// # Errors
    /// * `CmdfyError::ProviderNotFound` if the name is unknown
    /// * `CmdfyError::ProviderInit` if the factory rejects the configuration
    pub fn resolve(&self, name: &str, config: ProviderConfig) -> Result<Arc<dyn AiProvider>> {
        let factory = self
            .factories
            .get(&self.canonical_name(name))
            .ok_or_else(|| self.not_found(name))?;

        factory(config)
    }

    /// Fail with `ProviderNotFound` unless `name` (or its alias) is registered
    pub fn ensure_supported(&self, name: &str) -> Result<()> {
        if self.is_supported(name) {
            Ok(())
        } else {
            Err(self.not_found(name))
        }
    }

    fn not_found(&self, name: &str) -> CmdfyError {
        CmdfyError::ProviderNotFound(format!(
            "{}\nSupported providers: {}",
            name,
            self.names().join(", ")
        ))
    }

    /// Primary provider names, sorted (aliases excluded)
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.factories.contains_key(&self.canonical_name(name))
    }
}
