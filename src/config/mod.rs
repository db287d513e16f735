use crate::ai::{AiProvider, ProviderConfig, ProviderRegistry};
use crate::error::{CmdfyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Providers that run locally and need no API key
pub const LOCAL_PROVIDERS: &[&str] = &["ollama"];

/// Per-provider credentials and overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
}

/// cmdfy user configuration
///
/// Stored at ~/.cmdfy/config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Provider used when --provider is not given
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Record accepted commands and feed them back as examples
    #[serde(default = "default_enable_history")]
    pub enable_history: bool,

    /// How many recent history entries to send as examples
    #[serde(default = "default_few_shot_examples")]
    pub few_shot_examples: usize,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_enable_history() -> bool {
    true
}

fn default_few_shot_examples() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            enable_history: default_enable_history(),
            few_shot_examples: default_few_shot_examples(),
            providers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Directory holding the config file and the history log
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CmdfyError::Config("could not find home directory".to_string()))?;
        Ok(home.join(".cmdfy"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    ///
    /// # Examples
    /// ```
    /// use cmdfy::config::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::load_from(Path::new("/nonexistent/cmdfy.toml")).unwrap();
    /// assert_eq!(config.default_provider, "gemini");
    /// ```
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CmdfyError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CmdfyError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), providers = config.providers.len(), "loaded config");
        Ok(config)
    }

    /// Write the config, creating its directory; the file holds API keys so
    /// it is only readable by the owner
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| CmdfyError::Config(format!("failed to create config dir: {}", e)))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CmdfyError::Config(format!("failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CmdfyError::Config(format!("failed to write {}: {}", path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Update one provider's settings and make it the default
    pub fn set_provider(
        &mut self,
        name: &str,
        api_key: Option<&str>,
        base_url: Option<&str>,
        model: Option<&str>,
    ) {
        let settings = self.providers.entry(name.to_string()).or_default();

        if let Some(key) = api_key {
            settings.api_key = key.to_string();
        }
        if let Some(url) = base_url {
            settings.base_url = url.to_string();
        }
        if let Some(model) = model {
            settings.model = model.to_string();
        }

        self.default_provider = name.to_string();
    }

    /// Resolve credentials for `name` from the file, then `<NAME>_API_KEY`.
    ///
    /// An alias such as `claude` falls back to the settings and environment
    /// variable of the provider it stands for when it has none of its own.
    ///
    /// # Errors
    /// * `CmdfyError::ProviderInit` when no API key can be found for a
    ///   provider that needs one
    pub fn provider_config(&self, registry: &ProviderRegistry, name: &str) -> Result<ProviderConfig> {
        self.provider_config_with(registry, name, |var| std::env::var(var).ok())
    }

    pub fn provider_config_with<F>(
        &self,
        registry: &ProviderRegistry,
        name: &str,
        env: F,
    ) -> Result<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let canonical = registry.canonical_name(name);
        let mut lookups = vec![name.to_string()];
        if !canonical.eq_ignore_ascii_case(name) {
            lookups.push(canonical.clone());
        }

        let settings: Vec<ProviderSettings> = lookups
            .iter()
            .map(|n| self.settings_for(n).cloned().unwrap_or_default())
            .collect();
        let env_vars: Vec<String> = lookups
            .iter()
            .map(|n| format!("{}_API_KEY", n.to_uppercase()))
            .collect();

        let api_key = settings
            .iter()
            .zip(&env_vars)
            .find_map(|(settings, var)| {
                if settings.api_key.is_empty() {
                    env(var).filter(|key| !key.is_empty())
                } else {
                    Some(settings.api_key.clone())
                }
            })
            .unwrap_or_default();

        if api_key.is_empty() && !is_local(name) && !is_local(&canonical) {
            return Err(CmdfyError::provider_init(
                name,
                format!(
                    "no API key found. Set it with 'cmdfy config set --provider {} --key <KEY>' or the {} environment variable",
                    name, env_vars[0]
                ),
            ));
        }

        let base_url = settings
            .iter()
            .map(|s| s.base_url.as_str())
            .find(|url| !url.is_empty())
            .unwrap_or_default()
            .to_string();
        let model = settings
            .iter()
            .map(|s| s.model.as_str())
            .find(|model| !model.is_empty())
            .unwrap_or_default()
            .to_string();

        Ok(ProviderConfig { api_key, base_url, model })
    }

    fn settings_for(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(name).or_else(|| {
            self.providers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, settings)| settings)
        })
    }

    /// Provider names worth trying in comparison mode.
    ///
    /// Configured names keep their spelling; every remote built-in is added
    /// unless an alias of it is already configured. Local providers only
    /// take part when configured or chosen as the default.
    pub fn compare_candidates(&self, registry: &ProviderRegistry) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();

        let configured = self
            .providers
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(self.default_provider.as_str()));
        for name in configured {
            if seen.insert(registry.canonical_name(name)) {
                candidates.push(name.to_string());
            }
        }

        for name in registry.names() {
            if is_local(name) {
                continue;
            }
            if seen.insert(registry.canonical_name(name)) {
                candidates.push(name.to_string());
            }
        }

        candidates
    }

    /// Build every comparison candidate whose credentials resolve.
    ///
    /// Candidates that cannot be built are skipped, not reported.
    pub fn eligible_providers(&self, registry: &ProviderRegistry) -> Vec<Arc<dyn AiProvider>> {
        self.eligible_providers_with(registry, |var| std::env::var(var).ok())
    }

    pub fn eligible_providers_with<F>(
        &self,
        registry: &ProviderRegistry,
        env: F,
    ) -> Vec<Arc<dyn AiProvider>>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.compare_candidates(registry)
            .into_iter()
            .filter_map(|name| {
                let built = self
                    .provider_config_with(registry, &name, &env)
                    .and_then(|config| registry.resolve(&name, config));
                match built {
                    Ok(provider) => Some(provider),
                    Err(e) => {
                        debug!(provider = %name, reason = %e, "skipping provider");
                        None
                    }
                }
            })
            .collect()
    }
}

fn is_local(name: &str) -> bool {
    LOCAL_PROVIDERS.iter().any(|local| local.eq_ignore_ascii_case(name))
}

/// Hide all but the last four characters of an API key
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn names(providers: &[Arc<dyn AiProvider>]) -> Vec<&str> {
        providers.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_provider, "gemini");
        assert!(config.enable_history);
        assert_eq!(config.few_shot_examples, 3);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            default_provider = "claude"
            enable_history = false

            [providers.claude]
            api_key = "sk-ant"
            model = "claude-3-5-haiku-latest"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_provider, "claude");
        assert!(!config.enable_history);
        assert_eq!(config.few_shot_examples, 3);
        assert_eq!(config.providers["claude"].model, "claude-3-5-haiku-latest");
        assert!(config.providers["claude"].base_url.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cmdfy").join("config.toml");

        let mut config = Config::default();
        config.set_provider("ollama", None, Some("http://gpu-box:11434"), Some("llama3.1"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.default_provider, "ollama");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_provider = [").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CmdfyError::Config(_))));
    }

    #[test]
    fn test_set_provider_keeps_unspecified_fields() {
        let mut config = Config::default();
        config.set_provider("openai", Some("sk-1"), None, Some("gpt-4o"));
        config.set_provider("openai", Some("sk-2"), None, None);

        let settings = &config.providers["openai"];
        assert_eq!(settings.api_key, "sk-2");
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_key_falls_back_to_env() {
        let config = Config::default();
        let resolved = config
            .provider_config_with(&ProviderRegistry::with_builtin(), "gemini", |var| {
                (var == "GEMINI_API_KEY").then(|| "from-env".to_string())
            })
            .unwrap();
        assert_eq!(resolved.api_key, "from-env");
    }

    #[test]
    fn test_file_key_wins_over_env() {
        let mut config = Config::default();
        config.set_provider("gemini", Some("from-file"), None, None);

        let resolved = config
            .provider_config_with(&ProviderRegistry::with_builtin(), "gemini", |_| {
                Some("from-env".to_string())
            })
            .unwrap();
        assert_eq!(resolved.api_key, "from-file");
    }

    #[test]
    fn test_missing_key_is_provider_init_error() {
        let config = Config::default();
        let registry = ProviderRegistry::with_builtin();
        let result = config.provider_config_with(&registry, "openai", no_env);
        assert!(matches!(result, Err(CmdfyError::ProviderInit { .. })));
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let config = Config::default();
        let registry = ProviderRegistry::with_builtin();
        assert!(config.provider_config_with(&registry, "ollama", no_env).is_ok());
    }

    #[test]
    fn test_alias_uses_canonical_settings() {
        let mut config = Config::default();
        config.set_provider("anthropic", Some("sk-ant-key"), None, Some("claude-3-5-haiku-latest"));
        let registry = ProviderRegistry::with_builtin();

        let resolved = config.provider_config_with(&registry, "claude", no_env).unwrap();
        assert_eq!(resolved.api_key, "sk-ant-key");
        assert_eq!(resolved.model, "claude-3-5-haiku-latest");
        assert!(registry.resolve("claude", resolved).is_ok());
    }

    #[test]
    fn test_alias_uses_canonical_env_var() {
        let config = Config::default();
        let registry = ProviderRegistry::with_builtin();

        let resolved = config
            .provider_config_with(&registry, "chatgpt", |var| {
                (var == "OPENAI_API_KEY").then(|| "sk-openai".to_string())
            })
            .unwrap();
        assert_eq!(resolved.api_key, "sk-openai");
    }

    #[test]
    fn test_alias_settings_win_over_canonical() {
        let mut config = Config::default();
        config.set_provider("anthropic", Some("sk-canonical"), None, Some("claude-3-opus-latest"));
        config.set_provider("claude", Some("sk-alias"), None, None);
        let registry = ProviderRegistry::with_builtin();

        let resolved = config
            .provider_config_with(&registry, "claude", |_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(resolved.api_key, "sk-alias");
        assert_eq!(resolved.model, "claude-3-opus-latest");
    }

    #[test]
    fn test_no_eligible_providers_without_credentials() {
        let config = Config::default();
        let registry = ProviderRegistry::with_builtin();

        assert!(config.eligible_providers_with(&registry, no_env).is_empty());
    }

    #[test]
    fn test_eligible_providers_skip_missing_keys() {
        let mut config = Config::default();
        config.set_provider("claude", Some("sk-ant"), None, None);
        config.set_provider("ollama", None, None, None);
        let registry = ProviderRegistry::with_builtin();

        let eligible = config.eligible_providers_with(&registry, |var| {
            (var == "OPENAI_API_KEY").then(|| "sk-openai".to_string())
        });

        let mut eligible = names(&eligible);
        eligible.sort();
        assert_eq!(eligible, vec!["anthropic", "ollama", "openai"]);
    }

    #[test]
    fn test_compare_candidates_dedupe_aliases() {
        let mut config = Config::default();
        config.set_provider("claude", Some("sk-ant"), None, None);
        let registry = ProviderRegistry::with_builtin();

        let candidates = config.compare_candidates(&registry);
        assert!(candidates.contains(&"claude".to_string()));
        assert!(!candidates.contains(&"anthropic".to_string()));
        assert!(!candidates.contains(&"ollama".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "(not set)");
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-ant-1234567890"), "****7890");
    }
}
