use crate::ai::ProviderRegistry;
use crate::cli::ConfigAction;
use crate::config::{mask_key, Config};
use crate::error::Result;
use colored::*;
use std::fmt::Write;
use std::path::Path;

/// `cmdfy config set|show`
pub fn run(action: &ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Set {
            provider,
            key,
            url,
            model,
        } => {
            ProviderRegistry::with_builtin().ensure_supported(provider)?;

            let mut config = Config::load_from(path)?;
            config.set_provider(provider, key.as_deref(), url.as_deref(), model.as_deref());
            config.save_to(path)?;

            println!(
                "{} Configuration updated. Current provider: {}",
                "[OK]".green().bold(),
                provider
            );
        }
        ConfigAction::Show => {
            let config = Config::load_from(path)?;
            print!("{}", describe(&config, path));
        }
    }
    Ok(())
}

/// Human-readable config summary with API keys masked
pub fn describe(config: &Config, path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Config file: {}", path.display());
    let _ = writeln!(out, "Default provider: {}", config.default_provider);
    let _ = writeln!(out, "History: {}", if config.enable_history { "on" } else { "off" });
    let _ = writeln!(out, "Few-shot examples: {}", config.few_shot_examples);

    if config.providers.is_empty() {
        let _ = writeln!(out, "Providers: (none configured)");
        return out;
    }

    let _ = writeln!(out, "Providers:");
    for (name, settings) in &config.providers {
        let _ = writeln!(out, "  {}", name);
        let _ = writeln!(out, "    api_key: {}", mask_key(&settings.api_key));
        if !settings.base_url.is_empty() {
            let _ = writeln!(out, "    base_url: {}", settings.base_url);
        }
        if !settings.model.is_empty() {
            let _ = writeln!(out, "    model: {}", settings.model);
        }
    }
    out
}
