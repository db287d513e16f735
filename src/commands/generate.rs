use crate::ai::history::{HistoryEntry, HistoryStore};
use crate::ai::{CommandResult, ComparisonEngine, ProviderRegistry, ProviderResult, SystemMetadata};
use crate::cli::Cli;
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::executor::{Authorization, CommandAssembler, CommandRunner, ExecutionGate, TerminalConfirm};
use crate::ui;
use colored::*;
use std::collections::BTreeMap;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::{debug, warn};

/// The command the user ended up with, and who produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub provider: String,
    pub model: String,
    pub result: CommandResult,
}

/// Generate a command for the query on the command line, then print or run it
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut query = cli.query_text();
    if cli.clipboard {
        query = with_clipboard(&query);
    }
    let registry = ProviderRegistry::with_builtin();
    let history = open_history(config);

    let examples = history
        .as_ref()
        .map(|store| context::history_examples(store, config.few_shot_examples))
        .unwrap_or_default();
    let meta = context::build_metadata(&cli.directory, cli.error.clone(), examples);
    debug!(
        commands = meta.available_commands.len(),
        files = meta.current_dir_files.len(),
        "collected system metadata"
    );
    let shell = meta.shell.clone();

    let choice = if cli.compare {
        compare_providers(&registry, config, &query, meta, cli.execute).await?
    } else {
        let name = cli.provider.as_deref().unwrap_or(&config.default_provider);
        Some(ask_provider(&registry, config, name, &query, &meta).await?)
    };

    let Some(choice) = choice else {
        return Ok(());
    };

    finalize(cli, &query, &choice, &shell, history.as_ref())
}

/// Query with the clipboard attached; a clipboard that can't be read is skipped
fn with_clipboard(query: &str) -> String {
    match context::read_clipboard() {
        Ok(content) => {
            let merged = context::merge_clipboard(query, &content);
            if merged != query {
                eprintln!("{} Added clipboard content to context.", "[+]".green().bold());
            }
            merged
        }
        Err(e) => {
            warn!(error = %e, "clipboard skipped");
            eprintln!("{} Failed to read clipboard: {}", "[!]".yellow().bold(), e);
            query.to_string()
        }
    }
}

async fn ask_provider(
    registry: &ProviderRegistry,
    config: &Config,
    name: &str,
    query: &str,
    meta: &SystemMetadata,
) -> Result<Choice> {
    registry.ensure_supported(name)?;
    let provider = registry.resolve(name, config.provider_config(registry, name)?)?;

    let spinner = ui::create_spinner(&format!("Asking {} ({})...", provider.name(), provider.model()));
    let outcome = provider.generate(query, meta).await;
    spinner.finish_and_clear();

    Ok(Choice {
        provider: provider.name().to_string(),
        model: provider.model().to_string(),
        result: outcome?,
    })
}

async fn compare_providers(
    registry: &ProviderRegistry,
    config: &Config,
    query: &str,
    meta: SystemMetadata,
    execute: bool,
) -> Result<Option<Choice>> {
    let providers = config.eligible_providers(registry);
    let models: BTreeMap<String, String> = providers
        .iter()
        .map(|p| (p.name().to_string(), p.model().to_string()))
        .collect();

    if !providers.is_empty() {
        let names: Vec<&str> = models.keys().map(String::as_str).collect();
        eprintln!("{} Comparing {}", "[AI]".blue().bold(), names.join(", "));
    }

    let spinner = ui::create_spinner("Waiting for every provider...");
    let outcome = ComparisonEngine::new()
        .compare(providers, query, Arc::new(meta))
        .await;
    spinner.finish_and_clear();

    let mut results = outcome?;
    results.sort_by(|a, b| a.name.cmp(&b.name));

    let interactive = io::stdout().is_terminal() && io::stdin().is_terminal();
    if !interactive || !results.iter().any(ProviderResult::is_success) {
        ui::print_comparison(&results);
        if execute && !interactive {
            eprintln!(
                "{} Nothing was executed: choose a command interactively or rerun without --compare",
                "[!]".yellow().bold()
            );
        }
        return Ok(None);
    }

    let chosen = ui::run_selection(&results)?;
    Ok(chosen.and_then(|index| take_choice(results, index, &models)))
}

/// Pull the confirmed entry out of the comparison results
pub fn take_choice(
    results: Vec<ProviderResult>,
    index: usize,
    models: &BTreeMap<String, String>,
) -> Option<Choice> {
    let entry = results.into_iter().nth(index)?;
    let result = entry.outcome.ok()?;
    Some(Choice {
        model: models.get(&entry.name).cloned().unwrap_or_default(),
        provider: entry.name,
        result,
    })
}

fn finalize(
    cli: &Cli,
    query: &str,
    choice: &Choice,
    shell: &str,
    history: Option<&HistoryStore>,
) -> Result<()> {
    let rendered = CommandAssembler::assemble(&choice.result);

    if !cli.execute {
        ui::print_result(&rendered, &choice.result);
        remember(history, query, cli.error.as_deref(), choice, &rendered);
        return Ok(());
    }

    match ExecutionGate::authorize(&choice.result, &rendered, &mut TerminalConfirm)? {
        Authorization::Abort => {
            println!("Aborted.");
            return Ok(());
        }
        Authorization::Proceed => {}
    }

    CommandRunner::for_shell(shell).run(&rendered)?;
    remember(history, query, cli.error.as_deref(), choice, &rendered);
    Ok(())
}

fn open_history(config: &Config) -> Option<HistoryStore> {
    if !config.enable_history {
        return None;
    }
    match HistoryStore::default_location() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "history disabled");
            None
        }
    }
}

fn remember(
    history: Option<&HistoryStore>,
    query: &str,
    previous_error: Option<&str>,
    choice: &Choice,
    rendered: &str,
) {
    let Some(store) = history else {
        return;
    };

    let mut entry = HistoryEntry::new(query, rendered, &choice.provider);
    entry.context = previous_error.map(str::to_string);
    entry.explanation = choice.result.explanation.clone();
    entry.model = choice.model.clone();

    if let Err(e) = store.record(entry) {
        warn!(error = %e, "could not record history");
    }
}
