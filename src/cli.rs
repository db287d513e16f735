use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cmdfy")]
#[command(version)]
#[command(about = "Turn natural language into shell commands", long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// What you want to do, in plain words
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Provider to ask (anthropic, claude, openai, chatgpt, gemini, ollama).
    /// Defaults to default_provider from the config file
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Run the generated command instead of printing it
    #[arg(short = 'y', long)]
    pub execute: bool,

    /// Ask every configured provider at once and pick an answer
    #[arg(long, conflicts_with = "provider")]
    pub compare: bool,

    /// Directory whose files are described to the model
    #[arg(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Output of a command that just failed, to help fix it
    #[arg(short = 'e', long, allow_hyphen_values = true)]
    pub error: Option<String>,

    /// Add the clipboard contents to the query as context
    #[arg(short = 'c', long)]
    pub clipboard: bool,

    /// Config file to use instead of ~/.cmdfy/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage provider settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Store credentials for a provider and make it the default
    Set {
        #[arg(short = 'p', long)]
        provider: String,

        #[arg(short = 'k', long)]
        key: Option<String>,

        /// Custom API base URL
        #[arg(short = 'u', long)]
        url: Option<String>,

        #[arg(short = 'm', long)]
        model: Option<String>,
    },
    /// Print the current configuration with keys masked
    Show,
}

impl Cli {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}
