use serde::{Deserialize, Serialize};

/// Shell connectors a step may use to join the next step.
pub const CONNECTORS: &[&str] = &["|", "&&", ";", "||", ">", ">>"];

/// One step of a generated pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStep {
    /// Primary command (e.g. git, grep)
    pub tool: String,
    /// Arguments in order
    #[serde(default)]
    pub args: Vec<String>,
    /// Connector to the next step; empty on the last step
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub op: String,
}

impl CommandStep {
    pub fn new(tool: &str, args: &[&str], op: &str) -> Self {
        Self {
            tool: tool.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            op: op.to_string(),
        }
    }
}

/// Latency and token usage of the call that produced a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub token_count: u64,
}

/// A full generated command pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub steps: Vec<CommandStep>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub dangerous: bool,
    #[serde(default)]
    pub metrics: Metrics,
}
