use crate::ai::FewShotExample;
use crate::error::{CmdfyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::debug;

/// One accepted query → command pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    /// Captured error output the query was asked with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub command: String,
    #[serde(default)]
    pub explanation: String,
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

impl HistoryEntry {
    pub fn new(query: &str, command: &str, provider: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.to_string(),
            context: None,
            command: command.to_string(),
            explanation: String::new(),
            provider: provider.to_string(),
            model: String::new(),
        }
    }

    pub fn to_example(&self) -> FewShotExample {
        FewShotExample {
            query: self.query.clone(),
            command: self.command.clone(),
            provider: self.provider.clone(),
        }
    }
}

/// Append-only JSONL log of accepted commands.
///
/// Stored at `~/.cmdfy/brain.jsonl` unless another path is given.
pub struct HistoryStore {
    file_path: PathBuf,
}

impl HistoryStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Store at the default location
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CmdfyError::History("could not find home directory".to_string()))?;
        Ok(Self::new(home.join(".cmdfy").join("brain.jsonl")))
    }

    /// Append an entry, stamping it with the current time
    pub fn record(&self, mut entry: HistoryEntry) -> Result<()> {
        if entry.query.trim().is_empty() || entry.command.trim().is_empty() {
            return Err(CmdfyError::History("query and command are required".to_string()));
        }
        entry.timestamp = Utc::now();

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        writeln!(file, "{}", line)?;

        debug!(path = %self.file_path.display(), "recorded history entry");
        Ok(())
    }

    /// The `limit` most recently appended entries, newest first.
    ///
    /// Malformed lines are skipped; a missing file yields an empty list.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        if limit == 0 || !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.file_path)?;
        let mut entries = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!(error = %e, "skipping malformed history line"),
            }
        }

        Ok(entries.into_iter().rev().take(limit).collect())
    }
}
