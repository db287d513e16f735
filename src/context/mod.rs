pub mod clipboard;
pub mod scanner;

use crate::ai::history::HistoryStore;
use crate::ai::{FewShotExample, SystemMetadata};
use std::path::Path;
use tracing::warn;

pub use clipboard::{merge_clipboard, read_clipboard};
pub use scanner::SystemScanner;

/// Snapshot of the environment a command is generated for
///
/// # Arguments
/// * `dir` - directory whose entries are listed
/// * `previous_error` - output of a command that just failed, if any
/// * `few_shot_examples` - accepted commands to show the model
pub fn build_metadata(
    dir: &Path,
    previous_error: Option<String>,
    few_shot_examples: Vec<FewShotExample>,
) -> SystemMetadata {
    SystemMetadata {
        os: std::env::consts::OS.to_string(),
        shell: SystemScanner::shell(),
        available_commands: SystemScanner::available_commands(),
        current_dir_files: SystemScanner::directory_files(dir),
        previous_error: previous_error.filter(|e| !e.trim().is_empty()),
        few_shot_examples,
    }
}

/// Recent history as few-shot examples; a broken log yields none
pub fn history_examples(store: &HistoryStore, limit: usize) -> Vec<FewShotExample> {
    match store.recent(limit) {
        Ok(entries) => entries.iter().map(|e| e.to_example()).collect(),
        Err(e) => {
            warn!(error = %e, "could not read history");
            Vec::new()
        }
    }
}
