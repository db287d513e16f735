use crate::error::{CmdfyError, Result};

/// Current text on the system clipboard
pub fn read_clipboard() -> Result<String> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| CmdfyError::Terminal(format!("clipboard unavailable: {}", e)))?;
    clipboard
        .get_text()
        .map_err(|e| CmdfyError::Terminal(format!("could not read clipboard: {}", e)))
}

/// Append clipboard text to the query; blank content leaves it unchanged
pub fn merge_clipboard(query: &str, content: &str) -> String {
    if content.trim().is_empty() {
        return query.to_string();
    }
    format!("{}\n\nContext from Clipboard:\n{}", query, content)
}
