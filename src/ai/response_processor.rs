use crate::ai::command::{CommandResult, CONNECTORS};
use crate::error::{CmdfyError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Pre-compiled fenced code block matcher
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)\n?```").unwrap()
});

/// Turns a provider's raw text reply into a validated `CommandResult`
pub struct ResponseProcessor;

impl ResponseProcessor {
    /// Parse and validate a reply
    ///
    /// # Arguments
    /// * `provider` - Provider name, used in error messages
    /// * `raw` - Raw text returned by the model
    ///
    /// # Examples
    /// ```
    /// use cmdfy::ai::response_processor::ResponseProcessor;
    ///
    /// let raw = "```json\n{\"steps\":[{\"tool\":\"ls\",\"args\":[\"-la\"]}],\"explanation\":\"list\",\"dangerous\":false}\n```";
    /// let result = ResponseProcessor::process("gemini", raw).unwrap();
    /// assert_eq!(result.steps[0].tool, "ls");
    /// ```
    pub fn process(provider: &str, raw: &str) -> Result<CommandResult> {
        let text = Self::extract_json(raw);

        if text.is_empty() {
            return Err(CmdfyError::generation(provider, "empty response"));
        }

        let mut result: CommandResult = serde_json::from_str(text).map_err(|e| {
            CmdfyError::generation(
                provider,
                format!("failed to parse JSON response: {}. raw: {}", e, text),
            )
        })?;

        for step in &mut result.steps {
            step.op = step.op.trim().to_string();
        }

        Self::validate(provider, &result)?;
        Ok(result)
    }

    /// Strip code fences and chatter around the JSON object
    fn extract_json(raw: &str) -> &str {
        let mut text = raw.trim();

        if text.contains("```") {
            if let Some(inner) = CODE_BLOCK_REGEX.captures(text).and_then(|c| c.get(1)) {
                text = inner.as_str().trim();
            }
        }

        // Chatty models sometimes wrap the object in prose
        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if end > start => &text[start..=end],
            _ => text,
        }
    }

    fn validate(provider: &str, result: &CommandResult) -> Result<()> {
        if result.steps.is_empty() {
            return Err(CmdfyError::generation(provider, "response contains no steps"));
        }

        let last = result.steps.len() - 1;
        for (i, step) in result.steps.iter().enumerate() {
            if step.tool.trim().is_empty() {
                return Err(CmdfyError::generation(
                    provider,
                    format!("step {} has no tool", i + 1),
                ));
            }

            let op = step.op.as_str();
            if !op.is_empty() && !CONNECTORS.contains(&op) {
                return Err(CmdfyError::generation(
                    provider,
                    format!("step {} uses unknown operator '{}'", i + 1, op),
                ));
            }

            if op.is_empty() && i < last {
                warn!(provider, step = i + 1, "step has no operator; steps will run sequentially");
            }
        }

        Ok(())
    }
}
