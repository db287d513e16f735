use crate::ai::SystemMetadata;

/// JSON schema every provider is asked to answer with
const RESPONSE_SCHEMA: &str = r#"{
  "steps": [
    {
      "tool": "string (the primary command, e.g. git, grep)",
      "args": ["string", "arguments"],
      "op": "string (operator to connect to next step: | (pipe), && (and), ; (seq), || (or), > (redirect), >> (append). Empty for last step.)"
    }
  ],
  "explanation": "string (brief explanation of the entire pipeline)",
  "dangerous": boolean (true if ANY step modifies files significantly, deletes data, or has destructive side effects)
}"#;

/// Prompt builder shared by every provider.
///
/// Keeps the schema and system description identical across backends so
/// their answers are comparable side by side.
pub struct PromptTemplate;

impl PromptTemplate {
    /// System instructions: role, schema and the user's environment
    ///
    /// # Examples
    /// ```
    /// use cmdfy::ai::prompt_template::PromptTemplate;
    /// use cmdfy::ai::SystemMetadata;
    ///
    /// let meta = SystemMetadata {
    ///     os: "linux".to_string(),
    ///     shell: "/bin/bash".to_string(),
    ///     ..SystemMetadata::default()
    /// };
    /// let prompt = PromptTemplate::system_prompt(&meta);
    /// assert!(prompt.contains("Operating System: linux"));
    /// ```
    pub fn system_prompt(meta: &SystemMetadata) -> String {
        let mut template = format!(
            "You are a command line expert.\n\
             Your task is to translate the following natural language request into a shell command or a pipeline of commands.\n\
             Respond ONLY with a valid JSON object matching this schema:\n\
             {}\n\n\
             Operating System: {}\n\
             Shell: {}\n\
             Available Tools: {}\n\
             Current Directory Files: {}\n",
            RESPONSE_SCHEMA,
            meta.os,
            meta.shell,
            meta.available_commands.join(", "),
            meta.current_dir_files.join(", "),
        );

        if let Some(error) = meta.previous_error.as_deref().filter(|e| !e.trim().is_empty()) {
            template.push_str(&format!(
                "\nThe previous command failed with this output; take it into account:\n{}\n",
                error.trim()
            ));
        }

        if !meta.few_shot_examples.is_empty() {
            template.push_str("\nCommands the user accepted before:\n");
            for (i, example) in meta.few_shot_examples.iter().enumerate() {
                template.push_str(&format!(
                    "{}. Request: \"{}\" → Command: \"{}\"\n",
                    i + 1,
                    example.query,
                    example.command
                ));
            }
        }

        template
    }

    /// Single prompt for backends without a separate system role
    pub fn full_prompt(query: &str, meta: &SystemMetadata) -> String {
        format!("{}Request: {}\n", Self::system_prompt(meta), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FewShotExample;

    fn metadata() -> SystemMetadata {
        SystemMetadata {
            os: "linux".to_string(),
            shell: "/bin/zsh".to_string(),
            available_commands: vec!["git".to_string(), "ls".to_string()],
            current_dir_files: vec!["Cargo.toml".to_string(), "src/".to_string()],
            ..SystemMetadata::default()
        }
    }

    #[test]
    fn test_system_prompt_contains_environment() {
        let prompt = PromptTemplate::system_prompt(&metadata());

        assert!(prompt.contains("Operating System: linux"));
        assert!(prompt.contains("Shell: /bin/zsh"));
        assert!(prompt.contains("Available Tools: git, ls"));
        assert!(prompt.contains("Current Directory Files: Cargo.toml, src/"));
        assert!(prompt.contains("\"dangerous\""));
    }

    #[test]
    fn test_previous_error_included_only_when_present() {
        let mut meta = metadata();
        assert!(!PromptTemplate::system_prompt(&meta).contains("previous command failed"));

        meta.previous_error = Some("permission denied\n".to_string());
        let prompt = PromptTemplate::system_prompt(&meta);
        assert!(prompt.contains("previous command failed"));
        assert!(prompt.contains("permission denied"));
    }

    #[test]
    fn test_few_shot_examples() {
        let mut meta = metadata();
        meta.few_shot_examples = vec![FewShotExample {
            query: "list files".to_string(),
            command: "ls -la".to_string(),
            provider: "gemini".to_string(),
        }];

        let prompt = PromptTemplate::system_prompt(&meta);
        assert!(prompt.contains("1. Request: \"list files\" → Command: \"ls -la\""));
    }

    #[test]
    fn test_full_prompt_ends_with_request() {
        let prompt = PromptTemplate::full_prompt("show git status", &metadata());
        assert!(prompt.trim_end().ends_with("Request: show git status"));
    }
}
