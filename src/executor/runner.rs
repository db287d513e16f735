use crate::error::{CmdfyError, Result};
use colored::*;
use std::process::Command;
use tracing::debug;

/// Runs an assembled command line through the platform shell
pub struct CommandRunner {
    shell: String,
    flag: &'static str,
}

impl CommandRunner {
    /// Runner for the shell the command was generated for: `<shell> -c` on
    /// Unix, `cmd /C` on Windows
    pub fn for_shell(shell: &str) -> Self {
        if cfg!(windows) {
            return Self::with_shell("cmd", "/C");
        }
        Self::with_shell(shell, "-c")
    }

    pub fn with_shell(shell: &str, flag: &'static str) -> Self {
        Self {
            shell: shell.to_string(),
            flag,
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Run `command` with inherited stdio, blocking until it exits
    ///
    /// # Errors
    /// * `CmdfyError::Execution` if the shell cannot start or the command
    ///   exits unsuccessfully
    pub fn run(&self, command: &str) -> Result<()> {
        eprintln!("{} {}", "[>>]".cyan().bold(), command);
        debug!(shell = %self.shell, command, "executing");

        let status = Command::new(&self.shell)
            .arg(self.flag)
            .arg(command)
            .status()
            .map_err(|e| CmdfyError::Execution(format!("failed to start {}: {}", self.shell, e)))?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("command exited with status {}", code),
                None => "command was terminated by a signal".to_string(),
            };
            return Err(CmdfyError::Execution(reason));
        }

        Ok(())
    }
}
