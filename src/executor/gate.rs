use crate::ai::CommandResult;
use crate::error::{CmdfyError, Result};
use colored::*;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;

pub const CONFIRM_PROMPT: &str = "Are you sure you want to execute it? [y/N]";

/// Outcome of the execution gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Proceed,
    Abort,
}

/// Source of the user's answer to the confirmation prompt
pub trait ConfirmInput {
    /// Show `prompt` and read one answer; `None` at end of input
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads answers line by line from any buffered reader
pub struct LineConfirm<R> {
    reader: R,
    echo_prompt: bool,
}

impl<R: BufRead> LineConfirm<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            echo_prompt: false,
        }
    }

    /// Print the prompt on stderr before reading
    pub fn with_prompt_echo(mut self) -> Self {
        self.echo_prompt = true;
        self
    }
}

impl<R: BufRead> ConfirmInput for LineConfirm<R> {
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.echo_prompt {
            eprint!("{}: ", prompt);
            io::stderr().flush()?;
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Interactive prompt on a terminal, plain line reading when piped
pub struct TerminalConfirm;

impl ConfirmInput for TerminalConfirm {
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        if !io::stdin().is_terminal() {
            return LineConfirm::new(io::stdin().lock())
                .with_prompt_echo()
                .read_answer(prompt);
        }

        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CmdfyError::Terminal(e.to_string()))?;
        Ok(Some(answer))
    }
}

/// Last check before a generated command runs
pub struct ExecutionGate;

impl ExecutionGate {
    /// Decide whether `rendered` may run.
    ///
    /// Commands not flagged dangerous pass without asking. Dangerous ones
    /// need an explicit `y`; anything else, including no answer, aborts.
    pub fn authorize(
        result: &CommandResult,
        rendered: &str,
        input: &mut dyn ConfirmInput,
    ) -> Result<Authorization> {
        if !result.dangerous {
            return Ok(Authorization::Proceed);
        }

        eprintln!(
            "\n{} This command is marked as dangerous: {}",
            "[WARNING]".red().bold(),
            result.explanation
        );
        eprintln!("  {}", rendered.red().bold());

        let answer = input.read_answer(CONFIRM_PROMPT)?;
        debug!(answer = ?answer, "dangerous command confirmation");

        match answer {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => Ok(Authorization::Proceed),
            _ => Ok(Authorization::Abort),
        }
    }
}
