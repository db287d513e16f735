use crate::ai::{CommandResult, CommandStep};

/// Connector used between two steps when the model left `op` empty
pub const DEFAULT_CONNECTOR: &str = ";";

/// Renders a structured pipeline as one shell command line
pub struct CommandAssembler;

impl CommandAssembler {
    /// Join every step into a single command string.
    ///
    /// Arguments containing whitespace are wrapped in double quotes unless
    /// they already start with a quote. The last step's operator is ignored.
    ///
    /// # Examples
    /// ```
    /// use cmdfy::ai::{CommandResult, CommandStep};
    /// use cmdfy::executor::CommandAssembler;
    ///
    /// let result = CommandResult {
    ///     steps: vec![
    ///         CommandStep::new("git", &["status"], "&&"),
    ///         CommandStep::new("ls", &["-la"], ""),
    ///     ],
    ///     ..CommandResult::default()
    /// };
    /// assert_eq!(CommandAssembler::assemble(&result), "git status && ls -la");
    /// ```
    pub fn assemble(result: &CommandResult) -> String {
        let last = result.steps.len().saturating_sub(1);
        let mut line = String::new();

        for (i, step) in result.steps.iter().enumerate() {
            line.push_str(&render_step(step));

            if i < last {
                let op = if step.op.is_empty() {
                    DEFAULT_CONNECTOR
                } else {
                    step.op.as_str()
                };
                line.push(' ');
                line.push_str(op);
                line.push(' ');
            }
        }

        line
    }
}

fn render_step(step: &CommandStep) -> String {
    std::iter::once(step.tool.clone())
        .chain(step.args.iter().map(|arg| quote_arg(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let already_quoted = arg.starts_with('"') || arg.starts_with('\'');
    if arg.chars().any(char::is_whitespace) && !already_quoted {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}
