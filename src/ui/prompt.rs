use crate::ai::{CommandResult, ProviderResult};
use crate::executor::CommandAssembler;
use colored::*;
use std::fmt::Write;

/// Printed form of a generated command
pub fn format_result(rendered: &str, result: &CommandResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{} {}", "COMMAND:".cyan().bold(), rendered.green());
    let _ = writeln!(out, "\n{} {}", "EXPLANATION:".cyan().bold(), result.explanation);
    if result.dangerous {
        let _ = writeln!(out, "\n{}: Yes", "[DANGEROUS]".red().bold());
    }
    out
}

pub fn print_result(rendered: &str, result: &CommandResult) {
    println!("{}", format_result(rendered, result));
}

/// Plain listing of every comparison outcome, for non-interactive output
pub fn format_comparison(results: &[ProviderResult]) -> String {
    let mut out = String::new();

    for entry in results {
        let _ = writeln!(out, "{} {}", "[AI]".blue().bold(), entry.name.bold());
        match &entry.outcome {
            Ok(result) => {
                let _ = writeln!(out, "  COMMAND: {}", CommandAssembler::assemble(result));
                let _ = writeln!(out, "  EXPLANATION: {}", result.explanation);
                let _ = writeln!(
                    out,
                    "  LATENCY: {}  TOKENS: {}",
                    result.metrics.latency, result.metrics.token_count
                );
                if result.dangerous {
                    let _ = writeln!(out, "  {}", "[DANGEROUS]".red().bold());
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  {} {}", "[X]".red(), e);
            }
        }
        out.push('\n');
    }

    out
}

pub fn print_comparison(results: &[ProviderResult]) {
    print!("{}", format_comparison(results));
}
