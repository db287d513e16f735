use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner on stderr while providers are working
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]);
    spinner.set_style(
        style
            .clone()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or(style),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_message() {
        let spinner = create_spinner("Asking gemini...");
        assert_eq!(spinner.message(), "Asking gemini...");
        spinner.finish_and_clear();
    }
}
