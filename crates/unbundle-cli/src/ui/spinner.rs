use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Style;

use super::paint;

/// Spinner for steps without a known length, like fetching chunks.
///
/// Draws nothing when stderr is not a terminal.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that never draws, for `--quiet`.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(format!(
            "{} {message}",
            paint("✓", Style::new().green())
        ));
    }

    pub fn fail(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {message}", paint("✗", Style::new().red())));
    }

    /// Remove the spinner line without a final message.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}
