//! Terminal output: spinners, status lines and the module path table.
//!
//! Status lines go to stderr so stdout stays free for `--dry-run` output.
//!
//! ```no_run
//! use unbundle_cli::ui;
//!
//! ui::init_colors(false);
//! let spinner = ui::Spinner::new("Parsing bundle...");
//! spinner.finish("Found 12 modules");
//! ui::warning("module 7: require of module 99 left unchanged");
//! ```

mod format;
mod messages;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_path_table, print_summary};
pub use messages::{info, success, warning};
pub use spinner::Spinner;

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Whether the environment asks for colors.
///
/// `NO_COLOR` beats `FORCE_COLOR`; otherwise colors follow whether stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether output is colored. `--no-color` always wins.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLORS.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Apply `style` when colors are enabled.
pub(crate) fn paint(text: &str, style: owo_colors::Style) -> String {
    use owo_colors::OwoColorize;

    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
