//! Formatting for durations, the path table and the run summary.

use std::time::Duration;

use indexmap::IndexMap;
use owo_colors::Style;
use unbundle::ModuleId;

use super::paint;

/// Format a duration as `50ms`, `1.50s` or `2m 5s`.
///
/// ```
/// use std::time::Duration;
/// use unbundle_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One `<id>\t<path>.js` line per module, in module order.
pub fn format_path_table(paths: &IndexMap<ModuleId, String>) -> String {
    paths
        .iter()
        .map(|(id, path)| format!("{id}\t{path}.js\n"))
        .collect()
}

/// Final line of a successful run, on stderr.
pub fn print_summary(modules: usize, chunks: usize, warnings: usize, elapsed: Duration) {
    let mut line = format!(
        "Reconstructed {} from {} in {}",
        plural(modules, "module"),
        plural(chunks, "chunk"),
        paint(&format_duration(elapsed), Style::new().green()),
    );
    if warnings > 0 {
        line.push_str(&format!(
            " ({})",
            paint(&plural(warnings, "warning"), Style::new().yellow())
        ));
    }
    super::success(&line);
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
