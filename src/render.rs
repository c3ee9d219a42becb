//! Terminal rendering for sync plans and reports, using owo_colors.

use apptsync_core::diff::{ChangeKind, ChangeSet, Keyed};
use apptsync_core::sync::{BatchOutcome, SyncPlan, SyncReport};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ChangeKind {
    fn render(&self) -> String {
        match self {
            ChangeKind::Added => self.to_string().green().to_string(),
            ChangeKind::Deleted => self.to_string().red().to_string(),
        }
    }
}

fn render_changes<T: Keyed>(heading: &str, changes: &ChangeSet<T>) -> Vec<String> {
    if changes.is_empty() {
        return vec![];
    }

    let mut lines = vec![heading.bold().to_string()];
    for (kind, title) in changes.entries() {
        let title = if title.is_empty() { "(untitled)" } else { title };
        lines.push(format!("   {} {}", kind.render(), title));
    }
    lines
}

impl Render for SyncPlan {
    fn render(&self) -> String {
        let mut lines = vec![format!("{} {}", "Window:".dimmed(), self.window)];

        if self.is_empty() {
            lines.push("Everything up to date".green().to_string());
            return lines.join("\n");
        }

        lines.extend(render_changes("Remote calendar", &self.remote_changes));
        lines.extend(render_changes("Appointment file", &self.local_changes));
        lines.join("\n")
    }
}

impl Render for BatchOutcome {
    fn render(&self) -> String {
        if self.failures.is_empty() {
            self.to_string()
        } else {
            self.to_string().yellow().to_string()
        }
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .steps()
            .iter()
            .map(|(label, outcome)| format!("{:<26} {}", label, outcome.render()))
            .collect();

        if self.has_failures() {
            lines.push(String::new());
            lines.push("Failures:".red().bold().to_string());
            for failure in self.failures() {
                lines.push(format!("   {}: {}", failure.title, failure.reason.red()));
            }
        }

        lines.join("\n")
    }
}

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
