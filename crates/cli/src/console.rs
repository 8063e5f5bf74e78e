// Console progress output
// The per-attempt pass/fail lines are the launcher's user-facing contract;
// they go to stdout, independent of the tracing subscriber.

use colored::Colorize;

use glaunch_core::port::ProgressReporter;

pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn attempt_started(&self, label: &str) {
        println!("{} {}...", "•".bold(), format!("Trying {}", label).cyan());
    }

    fn attempt_failed(&self, label: &str) {
        println!("{} {}", "✗".red().bold(), format!("{} failed", label));
    }

    fn backend_adopted(&self, label: &str) {
        println!("{} {}", "✓".green().bold(), format!("{} works", label));
    }

    fn fallback_started(&self) {
        println!(
            "{} {}",
            "•".bold(),
            "All backends failed, launching with default environment".yellow()
        );
    }
}
