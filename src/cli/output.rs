use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

// Everything here goes to stderr. stdout carries object data only.

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Start a spinner for a network round trip. Hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Clear the spinner and print the outcome as a success line.
pub fn finish_spinner(sp: ProgressBar, msg: &str) {
    sp.finish_and_clear();
    success(msg);
}

/// Run `work` under a spinner. The spinner is cleared on every exit path.
pub fn with_spinner<T, E>(msg: &str, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let sp = spinner(msg);
    let result = work();
    sp.finish_and_clear();
    result
}
