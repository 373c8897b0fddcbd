//! Spinners shown while waiting on BambooHR or FreeIPA.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Start a spinner with `msg`
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style("{spinner:.green} {msg}"));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Replace the spinner with a success line
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.set_style(style("{msg}"));
    pb.finish_with_message(format!("{} {}", "✓".green(), msg));
}

/// Replace the spinner with a failure line
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.set_style(style("{msg}"));
    pb.finish_with_message(format!("{} {}", "✗".red(), msg));
}

/// Run `f` behind a spinner, reporting how it went.
pub fn with_spinner<T, E>(
    msg: &str,
    done: impl FnOnce(&T) -> String,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let pb = spinner(msg);
    match f() {
        Ok(value) => {
            finish_success(&pb, &done(&value));
            Ok(value)
        }
        Err(e) => {
            finish_error(&pb, &format!("{msg} failed"));
            Err(e)
        }
    }
}
