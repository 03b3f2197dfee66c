//! Progress bar and console utilities.
//!
//! Provides helpers for creating progress bars, with support for log-only
//! mode where bars are hidden for tail-friendly output. All bars hang off
//! one `MultiProgress` so log lines can be printed above them.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

static BARS: Lazy<MultiProgress> = Lazy::new(MultiProgress::new);

/// Set log-only mode globally
pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

/// Check if log-only mode is enabled
pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Run `f` with the bars cleared from the terminal, redrawing them after.
pub fn suspend<F: FnOnce() -> R, R>(f: F) -> R {
    BARS.suspend(f)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Create a progress bar with consistent styling.
/// In log-only mode, the progress bar is hidden.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = if is_log_only() {
        let pb = ProgressBar::new(len);
        pb.set_draw_target(ProgressDrawTarget::hidden());
        pb
    } else {
        let pb = BARS.add(ProgressBar::new(len));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})")
                .unwrap()
                .progress_chars("=> "),
        );
        pb
    };
    pb.set_message(msg.to_string());
    pb
}

/// Log progress periodically for tail-friendly output.
/// Only logs when in log-only mode and at specified intervals.
pub fn log_progress(phase: &str, current: u64, total: u64, interval: u64) {
    if is_log_only() && total > 0 && (current % interval == 0 || current == total) {
        let pct = 100.0 * current as f64 / total as f64;
        eprintln!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}

/// Print the `=====` framed summary block used by every binary.
pub fn print_summary(title: &str, lines: &[(&str, String)]) {
    println!("\n{:=<60}", "");
    println!("{}", title);
    println!("{:=<60}", "");
    for (label, value) in lines {
        println!("  {}: {}", label, value);
    }
    println!("{:=<60}", "");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
