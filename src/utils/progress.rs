//! Progress bar utilities using indicatif
//!
//! Provides a wrapper around indicatif's `ProgressBar` so the executor can
//! report one tick per finished credential context.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar wrapper for displaying per-context status.
///
/// Cloning is cheap and every clone drives the same bar, so each worker task
/// can hold its own handle.
#[derive(Clone)]
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a new progress bar with known total
    pub fn new(total: usize, label: &str) -> Self {
        let bar = IndicatifBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} contexts ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");
        bar.set_style(style);
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// A bar that draws nothing; used for quiet and single-context runs.
    pub fn hidden() -> Self {
        Self {
            bar: IndicatifBar::hidden(),
        }
    }

    /// Increment progress by 1
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> usize {
        self.bar.position() as usize
    }

    /// Finish with custom message
    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Remove the bar from the terminal
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
