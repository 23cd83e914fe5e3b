//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner shown while a comparison runs
#[derive(Debug)]
pub struct ProgressReporter {
    pub spinner: Option<ProgressBar>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create progress reporter for a comparison
    pub fn new_for_compare(message: &str) -> Self {
        Self {
            spinner: Some(create_spinner(message)),
            start_time: Instant::now(),
        }
    }

    /// Create minimal progress reporter (no spinner)
    pub fn new_minimal() -> Self {
        Self {
            spinner: None,
            start_time: Instant::now(),
        }
    }

    /// Replace the spinner message
    pub fn stage(&self, message: &str) {
        if let Some(pb) = &self.spinner {
            pb.set_message(message.to_string());
        }
    }

    /// Stop the spinner, leaving `message` and the elapsed time behind
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_with_message(format!(
                "{} ({:.1}s)",
                message,
                self.start_time.elapsed().as_secs_f64()
            ));
        }
    }

    /// Stop the spinner and erase it
    pub fn clear(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
