//! Progress display for dependency checks
//!
//! Wraps indicatif so the orchestrator can report per-dependency progress
//! without caring whether output is enabled.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for a check run
pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a progress reporter; a disabled one renders nothing
    pub fn new(enabled: bool, total: u64) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:30.cyan}] {pos}/{len} {msg}")
                .expect("invalid progress template")
                .progress_chars("=> "),
        );
        Self { bar: Some(bar) }
    }

    /// Show which dependency is being checked
    pub fn checking(&self, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("checking {}", name));
        }
    }

    /// Mark one dependency as done
    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
