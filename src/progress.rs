//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il feedback visivo e le statistiche dei batch.
//!
//! ## Componenti principali:
//! - `ProgressManager`: spinner con `indicatif` (il totale non è noto a priori,
//!   perché l'enumerazione è lazy)
//! - `BatchStats`: statistiche cumulative del batch
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] 42 files ✅ gallery/photo.jpg
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use crate::file_manager::FileManager;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a spinner counting processed files
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a batch run
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct BatchStats {
    /// Files yielded by the enumerator
    pub files_seen: usize,
    /// Outputs written (or that would be written in a dry run)
    pub files_written: usize,
    /// Files skipped because their output already existed
    pub files_skipped: usize,
    /// Files filtered out by extension
    pub files_ignored: usize,
    pub errors: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_written(&mut self, bytes_read: u64, bytes_written: u64) {
        self.files_seen += 1;
        self.files_written += 1;
        self.bytes_read += bytes_read;
        self.bytes_written += bytes_written;
    }

    pub fn add_skipped(&mut self) {
        self.files_seen += 1;
        self.files_skipped += 1;
    }

    pub fn add_ignored(&mut self) {
        self.files_seen += 1;
        self.files_ignored += 1;
    }

    pub fn add_error(&mut self) {
        self.files_seen += 1;
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Seen: {} files | Written: {} | Skipped: {} | Ignored: {} | Errors: {} | Read: {} | Written: {}",
            self.files_seen,
            self.files_written,
            self.files_skipped,
            self.files_ignored,
            self.errors,
            FileManager::format_size(self.bytes_read),
            FileManager::format_size(self.bytes_written),
        )
    }
}
