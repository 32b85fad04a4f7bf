// src/commands/progress.rs
//! Download progress on stderr

use indicatif::{ProgressBar, ProgressStyle};

/// Byte counter for a download of (possibly unknown) length
pub fn download_bar(length: Option<u64>) -> ProgressBar {
    match length {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{bytes}/{total_bytes} [{bar:40.green/dim}] {bytes_per_sec}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {bytes} {bytes_per_sec}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        }
    }
}
