// Progress display
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Live spinner showing files copied and bytes received. The remote tree
/// size is unknown up front, so there is no percentage bar. Clone handles
/// share one spinner across worker threads.
#[derive(Clone)]
pub struct ProgressTracker {
    spinner: ProgressBar,
    files: Arc<AtomicU64>,
    bytes: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("starting download...");

        Self {
            spinner,
            files: Arc::new(AtomicU64::new(0)),
            bytes: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn file_done(&self, bytes: u64) {
        let files = self.files.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.spinner
            .set_message(format!("{} files, {}", files, format_bytes(total)));
    }

    pub fn finish(&self) {
        let elapsed = self.start_time.elapsed();
        let total = self.bytes.load(Ordering::Relaxed);
        let avg_speed = if elapsed.as_secs() > 0 {
            total / elapsed.as_secs()
        } else {
            total
        };
        self.spinner.finish_with_message(format!(
            "{} files, {} (avg speed: {}/s)",
            self.files.load(Ordering::Relaxed),
            format_bytes(total),
            format_bytes(avg_speed)
        ));
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
