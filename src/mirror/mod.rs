// Mirroring engine entry
pub mod path;
pub mod progress;
pub mod transfer;
pub mod traverse;

pub use path::RemotePath;
pub use traverse::Mirror;

use crate::utils::error::{DownloadError, FailureScope, TransferError};

/// Whether traversal descends into subdirectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecursionMode {
    #[default]
    Recursive,
    TopLevelOnly,
}

impl RecursionMode {
    /// Maps the conventional flag value: `"R"` recurses, anything else
    /// processes only the given directory.
    pub fn from_code(code: &str) -> Self {
        if code == "R" {
            RecursionMode::Recursive
        } else {
            RecursionMode::TopLevelOnly
        }
    }

    pub fn is_recursive(self) -> bool {
        self == RecursionMode::Recursive
    }
}

/// Outcome of one download run, built fresh per invocation and returned to
/// the caller by value.
#[derive(Debug, Default)]
pub struct RunState {
    pub files_downloaded: u64,
    pub errors: Vec<DownloadError>,
}

impl RunState {
    pub fn count_file(&mut self) {
        self.files_downloaded += 1;
    }

    pub fn record_file_error(&mut self, path: String, cause: TransferError) {
        self.errors.push(DownloadError {
            path,
            scope: FailureScope::File,
            cause,
        });
    }

    pub fn record_dir_error(&mut self, path: String, cause: TransferError) {
        self.errors.push(DownloadError {
            path,
            scope: FailureScope::Directory,
            cause,
        });
    }

    /// Folds a worker's results into this state. Error order within the
    /// worker is preserved; order across workers follows completion order.
    pub fn merge(&mut self, other: RunState) {
        self.files_downloaded += other.files_downloaded;
        self.errors.extend(other.errors);
    }
}
