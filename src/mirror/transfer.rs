// Single-file download
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::{info, warn};

use crate::ftp::client::RemoteFs;
use crate::mirror::path::RemotePath;
use crate::mirror::progress::ProgressTracker;
use crate::mirror::RunState;
use crate::utils::error::TransferError;

/// Downloads one remote file into `local_dir`, naming it after the final
/// path segment. A failure never escapes: the partial local file is removed
/// and the error is recorded on `state` instead.
pub fn download_one_file<F: RemoteFs + ?Sized>(
    remote: &mut F,
    remote_path: &RemotePath,
    local_dir: &Path,
    state: &mut RunState,
    progress: Option<&ProgressTracker>,
) {
    let name = match remote_path.file_name() {
        Some(name) => name,
        None => {
            state.record_file_error(
                remote_path.to_string(),
                TransferError::Protocol("remote path has no file name".to_string()),
            );
            return;
        }
    };
    let local_path = local_dir.join(name);

    match fetch_to_disk(remote, remote_path, &local_path) {
        Ok(bytes) => {
            state.count_file();
            info!("file copied: {}", remote_path);
            if let Some(progress) = progress {
                progress.file_done(bytes);
            }
        }
        Err(cause) => {
            // a failed transfer must not leave a partial file behind
            if let Err(e) = fs::remove_file(&local_path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("could not remove partial file {}: {}", local_path.display(), e);
                }
            }
            warn!("error downloading {}: {}", remote_path, cause);
            state.record_file_error(remote_path.to_string(), cause);
        }
    }
}

fn fetch_to_disk<F: RemoteFs + ?Sized>(
    remote: &mut F,
    remote_path: &RemotePath,
    local_path: &Path,
) -> Result<u64, TransferError> {
    let mut local_file = File::create(local_path)?;
    let bytes = remote.retrieve(&remote_path.to_string(), &mut local_file)?;
    local_file.flush()?;
    Ok(bytes)
}
