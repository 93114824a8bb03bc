// Recursive remote-tree traversal
use std::fs;
use std::path::Path;

use log::debug;

use crate::ftp::client::RemoteFs;
use crate::listing::{EntryKind, ListingParser};
use crate::mirror::path::RemotePath;
use crate::mirror::progress::ProgressTracker;
use crate::mirror::transfer::download_one_file;
use crate::mirror::{RecursionMode, RunState};
use crate::utils::error::TransferError;

/// Walks a remote directory tree and mirrors it below a local root.
///
/// Paths are passed explicitly through the recursion; neither the process
/// working directory nor the server working directory is ever changed. A
/// failure preparing one directory level records a single directory error
/// and leaves sibling branches untouched.
pub struct Mirror<'a, F: RemoteFs + ?Sized> {
    remote: &'a mut F,
    parser: &'a dyn ListingParser,
    progress: Option<&'a ProgressTracker>,
    state: &'a mut RunState,
}

impl<'a, F: RemoteFs + ?Sized> Mirror<'a, F> {
    pub fn new(
        remote: &'a mut F,
        parser: &'a dyn ListingParser,
        progress: Option<&'a ProgressTracker>,
        state: &'a mut RunState,
    ) -> Self {
        Mirror {
            remote,
            parser,
            progress,
            state,
        }
    }

    /// Mirrors `source` into `target`, descending depth-first when `mode`
    /// is recursive.
    pub fn run(&mut self, target: &Path, source: &RemotePath, mode: RecursionMode) {
        let subdirs = self.run_level(target, source, mode);
        for name in subdirs {
            self.run(&target.join(&name), &source.join(&name), mode);
        }
    }

    /// Processes a single directory level: downloads its files and returns
    /// the subdirectory names to descend into (empty unless `mode`
    /// recurses). Any failure preparing the level becomes one directory
    /// error on the run state.
    pub fn run_level(
        &mut self,
        target: &Path,
        source: &RemotePath,
        mode: RecursionMode,
    ) -> Vec<String> {
        match self.visit(target, source, mode) {
            Ok(subdirs) => subdirs,
            Err(cause) => {
                debug!("directory {} failed: {}", source, cause);
                self.state.record_dir_error(source.to_string(), cause);
                Vec::new()
            }
        }
    }

    fn visit(
        &mut self,
        target: &Path,
        source: &RemotePath,
        mode: RecursionMode,
    ) -> Result<Vec<String>, TransferError> {
        fs::create_dir_all(target)?;
        let lines = self.remote.list_dir(&source.to_string())?;

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for line in &lines {
            match self.parser.parse_line(line) {
                Some(entry) => match entry.kind {
                    EntryKind::File => files.push(entry.name),
                    // listings may echo the self and parent pseudo-entries
                    EntryKind::Directory if entry.name != "." && entry.name != ".." => {
                        subdirs.push(entry.name)
                    }
                    EntryKind::Directory => {}
                },
                None => debug!("skipping unparseable listing line: {:?}", line),
            }
        }

        for name in files {
            download_one_file(
                self.remote,
                &source.join(&name),
                target,
                self.state,
                self.progress,
            );
        }

        if !mode.is_recursive() {
            subdirs.clear();
        }
        Ok(subdirs)
    }
}
