// Session lifecycle and run orchestration
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::unbounded;
use log::{error, info};

use crate::ftp::client::{ConnectInfo, FtpClient, RemoteFs};
use crate::listing::{ListingParser, UnixListingParser};
use crate::mirror::path::RemotePath;
use crate::mirror::progress::ProgressTracker;
use crate::mirror::traverse::Mirror;
use crate::mirror::{RecursionMode, RunState};
use crate::threadpool::ThreadPool;
use crate::utils::error::TransferError;

/// Opens a fresh connection from the stored [`ConnectInfo`]. The session and
/// every parallel worker dial through this, so tests can substitute an
/// in-memory transport.
pub type Connector = dyn Fn(&ConnectInfo) -> Result<Box<dyn RemoteFs>, TransferError> + Send + Sync;

/// Owns at most one live FTP connection and drives download runs over it.
///
/// Each [`start_downloading`](FtpSession::start_downloading) call builds a
/// fresh [`RunState`] and returns it by value, so repeated runs never see
/// each other's counters or errors.
pub struct FtpSession {
    transport: Option<Box<dyn RemoteFs>>,
    connect_info: Option<ConnectInfo>,
    connector: Arc<Connector>,
    parser: Arc<dyn ListingParser>,
    threads: usize,
    timeout: Duration,
    show_progress: bool,
}

impl FtpSession {
    pub fn new(threads: usize, timeout: Duration) -> Self {
        FtpSession {
            transport: None,
            connect_info: None,
            connector: Arc::new(|info: &ConnectInfo| {
                Ok(Box::new(FtpClient::dial(info)?) as Box<dyn RemoteFs>)
            }),
            parser: Arc::new(UnixListingParser),
            threads: threads.max(1),
            timeout,
            show_progress: false,
        }
    }

    /// Substitutes the listing parser, e.g. for servers that do not emit
    /// Unix long-listing output.
    pub fn with_parser(mut self, parser: Arc<dyn ListingParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Substitutes how connections are dialed. The default connects a real
    /// [`FtpClient`].
    pub fn with_connector(mut self, connector: Arc<Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Dials and logs in; empty credentials mean anonymous login. Returns
    /// `false` with a logged error on any failure instead of propagating.
    pub fn open_connection(&mut self, address: &str, username: &str, password: &str) -> bool {
        self.close_connection();
        let info = ConnectInfo {
            address: address.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout: self.timeout,
        };
        match (self.connector)(&info) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.connect_info = Some(info);
                true
            }
            Err(e) => {
                error!("connection to {} failed: {}", address, e);
                false
            }
        }
    }

    /// Ends the session if one exists; safe to call repeatedly.
    pub fn close_connection(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.connect_info = None;
    }

    /// Mirrors `source` on the server into the local `target` directory and
    /// returns the run's counters and ordered error list. Without a prior
    /// successful [`open_connection`](FtpSession::open_connection) this logs
    /// an error and performs no work at all.
    pub fn start_downloading(
        &mut self,
        target: &Path,
        source: &str,
        mode: RecursionMode,
    ) -> RunState {
        let Some(transport) = self.transport.as_mut() else {
            error!("a connection to the FTP server must be established first");
            return RunState::default();
        };

        let source = RemotePath::parse(source);
        let mut state = RunState::default();
        let progress = self.show_progress.then(ProgressTracker::new);

        match self.connect_info.clone() {
            Some(info) if self.threads > 1 && mode.is_recursive() => run_parallel(
                transport.as_mut(),
                info,
                Arc::clone(&self.connector),
                Arc::clone(&self.parser),
                self.threads,
                progress.as_ref(),
                target,
                &source,
                &mut state,
            ),
            _ => Mirror::new(transport.as_mut(), self.parser.as_ref(), progress.as_ref(), &mut state)
                .run(target, &source, mode),
        }

        if let Some(progress) = &progress {
            progress.finish();
        }
        if state.files_downloaded == 0 {
            info!("nothing downloaded");
        } else {
            info!("{} files downloaded successfully", state.files_downloaded);
        }
        state
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        self.close_connection();
    }
}

/// Fans the first-level subdirectories out to a pool of workers, each on an
/// independent connection dialed through the session's connector. Workers
/// mirror their subtree into a private [`RunState`] and the coordinator
/// merges the results, so sibling order in the merged error list follows
/// completion order.
#[allow(clippy::too_many_arguments)]
fn run_parallel(
    transport: &mut dyn RemoteFs,
    info: ConnectInfo,
    connector: Arc<Connector>,
    parser: Arc<dyn ListingParser>,
    threads: usize,
    progress: Option<&ProgressTracker>,
    target: &Path,
    source: &RemotePath,
    state: &mut RunState,
) {
    // the root level runs on the session's own connection
    let subdirs = Mirror::new(transport, parser.as_ref(), progress, state).run_level(
        target,
        source,
        RecursionMode::Recursive,
    );
    if subdirs.is_empty() {
        return;
    }

    let pool = ThreadPool::new(threads.min(subdirs.len()));
    let (tx, rx) = unbounded::<RunState>();
    for name in subdirs {
        let info = info.clone();
        let connector = Arc::clone(&connector);
        let parser = Arc::clone(&parser);
        let progress = progress.cloned();
        let tx = tx.clone();
        let target = target.join(&name);
        let source = source.join(&name);
        pool.execute(move || {
            let mut state = RunState::default();
            match (connector)(&info) {
                Ok(mut client) => {
                    Mirror::new(client.as_mut(), parser.as_ref(), progress.as_ref(), &mut state)
                        .run(&target, &source, RecursionMode::Recursive);
                    client.close();
                }
                Err(cause) => state.record_dir_error(source.to_string(), cause),
            }
            let _ = tx.send(state);
        });
    }
    drop(tx);

    for worker_state in rx {
        state.merge(worker_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{EntryKind, RemoteEntry};
    use crate::mirror::testfs::{dir_line, file_line, FakeRemoteFs};
    use std::collections::BTreeSet;

    fn fake_session(remote: &FakeRemoteFs, threads: usize) -> FtpSession {
        let remote = remote.clone();
        let mut session = FtpSession::new(threads, Duration::from_secs(5)).with_connector(
            Arc::new(move |_info| Ok(Box::new(remote.clone()) as Box<dyn RemoteFs>)),
        );
        assert!(session.open_connection("fake.invalid", "", ""));
        session
    }

    #[test]
    fn start_downloading_without_a_connection_does_nothing() {
        let mut session = FtpSession::new(1, Duration::from_secs(5));
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");

        let state = session.start_downloading(&target, "/", RecursionMode::Recursive);

        assert_eq!(state.files_downloaded, 0);
        assert!(state.errors.is_empty());
        // not even the target directory was created
        assert!(!target.exists());
    }

    #[test]
    fn close_connection_is_idempotent() {
        let mut session = FtpSession::new(1, Duration::from_secs(5));
        session.close_connection();
        session.close_connection();
        assert!(!session.is_connected());
    }

    #[test]
    fn repeated_runs_start_from_a_clean_state() {
        let remote = FakeRemoteFs::new();
        remote.add_dir("/", &[&file_line("a.txt"), &file_line("b.txt")]);
        remote.add_file("/a.txt", b"a");
        remote.add_file("/b.txt", b"b");
        remote.break_file("/b.txt");

        let mut session = fake_session(&remote, 1);
        let dir = tempfile::tempdir().unwrap();

        let first = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);
        assert_eq!(first.files_downloaded, 1);
        assert_eq!(first.errors.len(), 1);

        // the source is fixed before the second run
        remote.fix_file("/b.txt");
        let second = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);
        assert_eq!(second.files_downloaded, 2);
        assert!(second.errors.is_empty());
    }

    #[test]
    fn run_reflects_the_whole_tree_through_the_session() {
        let remote = FakeRemoteFs::new();
        remote.add_dir("/", &[&file_line("root.txt"), &dir_line("nested")]);
        remote.add_file("/root.txt", b"r");
        remote.add_dir("/nested", &[&file_line("child.txt")]);
        remote.add_file("/nested/child.txt", b"c");

        let mut session = fake_session(&remote, 1);
        let dir = tempfile::tempdir().unwrap();

        let state = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);

        assert_eq!(state.files_downloaded, 2);
        assert!(dir.path().join("nested").join("child.txt").exists());
    }

    #[test]
    fn parallel_workers_merge_counts_and_errors() {
        let remote = FakeRemoteFs::new();
        remote.add_dir(
            "/",
            &[
                &file_line("root.txt"),
                &dir_line("alpha"),
                &dir_line("beta"),
                &dir_line("gamma"),
            ],
        );
        remote.add_file("/root.txt", b"r");
        remote.add_dir("/alpha", &[&file_line("a1.txt"), &file_line("a2.txt")]);
        remote.add_file("/alpha/a1.txt", b"a1");
        remote.add_file("/alpha/a2.txt", b"a2");
        remote.add_dir("/beta", &[&file_line("bad.bin"), &file_line("ok.bin")]);
        remote.add_file("/beta/bad.bin", b"x");
        remote.add_file("/beta/ok.bin", b"ok");
        remote.break_file("/beta/bad.bin");
        // "/gamma" has no listing registered, so its worker records one error

        let mut session = fake_session(&remote, 3);
        let dir = tempfile::tempdir().unwrap();

        let state = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);

        // sibling completion order is unspecified, so compare as a set
        assert_eq!(state.files_downloaded, 4);
        let failed: BTreeSet<&str> = state.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(failed, BTreeSet::from(["/beta/bad.bin", "/gamma"]));
        assert!(dir.path().join("alpha").join("a2.txt").exists());
        assert!(dir.path().join("beta").join("ok.bin").exists());
        assert!(!dir.path().join("beta").join("bad.bin").exists());
    }

    #[test]
    fn failing_worker_connections_surface_as_directory_errors() {
        let remote = FakeRemoteFs::new();
        remote.add_dir("/", &[&dir_line("sub")]);
        remote.add_dir("/sub", &[&file_line("never.txt")]);
        remote.add_file("/sub/never.txt", b"n");

        // the first dial (the session's own) succeeds, workers always fail
        let root = remote.clone();
        let dials = std::sync::atomic::AtomicUsize::new(0);
        let mut session = FtpSession::new(2, Duration::from_secs(5)).with_connector(Arc::new(
            move |_info| {
                if dials.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Ok(Box::new(root.clone()) as Box<dyn RemoteFs>)
                } else {
                    Err(TransferError::Network("connection refused".to_string()))
                }
            },
        ));
        assert!(session.open_connection("fake.invalid", "", ""));
        let dir = tempfile::tempdir().unwrap();

        let state = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);

        assert_eq!(state.files_downloaded, 0);
        assert_eq!(state.errors.len(), 1);
        assert_eq!(state.errors[0].path, "/sub");
        assert!(state.errors[0].cause.is_transient());
    }

    #[test]
    fn a_substituted_parser_drives_classification() {
        // terse "F name" / "D name" listing format
        struct TerseParser;
        impl ListingParser for TerseParser {
            fn parse_line(&self, line: &str) -> Option<RemoteEntry> {
                let (kind, name) = line.split_once(' ')?;
                let kind = match kind {
                    "F" => EntryKind::File,
                    "D" => EntryKind::Directory,
                    _ => return None,
                };
                Some(RemoteEntry {
                    name: name.to_string(),
                    kind,
                })
            }
        }

        let remote = FakeRemoteFs::new();
        remote.add_dir("/", &["F plain.txt", "D inner", "garbage"]);
        remote.add_file("/plain.txt", b"p");
        remote.add_dir("/inner", &["F leaf.txt"]);
        remote.add_file("/inner/leaf.txt", b"l");

        let mut session = fake_session(&remote, 1).with_parser(Arc::new(TerseParser));
        let dir = tempfile::tempdir().unwrap();

        let state = session.start_downloading(dir.path(), "/", RecursionMode::Recursive);

        assert_eq!(state.files_downloaded, 2);
        assert!(state.errors.is_empty());
        assert!(dir.path().join("inner").join("leaf.txt").exists());
    }
}
