use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("FTP protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    LocalIo(io::Error),
}

impl TransferError {
    /// Transient failures may succeed on retry; permission and protocol
    /// failures will not.
    pub fn is_transient(&self) -> bool {
        match self {
            TransferError::Network(_) => true,
            TransferError::LocalIo(e) => e.kind() == io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => TransferError::PermissionDenied(error.to_string()),
            io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe => TransferError::Network(error.to_string()),
            _ => TransferError::LocalIo(error),
        }
    }
}

impl From<suppaftp::FtpError> for TransferError {
    fn from(error: suppaftp::FtpError) -> Self {
        match error {
            suppaftp::FtpError::ConnectionError(e) => TransferError::Network(e.to_string()),
            other => TransferError::Protocol(other.to_string()),
        }
    }
}

/// Whether a failure hit a single file or a whole directory level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    File,
    Directory,
}

/// One failed download operation, kept for the caller's inspection.
#[derive(Debug)]
pub struct DownloadError {
    pub path: String,
    pub scope: FailureScope,
    pub cause: TransferError,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.path, self.cause)
    }
}
