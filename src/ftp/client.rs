// FTP transport wrapper
use std::io::{self, Write};
use std::net::{Ipv6Addr, ToSocketAddrs};
use std::time::Duration;

use log::debug;
use suppaftp::types::FileType;
use suppaftp::FtpStream;

use crate::utils::error::TransferError;

/// The remote filesystem capability the mirroring engine needs. Implemented
/// by [`FtpClient`] and by an in-memory fake in tests.
pub trait RemoteFs: Send {
    /// Raw long-listing lines for the directory at `path`.
    fn list_dir(&mut self, path: &str) -> Result<Vec<String>, TransferError>;

    /// Streams the file at `path` into `out`, returning the byte count.
    fn retrieve(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, TransferError>;

    /// Ends the session. Best-effort; the default does nothing.
    fn close(&mut self) {}
}

/// Everything needed to (re)establish one server connection, cloned into
/// each worker so parallel branches dial independently.
#[derive(Debug, Clone)]
pub struct ConnectInfo {
    pub address: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl ConnectInfo {
    /// The address with the default FTP port appended when none was given.
    /// Bare IPv6 literals are bracketed so their colons are not mistaken
    /// for a port separator.
    pub fn address_with_port(&self) -> String {
        if self.address.parse::<Ipv6Addr>().is_ok() {
            return format!("[{}]:21", self.address);
        }
        if let Some(bracketed) = self.address.strip_prefix('[') {
            return if bracketed.contains("]:") {
                self.address.clone()
            } else {
                format!("{}:21", self.address)
            };
        }
        if self.address.contains(':') {
            self.address.clone()
        } else {
            format!("{}:21", self.address)
        }
    }

    /// Anonymous login when no credentials were supplied, like ftp(1).
    pub fn credentials(&self) -> (&str, &str) {
        if self.username.is_empty() && self.password.is_empty() {
            ("anonymous", "anonymous@")
        } else {
            (&self.username, &self.password)
        }
    }
}

pub struct FtpClient {
    stream: FtpStream,
}

impl FtpClient {
    /// Connects, logs in and switches the session to binary mode. The
    /// timeout bounds the TCP connect and every subsequent socket read and
    /// write, so a stalled server fails instead of hanging forever.
    pub fn dial(info: &ConnectInfo) -> Result<Self, TransferError> {
        let address = info.address_with_port();
        let addr = address
            .to_socket_addrs()
            .map_err(|e| TransferError::Network(format!("cannot resolve {}: {}", address, e)))?
            .next()
            .ok_or_else(|| TransferError::Network(format!("cannot resolve {}", address)))?;

        let mut stream = FtpStream::connect_timeout(addr, info.timeout)?;
        stream.get_ref().set_read_timeout(Some(info.timeout))?;
        stream.get_ref().set_write_timeout(Some(info.timeout))?;

        let (user, pass) = info.credentials();
        stream
            .login(user, pass)
            .map_err(|e| TransferError::AuthenticationFailed(e.to_string()))?;
        stream.transfer_type(FileType::Binary)?;

        Ok(FtpClient { stream })
    }
}

impl RemoteFs for FtpClient {
    fn list_dir(&mut self, path: &str) -> Result<Vec<String>, TransferError> {
        Ok(self.stream.list(Some(path))?)
    }

    fn retrieve(&mut self, path: &str, out: &mut dyn Write) -> Result<u64, TransferError> {
        let mut data = self.stream.retr_as_stream(path)?;
        let copied = io::copy(&mut data, out);
        // finalize even after a copy failure to keep the control
        // connection in a usable state
        let finalized = self.stream.finalize_retr_stream(data);
        let bytes = copied?;
        finalized?;
        Ok(bytes)
    }

    fn close(&mut self) {
        if let Err(e) = self.stream.quit() {
            debug!("QUIT failed: {}", e);
        }
    }
}
