// FTP module entry
pub mod client;
pub mod session;

pub use client::{ConnectInfo, FtpClient, RemoteFs};
pub use session::{Connector, FtpSession};
