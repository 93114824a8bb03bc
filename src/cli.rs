// Command-line argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ftp-mirror")]
#[command(about = "A recursive FTP mirroring tool")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// FTP server hostname or IP address
    #[arg(short = 'H', long)]
    pub host: String,

    /// FTP server port
    #[arg(short, long, default_value = "21")]
    pub port: u16,

    /// FTP username (anonymous login when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// FTP password (prompted for when a username is given without one)
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Number of parallel worker connections
    #[arg(short, long, default_value = "1")]
    pub threads: usize,

    /// Network timeout in seconds for connect, listing and transfers
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Recursively download subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Remote directory to mirror
    pub source: String,

    /// Local destination directory
    pub target: PathBuf,
}
