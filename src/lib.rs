// Library entry, exports the crate modules
pub mod cli;
pub mod config;
pub mod ftp;
pub mod listing;
pub mod mirror;
pub mod threadpool;
pub mod utils;

use anyhow::{bail, Result};
use config::Config;
use ftp::FtpSession;
use mirror::RecursionMode;

pub fn run_mirror(config: Config) -> Result<()> {
    let mode = if config.recursive {
        RecursionMode::Recursive
    } else {
        RecursionMode::TopLevelOnly
    };

    let mut session =
        FtpSession::new(config.threads, config.timeout).show_progress(!config.verbose);

    if !session.open_connection(&config.address(), &config.username, &config.password) {
        bail!("connection to {} could not be established", config.address());
    }

    let state = session.start_downloading(&config.target, &config.source, mode);
    session.close_connection();

    if state.files_downloaded == 0 {
        println!("\nNothing downloaded!");
    } else {
        println!("\n{} files downloaded successfully!", state.files_downloaded);
    }
    if !state.errors.is_empty() {
        println!("{} error(s) found:", state.errors.len());
        for error in &state.errors {
            println!("  {}", error);
        }
    }

    Ok(())
}
