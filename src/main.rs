use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use ftp_mirror::{cli::Cli, config::Config, run_mirror};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let config = Config::from_cli(&cli)?;
    println!(
        "Mirroring {} from {} into {}",
        config.source,
        config.address(),
        config.target.display()
    );

    if let Err(e) = run_mirror(config) {
        eprintln!("\nMirror failed: {}\n", e);
        std::process::exit(1);
    }

    Ok(())
}
