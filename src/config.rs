// Configuration management
use crate::cli::Cli;
use anyhow::Result;
use dialoguer::Password;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub threads: usize,
    pub timeout: Duration,
    pub recursive: bool,
    pub verbose: bool,
    pub source: String,
    pub target: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (username, password) = Self::resolve_credentials(cli)?;

        Ok(Config {
            host: cli.host.clone(),
            port: cli.port,
            username,
            password,
            threads: cli.threads.max(1),
            timeout: Duration::from_secs(cli.timeout),
            recursive: cli.recursive,
            verbose: cli.verbose,
            source: cli.source.clone(),
            target: cli.target.clone(),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve_credentials(cli: &Cli) -> Result<(String, String)> {
        match (&cli.username, &cli.password) {
            // no username means anonymous login
            (None, _) => Ok((String::new(), String::new())),
            (Some(user), Some(pass)) => Ok((user.clone(), pass.clone())),
            (Some(user), None) => {
                let password = Password::new()
                    .with_prompt(format!("Enter password for {}@{}", user, cli.host))
                    .interact()?;
                Ok((user.clone(), password))
            }
        }
    }
}
