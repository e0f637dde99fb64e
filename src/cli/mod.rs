//! CLI module for iplookup
//!
//! This module handles command line argument parsing and dispatches to the
//! HTTP server or to one-shot queries.

pub mod formatter;

use crate::api;
use crate::config::AppConfig;
use crate::database::Registry;
use crate::error::{LookupError, Result};
use crate::resolve::ResolutionDispatcher;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "iplookup")]
#[command(version, about = "IP geolocation lookup over ip2region, IP2Location, MaxMind and SQLite databases")]
#[command(long_about = "iplookup resolves IP addresses to locations.\n\n\
    It runs as an HTTP service or answers one-shot queries from the command line.\n\n\
    Examples:\n  \
    $ iplookup serve\n  \
    $ iplookup -c config/config.yml serve --port 9000\n  \
    $ iplookup query 8.8.8.8 2001:4860:4860::8888\n  \
    $ cat addresses.txt | iplookup query --json")]
pub struct Cli {
    /// Configuration file (default: config/config.yml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Listen port, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve addresses and print the result
    Query {
        /// Print the JSON response envelope, one per line
        #[arg(short, long)]
        json: bool,

        /// Addresses to resolve (read from stdin if none are given)
        #[arg(value_name = "ADDR")]
        addresses: Vec<String>,
    },
}

impl Cli {
    pub async fn run(&self, mut config: AppConfig) -> Result<ExitCode> {
        match &self.command {
            Command::Serve { port } => {
                if let Some(port) = port {
                    config.server.port = *port;
                    config.validate()?;
                }
                let dispatcher = Arc::new(build_dispatcher(&config)?);
                api::serve(&config, dispatcher).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Query { json, addresses } => {
                let addresses = if addresses.is_empty() {
                    read_stdin_addresses()?
                } else {
                    addresses.clone()
                };
                let dispatcher = build_dispatcher(&config)?;
                process_queries(&dispatcher, &addresses, *json)
            }
        }
    }
}

/// Open the configured stores and wrap them in a dispatcher
pub fn build_dispatcher(config: &AppConfig) -> Result<ResolutionDispatcher> {
    let registry = Registry::from_config(&config.database)?;
    Ok(ResolutionDispatcher::new(registry))
}

/// Non-empty stdin lines; refuses to wait on an interactive terminal
fn read_stdin_addresses() -> Result<Vec<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Err(LookupError::Other(
            "no addresses given; pass them as arguments or pipe them on stdin".to_string(),
        ));
    }

    let mut addresses = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            addresses.push(trimmed.to_string());
        }
    }
    Ok(addresses)
}

fn process_queries(dispatcher: &ResolutionDispatcher, addresses: &[String], json: bool) -> Result<ExitCode> {
    let use_color = cfg!(feature = "colored-output") && atty::is(atty::Stream::Stdout);
    let mut failed = 0usize;

    for address in addresses {
        let result = dispatcher.resolve(address);
        if !result.is_success() {
            failed += 1;
        }

        if json {
            println!("{}", formatter::format_json(&result)?);
        } else {
            println!("{}", formatter::format_text(address, &result, use_color));
        }
    }

    if failed > 0 {
        log::debug!("{} of {} addresses failed", failed, addresses.len());
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["iplookup", "-c", "/etc/iplookup.yml", "serve", "--port", "9000"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/iplookup.yml")));
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from(["iplookup", "query", "--json", "8.8.8.8", "::1", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Query { json, addresses } => {
                assert!(json);
                assert_eq!(addresses, vec!["8.8.8.8", "::1"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["iplookup"]).is_err());
    }

    #[test]
    fn test_process_queries_exit_code() {
        let mut config = AppConfig::default();
        config.database.ipv4 = Some(crate::config::BackendConfig::stub(None));
        config.database.ipv6 = None;
        let dispatcher = build_dispatcher(&config).unwrap();

        let ok = process_queries(&dispatcher, &["8.8.8.8".to_string()], false).unwrap();
        assert_eq!(ok, ExitCode::SUCCESS);

        let mixed = process_queries(&dispatcher, &["8.8.8.8".to_string(), "2001:db8::1".to_string()], true).unwrap();
        assert_eq!(mixed, ExitCode::FAILURE);
    }
}
