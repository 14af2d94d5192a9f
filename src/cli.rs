//! Command-line interface parsing for the Echo Jr driver
//!
//! Parses flags with clap and turns them into a `StartupConfig` describing the
//! context to set and the signals to send once the session is up.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use thiserror::Error;

use crate::brain::BrainConfig;
use crate::github::DEFAULT_API_BASE;

/// Default time to wait for a fetch to settle
const DEFAULT_WAIT_SECS: u64 = 30;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Only one of --owner/--repo was given
    #[error("--owner and --repo must be given together")]
    IncompleteContext,

    /// The --action payload is not valid JSON
    #[error("Invalid action payload '{0}': expected JSON")]
    InvalidAction(String),
}

/// Echo Jr - remember a repository file and cache its contents
#[derive(Parser, Debug)]
#[command(name = "echojr")]
#[command(about = "Track a selected repository file and cache its contents from GitHub")]
#[command(version)]
pub struct Cli {
    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Select a file path and fetch it
    #[arg(long, value_name = "PATH")]
    pub select: Option<String>,

    /// Send an action payload (JSON) before selecting
    #[arg(long, value_name = "JSON")]
    pub action: Option<String>,

    /// Base URL of the contents API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory for persisted state (defaults to the XDG data dir)
    #[arg(long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Seconds to wait for the fetch to settle
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WAIT_SECS)]
    pub wait_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Configuration derived from CLI arguments for session startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub brain: BrainConfig,
    pub storage_dir: Option<PathBuf>,
    /// Owner and repo to set before any signal is sent
    pub context: Option<(String, String)>,
    pub select: Option<String>,
    pub action: Option<Value>,
    pub wait: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            brain: BrainConfig::default(),
            storage_dir: None,
            context: None,
            select: None,
            action: None,
            wait: Duration::from_secs(DEFAULT_WAIT_SECS),
        }
    }
}

/// Parses an --action argument into a JSON value
pub fn parse_action_arg(s: &str) -> Result<Value, CliError> {
    serde_json::from_str(s).map_err(|_| CliError::InvalidAction(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Err(CliError::IncompleteContext)` if only one of owner/repo is set
    /// * `Err(CliError::InvalidAction)` if the action is not JSON
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let context = match (&cli.owner, &cli.repo) {
            (Some(owner), Some(repo)) => Some((owner.clone(), repo.clone())),
            (None, None) => None,
            _ => return Err(CliError::IncompleteContext),
        };

        let action = cli.action.as_deref().map(parse_action_arg).transpose()?;

        Ok(StartupConfig {
            brain: BrainConfig {
                api_base: cli.api_base.clone(),
                ..BrainConfig::default()
            },
            storage_dir: cli.storage_dir.clone(),
            context,
            select: cli.select.clone(),
            action,
            wait: Duration::from_secs(cli.wait_secs),
        })
    }
}
