//! Echo Jr - remember a repository file and cache its contents
//!
//! Drives one brain session from the command line: sets the context, sends
//! the requested signals, and prints the cached file once the fetch settles.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use echojr::brain::{ContextCache, FetchOutcome};
use echojr::cli::{Cli, StartupConfig};
use echojr::github::HttpTransport;
use echojr::signal::{self, Signal};
use echojr::storage::Storage;

/// Installs the tracing subscriber; logs go to stderr so stdout carries only file contents
fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Prints the current context when no file is selected on the command line
fn print_context(brain: &ContextCache) {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!("owner:         {}", show(brain.owner()));
    println!("repo:          {}", show(brain.repo()));
    println!("selected file: {}", show(brain.selected_file()));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(2);
        }
    };

    let storage = match &config.storage_dir {
        Some(dir) => Some(Storage::with_dir(dir.clone())),
        None => Storage::new(),
    };
    let brain = ContextCache::new(config.brain.clone(), Arc::new(HttpTransport::new()), storage);

    if let Some((owner, repo)) = &config.context {
        brain.set_context(owner.as_str(), repo.as_str());
    }

    if let Some(action) = config.action {
        brain.dispatch(Signal::Action(action));
    }

    let Some(file) = config.select else {
        print_context(&brain);
        return Ok(());
    };

    let mut cached = brain.subscribe();
    let fetch = brain.on_file_selected(file);

    match tokio::time::timeout(config.wait, fetch).await {
        Ok(Ok(FetchOutcome::Cached(_))) => {
            if let Some(signal) = signal::try_recv(&mut cached) {
                eprintln!(
                    "{} {{ file: {}, size: {} }}",
                    signal::FILE_CACHED,
                    signal.file,
                    signal.size
                );
            }
            if let Some(content) = brain.read_cached_file() {
                print!("{}", content);
            }
            Ok(())
        }
        Ok(Ok(FetchOutcome::Skipped(err))) | Ok(Ok(FetchOutcome::Failed(err))) => {
            Err(format!("file was not cached: {}", err).into())
        }
        Ok(Err(join_err)) => Err(join_err.into()),
        Err(_) => Err(format!("fetch did not settle within {:?}", config.wait).into()),
    }
}
