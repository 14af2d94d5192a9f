//! Integration tests for CLI argument handling
//!
//! Runs the binary without touching the network: either no file is selected,
//! or the context is missing so the fetch is skipped.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_echojr"))
        .args(args)
        .output()
        .expect("Failed to execute echojr")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("echojr"), "Help should mention echojr");
    assert!(stdout.contains("--select"), "Help should mention --select flag");
}

#[test]
fn test_owner_without_repo_exits_with_error() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().to_str().unwrap();
    let output = run_cli(&["--storage-dir", dir, "--owner", "A"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--owner and --repo"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_action_exits_with_error() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().to_str().unwrap();
    let output = run_cli(&["--storage-dir", dir, "--action", "{oops"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid action"), "stderr: {}", stderr);
}

#[test]
fn test_no_selection_prints_context() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().to_str().unwrap();
    let output = run_cli(&["--storage-dir", dir, "--owner", "A", "--repo", "B"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("owner:         A"), "stdout: {}", stdout);
    assert!(stdout.contains("repo:          B"), "stdout: {}", stdout);
    assert!(stdout.contains("selected file: -"), "stdout: {}", stdout);
}

#[test]
fn test_selection_without_context_is_persisted_but_not_fetched() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().to_str().unwrap();

    let output = run_cli(&["--storage-dir", dir, "--select", "p/q.txt"]);
    assert!(!output.status.success(), "nothing should be cached");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing context"), "stderr: {}", stderr);
    assert!(storage.path().join("echojr-selected-file.json").exists());

    // A later run restores the persisted selection
    let output = run_cli(&["--storage-dir", dir]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("selected file: p/q.txt"), "stdout: {}", stdout);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use echojr::cli::{parse_action_arg, Cli, CliError, StartupConfig};

    #[test]
    fn test_cli_select_flag() {
        let cli = Cli::parse_from(["echojr", "--select", "src/main.rs"]);
        assert_eq!(cli.select.as_deref(), Some("src/main.rs"));
    }

    #[test]
    fn test_cli_debug_short_flag() {
        let cli = Cli::parse_from(["echojr", "-d"]);
        assert!(cli.debug);
    }

    #[test]
    fn test_parse_action_arg_invalid_returns_error() {
        assert!(matches!(
            parse_action_arg("{"),
            Err(CliError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_startup_config_from_cli_context_pair() {
        let cli = Cli::parse_from(["echojr", "--owner", "rust-lang", "--repo", "rust"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.context,
            Some(("rust-lang".to_string(), "rust".to_string()))
        );
        assert!(config.select.is_none());
    }
}
