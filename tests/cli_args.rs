//! Integration tests for CLI argument handling
//!
//! Runs the binary only with arguments that exit before the server starts.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pokedex-api"))
        .args(args)
        .output()
        .expect("Failed to execute pokedex-api")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pokedex-api"), "Help should mention pokedex-api");
    assert!(stdout.contains("--port"), "Help should mention --port");
    assert!(stdout.contains("POKEDEX_CACHE_TTL_HOURS"), "Help should list env vars");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_non_numeric_option_prints_error_and_exits() {
    let output = run_cli(&["--fetch-concurrency", "lots"]);
    assert!(!output.status.success(), "Expected a non-numeric value to fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid") || stderr.contains("error"),
        "Should print an error about the value: {}",
        stderr
    );
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = run_cli(&["--no-such-flag"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use std::path::PathBuf;

    use clap::Parser;
    use pokedex_api::cli::{Cli, Settings};

    #[test]
    fn test_cli_negative_values_are_accepted_then_clamped() {
        let cli = Cli::parse_from(["pokedex-api", "--fetch-concurrency", "-1", "--list-limit", "-50"]);
        assert_eq!(cli.fetch_concurrency, -1);

        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.fetch_concurrency, 5);
        assert_eq!(settings.list_limit, 1);
    }

    #[test]
    fn test_cli_large_list_limit_is_clamped() {
        let cli = Cli::parse_from(["pokedex-api", "--list-limit", "5000000"]);
        assert_eq!(Settings::from_cli(&cli).list_limit, 100_000);
    }

    #[test]
    fn test_cli_cache_dir_override() {
        let cli = Cli::parse_from(["pokedex-api", "--cache-dir", "./snapshots"]);
        assert_eq!(Settings::from_cli(&cli).cache_dir, PathBuf::from("./snapshots"));
    }

    #[test]
    fn test_cli_rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["pokedex-api", "--port", "70000"]).is_err());
    }
}
