//! Command-line and environment configuration for the Pokedex API
//!
//! This module parses startup options with clap. Every option can also be set
//! through an environment variable; numeric options are clamped into their
//! valid ranges when converted into [`Settings`].

use std::path::PathBuf;

use clap::Parser;

use crate::cache::SnapshotStore;
use crate::data::pokeapi::POKEAPI_BASE_URL;

/// Valid range for the detail fetch concurrency window
pub const FETCH_CONCURRENCY_RANGE: (i64, i64) = (5, 80);

/// Valid range for the cache TTL in hours
pub const CACHE_TTL_HOURS_RANGE: (i64, i64) = (1, 168);

/// Valid range for the catalog list limit
pub const LIST_LIMIT_RANGE: (i64, i64) = (1, 100_000);

/// Pokedex API - Serve a cached, queryable copy of the PokeAPI catalog
#[derive(Parser, Debug)]
#[command(name = "pokedex-api")]
#[command(about = "Cached, filterable JSON API over the PokeAPI catalog")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Number of catalog references requested from the list endpoint
    #[arg(long, env = "POKEAPI_LIST_LIMIT", default_value_t = 2000, allow_negative_numbers = true)]
    pub list_limit: i64,

    /// Detail requests issued concurrently per batch (clamped to 5-80)
    #[arg(long, env = "POKEDEX_FETCH_CONCURRENCY", default_value_t = 35, allow_negative_numbers = true)]
    pub fetch_concurrency: i64,

    /// Hours a cached snapshot stays fresh (clamped to 1-168)
    #[arg(long, env = "POKEDEX_CACHE_TTL_HOURS", default_value_t = 24, allow_negative_numbers = true)]
    pub cache_ttl_hours: i64,

    /// Directory for the dataset snapshot (defaults to the platform cache directory)
    #[arg(long, env = "POKEDEX_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the PokeAPI v2 endpoints
    #[arg(long, env = "POKEAPI_BASE_URL", default_value = POKEAPI_BASE_URL)]
    pub api_base_url: String,
}

/// Validated configuration derived from CLI arguments and environment
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub list_limit: u32,
    pub fetch_concurrency: usize,
    pub cache_ttl_hours: u32,
    pub cache_dir: PathBuf,
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3001,
            list_limit: 2000,
            fetch_concurrency: 35,
            cache_ttl_hours: 24,
            cache_dir: default_cache_dir(),
            api_base_url: POKEAPI_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Creates Settings from parsed CLI arguments, clamping numeric options
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            port: cli.port,
            list_limit: clamp_setting(cli.list_limit, LIST_LIMIT_RANGE) as u32,
            fetch_concurrency: clamp_setting(cli.fetch_concurrency, FETCH_CONCURRENCY_RANGE) as usize,
            cache_ttl_hours: clamp_setting(cli.cache_ttl_hours, CACHE_TTL_HOURS_RANGE) as u32,
            cache_dir: cli.cache_dir.clone().unwrap_or_else(default_cache_dir),
            api_base_url: cli.api_base_url.clone(),
        }
    }
}

/// Clamps a value into an inclusive `(min, max)` range
pub fn clamp_setting(value: i64, (min, max): (i64, i64)) -> i64 {
    value.clamp(min, max)
}

/// Platform cache directory, or `./.cache` when there is none
fn default_cache_dir() -> PathBuf {
    SnapshotStore::platform_dir().unwrap_or_else(|| PathBuf::from(".cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_setting() {
        assert_eq!(clamp_setting(35, FETCH_CONCURRENCY_RANGE), 35);
        assert_eq!(clamp_setting(1, FETCH_CONCURRENCY_RANGE), 5);
        assert_eq!(clamp_setting(500, FETCH_CONCURRENCY_RANGE), 80);
        assert_eq!(clamp_setting(0, CACHE_TTL_HOURS_RANGE), 1);
        assert_eq!(clamp_setting(-12, CACHE_TTL_HOURS_RANGE), 1);
        assert_eq!(clamp_setting(1000, CACHE_TTL_HOURS_RANGE), 168);
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.list_limit, 2000);
        assert_eq!(settings.fetch_concurrency, 35);
        assert_eq!(settings.cache_ttl_hours, 24);
        assert_eq!(settings.api_base_url, POKEAPI_BASE_URL);
    }

    #[test]
    fn test_cli_parse_explicit_flags() {
        let cli = Cli::parse_from([
            "pokedex-api",
            "--port",
            "8080",
            "--list-limit",
            "151",
            "--fetch-concurrency",
            "10",
            "--cache-ttl-hours",
            "6",
            "--cache-dir",
            "/tmp/pokedex",
            "--api-base-url",
            "http://localhost:9000/api/v2",
        ]);
        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.list_limit, 151);
        assert_eq!(settings.fetch_concurrency, 10);
        assert_eq!(settings.cache_ttl_hours, 6);
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/pokedex"));
        assert_eq!(settings.api_base_url, "http://localhost:9000/api/v2");
    }

    #[test]
    fn test_settings_from_cli_clamps_out_of_range_values() {
        let cli = Cli::parse_from([
            "pokedex-api",
            "--fetch-concurrency",
            "500",
            "--cache-ttl-hours",
            "-3",
            "--list-limit",
            "0",
        ]);
        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.fetch_concurrency, 80);
        assert_eq!(settings.cache_ttl_hours, 1);
        assert_eq!(settings.list_limit, 1);
    }

    #[test]
    fn test_cli_rejects_non_numeric_port() {
        let result = Cli::try_parse_from(["pokedex-api", "--port", "eighty"]);
        assert!(result.is_err());
    }
}
