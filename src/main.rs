//! Pokedex API - Serve a cached, queryable copy of the PokeAPI catalog
//!
//! An HTTP service that builds the full Pokemon catalog from PokeAPI once,
//! keeps it in memory and on disk, and answers filter/sort/page queries
//! over it as JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::ServiceExt;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pokedex_api::api::{self, AppState};
use pokedex_api::builder::DatasetBuilder;
use pokedex_api::cache::SnapshotStore;
use pokedex_api::cli::{Cli, Settings};
use pokedex_api::data::PokeApiClient;
use pokedex_api::store::DatasetStore;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "pokedex_api=info,tower_http=info";

/// Sets up the global tracing subscriber
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads the dataset in the background so the first request finds it ready
fn spawn_warm_up(store: DatasetStore) {
    tokio::spawn(async move {
        match store.get_or_build().await {
            Ok(dataset) => info!(total = dataset.len(), source = dataset.source(), "initial dataset loaded"),
            Err(err) => error!(error = %err, "failed to load initial dataset"),
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments before anything else so --help stays quiet
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::from_cli(&cli);
    info!(
        port = settings.port,
        cache_dir = %settings.cache_dir.display(),
        fetch_concurrency = settings.fetch_concurrency,
        cache_ttl_hours = settings.cache_ttl_hours,
        "starting pokedex api"
    );

    let source = Arc::new(PokeApiClient::with_base_url(
        settings.api_base_url.clone(),
        settings.list_limit,
    ));
    let cache = SnapshotStore::with_dir(settings.cache_dir.clone());
    let builder = DatasetBuilder::new(source, Some(cache), &settings);
    let store = DatasetStore::new(builder);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "pokedex api listening");

    spawn_warm_up(store.clone());

    let app = api::app(AppState::new(store));
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
