//! Server binary for the Sovereign engine.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sovereign-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the document store (in-memory or `PostgreSQL` + migrations)
//! 4. Open the history sink (in-memory or Dragonfly)
//! 5. Seed any map cells that do not exist yet
//! 6. Serve the HTTP API until terminated

mod error;

use std::path::Path;
use std::sync::Arc;

use sovereign_api::{AppState, ServerConfig, start_server};
use sovereign_core::{
    DocumentStore, Engine, HistorySink, LoggingConfig, MemoryHistory, MemoryStore, SeededRandom,
    SovereignConfig, StoreBackend,
};
use sovereign_db::{DragonflyHistory, PgDocumentStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "sovereign-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, a backend connection, world seeding
/// or the HTTP server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SovereignConfig::load_or_default(Path::new(CONFIG_PATH))?;
    init_logging(&config.logging);

    info!(
        store = ?config.infrastructure.store,
        world_size = config.world.size,
        seed = ?config.world.seed,
        api_port = config.infrastructure.api_port,
        "sovereign-server starting"
    );

    match config.infrastructure.store {
        StoreBackend::Memory => with_history(&config, MemoryStore::new()).await?,
        StoreBackend::Postgres => {
            let store = PgDocumentStore::connect_url(&config.infrastructure.postgres_url).await?;
            store.run_migrations().await?;
            with_history(&config, store).await?;
        }
    }

    info!("sovereign-server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Pick the history sink for an already opened store.
async fn with_history<S>(config: &SovereignConfig, store: S) -> Result<(), StartupError>
where
    S: DocumentStore + 'static,
{
    let url = &config.infrastructure.dragonfly_url;
    if url.is_empty() {
        info!("history kept in memory");
        serve(config, store, MemoryHistory::new()).await
    } else {
        let history = DragonflyHistory::connect(url).await?;
        serve(config, store, history).await
    }
}

/// Build the engine, fill in the map, and run the API server.
async fn serve<S, H>(config: &SovereignConfig, store: S, history: H) -> Result<(), StartupError>
where
    S: DocumentStore + 'static,
    H: HistorySink + 'static,
{
    let rng = config
        .world
        .seed
        .map_or_else(SeededRandom::from_os, SeededRandom::from_seed);
    let engine = Engine::new(store, rng, history, config);

    let summary = engine.seed_world(None).await?;
    info!(
        created = summary.created,
        skipped = summary.skipped,
        land = summary.land,
        "World ready"
    );

    let server_config = ServerConfig {
        port: config.infrastructure.api_port,
        ..ServerConfig::default()
    };
    start_server(&server_config, Arc::new(AppState::new(engine))).await?;
    Ok(())
}
