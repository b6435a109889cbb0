use portfolio_api::server::{self, ServerState};
use portfolio_common::mock;
use portfolio_store::{
    client::{ClientSettings, Latencies},
    pager::{DEFAULT_PAGE_LATENCY, DEFAULT_PAGE_SIZE},
    persist::{FileStore, KeyValueStore, MemoryStore, PersistError},
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use time::UtcDateTime;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error opening persisted state: {0}")]
    Persist(#[from] PersistError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_page_latency_ms() -> u64 {
    u64::try_from(DEFAULT_PAGE_LATENCY.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    data_dir: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default = "default_page_latency_ms")]
    page_latency_ms: u64,
    mock_seed: Option<u64>,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portfolio_api=debug,\
                portfolio_store=debug,\
                portfolio_common=debug,\
                tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

fn build_state(env: &Env) -> Result<ServerState, InitError> {
    let storage: Arc<dyn KeyValueStore> = match &env.data_dir {
        Some(dir) => Arc::new(FileStore::open(dir.clone())?),
        None => Arc::new(MemoryStore::new()),
    };

    let catalog = mock::catalog();
    let now = UtcDateTime::now();
    let posts = match env.mock_seed {
        Some(seed) => mock::generate_posts(&catalog, &mut StdRng::seed_from_u64(seed), now),
        None => mock::generate_posts(&catalog, &mut rand::rng(), now),
    };

    let settings = ClientSettings {
        page_size: env.page_size,
        latencies: Latencies {
            page: Duration::from_millis(env.page_latency_ms),
            ..Latencies::default()
        },
    };

    ServerState::new(catalog, posts, storage, settings).map_err(InitError::from)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "Could not listen for shutdown signal");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;
    let state = build_state(&env)?;
    let client = Arc::clone(&state.client);

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().layer(tracing_layer).with_state(state);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe)?;

    client.shutdown();
    Ok(())
}
