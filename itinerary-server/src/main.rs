use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use itinerary_server::cache::PlanCache;
use itinerary_server::config::ServerConfig;
use itinerary_server::network::load_network;
use itinerary_server::planner::{RequestValidator, SearchConfig};
use itinerary_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load the flight network (fail fast if the data is bad)
    let network = match load_network(&config.airports_path, &config.flight_paths) {
        Ok(network) => network,
        Err(e) => {
            error!("failed to load flight network: {e}");
            return ExitCode::FAILURE;
        }
    };

    let validator = RequestValidator::new(config.allowed_origins.iter().copied());
    for origin in validator.allowed_origins() {
        if !network.contains(origin) {
            error!(%origin, "allowed origin is not in the flight network");
            return ExitCode::FAILURE;
        }
    }

    let cache = PlanCache::new(&config.cache);
    let state = AppState::new(network, validator, SearchConfig::default(), cache);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Itinerary planner listening on http://{}", config.bind);
    info!("API Endpoints:");
    info!("  GET  /              - Status message");
    info!("  GET  /health        - Health check");
    info!("  GET  /api/airports  - List airports");
    info!("  POST /itinerary     - Plan an itinerary");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
