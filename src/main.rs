// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::live_service::LiveDashboardService;
use crate::application::region_service::RegionService;
use crate::application::seed_repository::SeedRepository;
use crate::infrastructure::backend_repository::BackendSeedRepository;
use crate::infrastructure::config::{load_app_config, SeedSource};
use crate::infrastructure::fixture_repository::FixtureRepository;
use crate::infrastructure::prediction_client::PredictionClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, list_regions, nearest_region, stream_region};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create repository (infrastructure layer)
    let fixtures = FixtureRepository::load(&config.seeds.fixtures_path)?;
    let repository: Arc<dyn SeedRepository> = match config.seeds.source {
        SeedSource::Fixtures => Arc::new(fixtures),
        SeedSource::Backend => Arc::new(BackendSeedRepository::new(
            PredictionClient::new(config.seeds.backend_url.clone()),
            fixtures.counties().to_vec(),
        )),
    };
    tracing::info!("Seeding live sessions from {:?}", config.seeds.source);

    // Create services (application layer)
    let region_service = RegionService::new(repository.clone());
    let live_service = LiveDashboardService::new(repository);

    // Create application state
    let state = Arc::new(AppState {
        region_service,
        live_service,
        default_crop: config.seeds.default_crop.clone(),
    });

    // Build router (presentation layer)
    // Compression is done per response/chunk, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/regions", get(list_regions))
        .route("/regions/nearest", get(nearest_region))
        .route("/regions/:fips/live", get(stream_region))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting cropwatch-live service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
