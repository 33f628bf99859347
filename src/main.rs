mod api;
mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::{Context, Result};

use services::generator::generate_building;
use services::{AiClient, BuildingStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting Keltech progress service"
    );

    // Every start begins from a freshly generated building
    let building = generate_building(&settings.default_building, &mut rand::thread_rng())
        .context("Invalid default building configuration")?;
    tracing::info!(
        name = %building.name,
        floors = building.total_floors,
        units = building.units().count(),
        "Building generated"
    );
    let store = BuildingStore::new(building);

    // Create model client
    let ai_client = AiClient::new(
        &settings.gemini_base_url,
        &settings.gemini_model,
        settings.gemini_api_key.clone(),
        settings.ai_timeout_seconds,
    )?;
    if !ai_client.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set - site updates will fall back to manual entry");
    }

    // Create application state
    let state = app::AppState::new(settings.clone(), store, ai_client);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
