// Social Feed Server

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use social_feed::{app_state::AppState, config::Config, routes::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,social_feed=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    if config.uses_development_secret() {
        warn!("SECRET_KEY is not set; using the development signing key");
    }
    if config.google.client_id.is_none() {
        info!("GOOGLE_CLIENT_ID is not set; Google sign-in is disabled");
    }

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let app = create_router(app_state);

    // Start server
    let addr = config.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Social feed server listening on http://{}", addr);
    info!("  POST /graphql  - GraphQL endpoint");
    info!("  GET  /graphql  - GraphiQL playground");
    info!("  GET  /health   - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
