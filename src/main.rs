use std::sync::Arc;

use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_contact_api::backup::BackupRecorder;
use clinic_contact_api::config::Config;
use clinic_contact_api::crm::GhlClient;
use clinic_contact_api::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the outbound clients,
/// and starts the Axum server with rate limiting, body limits, CORS, and
/// request tracing.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_contact_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize outbound clients
    let crm = GhlClient::new(config.ghl_base_url.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize GHL client: {}", e))?;
    tracing::info!("✓ GHL client initialized: {}", config.ghl_base_url);

    let backup = BackupRecorder::new(config.sheets_webhook_url.clone());

    let port = config.port;
    let app_state = Arc::new(AppState {
        config,
        crm,
        backup,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = handlers::contact_routes().layer(
        ServiceBuilder::new()
            // Contact form payloads are tiny; 64KB is generous
            .layer(RequestBodyLimitLayer::new(64 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting for platform probes
    let app = axum::Router::new()
        .route("/health", axum::routing::get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
