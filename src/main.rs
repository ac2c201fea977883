//! GPT Image Editor - interactive image editing over Azure `OpenAI`
//!
//! Upload a picture, describe a change, get a revised image back. Each
//! browser session keeps its own conversation so follow-up requests build
//! on earlier ones.

mod api;
mod config;
mod images;
mod llm;
mod session;

use api::{create_router, AppState};
use config::EditorConfig;
use llm::{AzureResponsesService, ImageEditService, LoggingService};
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpt_image_editor=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration; nothing starts without the Azure settings
    let config = match EditorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let azure = AzureResponsesService::new(&config.azure, config.request_timeout)?;
    let service: Arc<dyn ImageEditService> = Arc::new(LoggingService::new(Arc::new(azure)));
    tracing::info!(
        model = %service.model_id(),
        image_deployment = %config.azure.image_deployment,
        api_version = %config.azure.api_version,
        "Image service initialized"
    );

    let sessions = Arc::new(SessionStore::new());
    sessions.clone().spawn_pruner(config.session_ttl);

    let state = AppState::new(sessions, service);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true).deflate(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Image editor listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
