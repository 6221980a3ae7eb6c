mod configuration;
mod error;
mod routes;
mod state;

use configuration::Settings;
use genai_chat::{chat::Chat, guard::AccessGuard, providers::vertex::VertexProvider};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let chat_config = settings.chat.to_config();

    let guard = AccessGuard::new(settings.access.secret_key);
    if !guard.is_enabled() {
        tracing::warn!("No secret key configured, every request is accepted");
    }

    let provider_config = settings.provider.into_config();
    tracing::info!(
        model = %provider_config.model,
        location = %provider_config.location,
        "Using Vertex AI"
    );
    let provider = VertexProvider::new(provider_config)?;

    // Create app state
    let state = state::AppState::new(Chat::new(Box::new(provider), &chat_config), guard);

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
