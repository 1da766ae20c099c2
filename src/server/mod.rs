pub mod handlers;
pub mod types;

use crate::{
    Result,
    analysis::Analyzer,
    config::Config,
    model::{create_model_client, resolve_model},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: handlers::AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Initialize model client and pick the model once for the process lifetime
    let client = create_model_client(&config.model);
    let model = resolve_model(client.as_ref(), &config.model).await;

    info!("Using model {} via {:?} transport", model, config.model.transport);

    let analyzer = Analyzer::new(
        client,
        model,
        Duration::from_secs(config.model.timeout_secs),
    );

    let app_state = handlers::AppState {
        analyzer: Arc::new(analyzer),
    };

    let app = router(app_state, config.server.max_upload_bytes);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
