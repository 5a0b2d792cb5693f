//! HTTP adapter.
//!
//! Exposes the batch validator over three routes:
//!
//! - `GET /` liveness message
//! - `POST /validate` multipart CSV upload, answered with the report envelope
//! - `GET /schema` the loaded schema document

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/", get(routes::root))
        .route("/validate", post(routes::validate_upload))
        .route("/schema", get(routes::get_schema))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads the schema and serves until the process is stopped.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let schema = crate::cli::load_schema(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    tracing::info!(address = %addr, schema = %config.schema_path.display(), "listening");

    axum::serve(listener, router(AppState::new(schema, config))).await?;
    Ok(())
}
