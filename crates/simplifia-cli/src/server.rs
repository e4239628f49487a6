//! HTTP server — `POST /api/simplify` behind a permissive CORS layer.
//!
//! Startup sequence:
//! 1. Build one adapter per provider from the loaded config
//! 2. Build the axum router around the shared dispatcher
//! 3. Bind `host:port` and serve until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use simplifia_core::config::Config;
use simplifia_core::types::{ErrorBody, SimplifyRequest, SimplifyResponse};
use simplifia_core::PromptTable;
use simplifia_providers::{DispatchError, Dispatcher, ProviderKind};

// ─────────────────────────────────────────────
// State
// ─────────────────────────────────────────────

/// Shared state injected into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

pub type SharedState = Arc<AppState>;

// ─────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────

/// Build the full axum router.
///
/// CORS allows every origin, method and header, which suits a development
/// setup where the frontend runs on another port.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/simplify", post(simplify))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn simplify(
    State(state): State<SharedState>,
    Json(request): Json<SimplifyRequest>,
) -> Result<Json<SimplifyResponse>, ApiError> {
    let response = state.dispatcher.simplify(&request).await?;
    Ok(Json(response))
}

/// Hard failure rendered as `{"detail": "..."}` with the matching status.
#[derive(Debug)]
pub struct ApiError(DispatchError);

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

/// Run the server until Ctrl+C.
pub async fn run(config: Config) -> Result<()> {
    let dispatcher = Dispatcher::from_config(PromptTable::builtin(), &config.providers)
        .context("failed to build provider adapters")?;

    for kind in ProviderKind::ALL {
        let configured = dispatcher
            .adapter(kind)
            .map(|a| a.is_configured())
            .unwrap_or(false);
        if !configured {
            warn!(
                provider = kind.spec().display_name,
                env = kind.spec().env_key,
                "No API key configured; requests will get a missing-key message"
            );
        }
    }

    let app = build_router(AppState::new(dispatcher));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
