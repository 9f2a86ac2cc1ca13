//! HTTP surface over the route database: the tracker page, the route list,
//! and marking routes complete.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::store::{RouteView, SqliteStore};

const INDEX_HTML: &str = include_str!("index.html");

/// Shared state for all handlers
pub struct AppState {
    pub store: Mutex<SqliteStore>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

/// Build the router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routes", get(list_routes))
        .route("/complete", post(mark_complete))
}

/// Serve the tracker until the process is stopped
pub async fn serve(db_path: &Path, addr: SocketAddr) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let app = build_router(Arc::new(AppState::new(store)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Route tracker listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// GET / — the tracker page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/routes — every route with its encounters.
async fn list_routes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RouteView>>, ApiError> {
    let routes = state.store.lock().list_routes()?;
    Ok(Json(routes))
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    route_id: i64,
}

/// POST /api/complete — `{"route_id": n}` marks a route complete.
async fn mark_complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteRequest>,
) -> Result<StatusCode, ApiError> {
    let found = state.store.lock().mark_route_complete(req.route_id)?;
    if found {
        info!("Route {} marked complete", req.route_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// Storage failure surfaced as a 500
struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
