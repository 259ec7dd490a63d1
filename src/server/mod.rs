//! HTTP surface: `GET /` liveness and `GET /region/{id}`.

pub mod model;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::region::{LookupError, RegionLookup};
use model::{Base, RegionBody};

pub const LIVENESS_MESSAGE: &str = "Application is running";
const INVALID_ID: &str = "Invalid ID";

/// Shared state accessible from handlers.
#[derive(Clone)]
pub struct AppState {
    pub regions: Arc<dyn RegionLookup>,
}

/// Build the router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/region/{id}", get(region_by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `addr` until `shutdown` resolves.
///
/// # Errors
/// Returns the I/O error if binding or serving fails.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, port = local.port(), "Listening on port {}", local.port());
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Accepts decimal digits only, value at least 1.
#[must_use]
pub fn parse_positive_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

/// GET /
async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// GET /region/{id}
async fn region_by_id(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Some(id) = parse_positive_id(&raw) else {
        return (StatusCode::BAD_REQUEST, Json(Base::failure(INVALID_ID))).into_response();
    };

    match state.regions.get_by_id(id).await {
        Ok(region) => Json(RegionBody::from(region)).into_response(),
        Err(err) => {
            let status = match err {
                LookupError::NotFound(_) => StatusCode::NOT_FOUND,
                LookupError::Database(_) | LookupError::MalformedRow(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            tracing::warn!(id, error = %err, status = status.as_u16(), "region lookup failed");
            (status, Json(Base::failure(err.to_string()))).into_response()
        }
    }
}
