//! Device routes: FCM token registration for push notifications.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::notifications::{device, RegisterDevice};

use super::error::ApiError;
use super::extract::require_auth;
use super::state::AppState;

pub fn device_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(register_handler).delete(unregister_handler))
        .with_state(state)
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterDevice>,
) -> Result<StatusCode, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    state.db.with_tx(|tx| {
        device::register(tx, ctx.user_id, &request.fcm_token, request.platform)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct UnregisterRequest {
    fcm_token: String,
}

async fn unregister_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<UnregisterRequest>,
) -> Result<StatusCode, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    state
        .db
        .with_tx(|tx| device::unregister(tx, ctx.user_id, &request.fcm_token))?;
    Ok(StatusCode::NO_CONTENT)
}
