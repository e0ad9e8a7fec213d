//! Admin promotion routes.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch};
use axum::Router;

use crate::auth::Permission;
use crate::promotions::{NewPromotion, Promotion};

use super::error::ApiError;
use super::extract::require_permission;
use super::state::AppState;

pub fn promotion_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/:id", get(get_handler).delete(delete_handler))
        .route("/:id/active", patch(set_active_handler))
        .with_state(state)
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    Ok(Json(state.promotions.list()?))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewPromotion>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    let promotion = state.promotions.create(new)?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Promotion>, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    Ok(Json(state.promotions.get(id)?))
}

#[derive(Debug, serde::Deserialize)]
struct SetActive {
    active: bool,
}

async fn set_active_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<SetActive>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    state.promotions.set_active(id, body.active)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    state.promotions.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
