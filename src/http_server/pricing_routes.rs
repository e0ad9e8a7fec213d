//! Admin pricing routes: zone prices and daily specials.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::auth::Permission;
use crate::pricing::{DailySpecial, NewDailySpecial, ZonePrice};

use super::error::ApiError;
use super::extract::require_permission;
use super::state::AppState;

pub fn pricing_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/zone-prices", post(upsert_zone_price_handler))
        .route("/zone-prices/:variant_id", get(list_zone_prices_handler))
        .route("/specials", get(list_specials_handler).post(create_special_handler))
        .route("/specials/:id", delete(delete_special_handler))
        .route("/specials/:id/active", patch(set_special_active_handler))
        .with_state(state)
}

async fn upsert_zone_price_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(price): Json<ZonePrice>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    state.pricing.upsert_zone_price(price)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_zone_prices_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(variant_id): Path<i64>,
) -> Result<Json<Vec<ZonePrice>>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.pricing.list_zone_prices(variant_id)?))
}

async fn list_specials_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DailySpecial>>, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    Ok(Json(state.pricing.list_specials()?))
}

async fn create_special_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewDailySpecial>,
) -> Result<(StatusCode, Json<DailySpecial>), ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    let special = state.pricing.create_special(new)?;
    Ok((StatusCode::CREATED, Json(special)))
}

#[derive(Debug, serde::Deserialize)]
struct SetActive {
    active: bool,
}

async fn set_special_active_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<SetActive>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    state.pricing.set_special_active(id, body.active)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_special_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::PromotionsEdit)?;
    state.pricing.delete_special(id)?;
    Ok(StatusCode::NO_CONTENT)
}
