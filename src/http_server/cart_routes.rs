//! Cart routes: anonymous or authenticated cart assembly plus the
//! totals preview used by checkout screens.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::cart::{AddLine, Cart, CartTotals, CartWithLines, NewCart, UpdateLine};

use super::error::ApiError;
use super::extract::optional_auth;
use super::state::AppState;

pub fn cart_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(create_cart_handler))
        .route("/:id", get(get_cart_handler))
        .route("/:id/lines", post(add_line_handler))
        .route(
            "/:id/lines/:line_id",
            axum::routing::patch(update_line_handler).delete(remove_line_handler),
        )
        .route("/:id/totals", get(totals_handler))
        .with_state(state)
}

async fn create_cart_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewCart>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    let user_id = optional_auth(&state, &headers)?.map(|ctx| ctx.user_id);
    let cart = state.carts.create(user_id, new)?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn get_cart_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartWithLines>, ApiError> {
    Ok(Json(state.carts.get(id)?))
}

async fn add_line_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(add): Json<AddLine>,
) -> Result<(StatusCode, Json<CartWithLines>), ApiError> {
    state.carts.add_line(id, add)?;
    Ok((StatusCode::CREATED, Json(state.carts.get(id)?)))
}

async fn update_line_handler(
    State(state): State<Arc<AppState>>,
    Path((id, line_id)): Path<(Uuid, i64)>,
    Json(update): Json<UpdateLine>,
) -> Result<Json<CartWithLines>, ApiError> {
    state.carts.set_line_quantity(id, line_id, update.quantity)?;
    Ok(Json(state.carts.get(id)?))
}

async fn remove_line_handler(
    State(state): State<Arc<AppState>>,
    Path((id, line_id)): Path<(Uuid, i64)>,
) -> Result<Json<CartWithLines>, ApiError> {
    state.carts.remove_line(id, line_id)?;
    Ok(Json(state.carts.get(id)?))
}

#[derive(Debug, Deserialize)]
struct TotalsQuery {
    #[serde(default)]
    redeem_points: i64,
}

async fn totals_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<TotalsQuery>,
) -> Result<Json<CartTotals>, ApiError> {
    let totals = state
        .orders
        .preview(id, query.redeem_points, chrono::Utc::now())?;
    Ok(Json(totals))
}
