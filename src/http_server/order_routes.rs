//! Customer order routes: checkout, own-order history and order detail.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;

use crate::auth::Permission;
use crate::notifications::OrderEvent;
use crate::orders::{CheckoutRequest, Order, OrderWithLines};

use super::error::ApiError;
use super::extract::{optional_auth, require_auth};
use super::state::AppState;

pub fn order_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(checkout_handler))
        .route("/mine", get(my_orders_handler))
        .route("/:id", get(get_order_handler))
        .with_state(state)
}

async fn checkout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderWithLines>), ApiError> {
    // The cart, not the header, owns the order; a token only has to be
    // valid if present.
    optional_auth(&state, &headers)?;

    let placed = state.orders.checkout(
        request.cart_id,
        request.franchise_id,
        request.redeem_points,
        chrono::Utc::now(),
    )?;

    state
        .notifier
        .notify_order_event(placed.order.user_id, OrderEvent::Placed, &placed.order.number)
        .await;

    Ok((StatusCode::CREATED, Json(placed)))
}

async fn my_orders_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    Ok(Json(state.orders.list_for_user(ctx.user_id, 50)?))
}

async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<OrderWithLines>, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    let order = state.orders.get(id)?;

    // Customers see their own orders; staff need the view permission.
    if order.order.user_id != Some(ctx.user_id) {
        ctx.require(Permission::OrdersView)?;
    }

    Ok(Json(order))
}
