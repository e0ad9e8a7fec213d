//! Admin routes: order board and transitions, the activity feed, user
//! and franchise management, loyalty adjustments, and the permission
//! registry.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Permission, Role};
use crate::orders::{
    ActivityEntry, Franchise, NewFranchise, Order, OrderStatus, OrderWithLines, TransitionRequest,
};

use super::auth_routes::UserResponse;
use super::error::ApiError;
use super::extract::require_permission;
use super::state::AppState;

/// The admin surface and the permission each route demands. This table
/// is what `/admin/permissions` reports; handlers enforce the same
/// values via `require_permission`.
pub const ADMIN_ROUTES: &[(&str, &str, Permission)] = &[
    ("GET", "/admin/catalog/categories", Permission::MenuEdit),
    ("POST", "/admin/catalog/categories", Permission::MenuEdit),
    ("PATCH", "/admin/catalog/categories/:id", Permission::MenuEdit),
    ("DELETE", "/admin/catalog/categories/:id", Permission::MenuEdit),
    ("POST", "/admin/catalog/categories/reorder", Permission::MenuReorder),
    ("POST", "/admin/catalog/categories/:id/products/reorder", Permission::MenuReorder),
    ("POST", "/admin/catalog/products", Permission::MenuEdit),
    ("PATCH", "/admin/catalog/products/:id", Permission::MenuEdit),
    ("POST", "/admin/catalog/variants", Permission::MenuEdit),
    ("PATCH", "/admin/catalog/variants/:id/active", Permission::MenuEdit),
    ("POST", "/admin/catalog/combo-groups", Permission::MenuEdit),
    ("POST", "/admin/catalog/combo-options", Permission::MenuEdit),
    ("POST", "/admin/pricing/zone-prices", Permission::MenuEdit),
    ("POST", "/admin/pricing/specials", Permission::PromotionsEdit),
    ("POST", "/admin/promotions", Permission::PromotionsEdit),
    ("PATCH", "/admin/promotions/:id/active", Permission::PromotionsEdit),
    ("GET", "/admin/orders", Permission::OrdersView),
    ("POST", "/admin/orders/:id/status", Permission::OrdersTransition),
    ("GET", "/admin/activity", Permission::ReportsView),
    ("GET", "/admin/users", Permission::UsersManage),
    ("PATCH", "/admin/users/:id/role", Permission::UsersManage),
    ("POST", "/admin/loyalty/:user_id/adjust", Permission::LoyaltyAdjust),
    ("GET", "/admin/franchises", Permission::OrdersView),
    ("POST", "/admin/franchises", Permission::UsersManage),
    ("PATCH", "/admin/franchises/:id/active", Permission::UsersManage),
];

pub fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", get(list_orders_handler))
        .route("/orders/:id/status", post(transition_handler))
        .route("/activity", get(activity_handler))
        .route("/users", get(list_users_handler))
        .route("/users/:id/role", patch(set_role_handler))
        .route("/loyalty/:user_id/adjust", post(adjust_loyalty_handler))
        .route("/franchises", get(list_franchises_handler).post(create_franchise_handler))
        .route("/franchises/:id/active", patch(set_franchise_active_handler))
        .route("/permissions", get(permissions_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct OrderListQuery {
    franchise_id: i64,
    status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

fn default_limit() -> u32 {
    50
}

async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    require_permission(&state, &headers, Permission::OrdersView)?;
    Ok(Json(state.orders.list(
        query.franchise_id,
        query.status,
        query.limit,
        query.offset,
    )?))
}

async fn transition_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<OrderWithLines>, ApiError> {
    let ctx = require_permission(&state, &headers, Permission::OrdersTransition)?;

    let updated = state
        .orders
        .transition(id, request.status, Some(&ctx.email))?;

    if let Some(event) = updated.order.status.push_event() {
        state
            .notifier
            .notify_order_event(updated.order.user_id, event, &updated.order.number)
            .await;
    }

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    #[serde(default = "default_limit")]
    limit: u32,
}

async fn activity_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    require_permission(&state, &headers, Permission::ReportsView)?;
    Ok(Json(state.orders.activity_feed(query.limit)?))
}

async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_permission(&state, &headers, Permission::UsersManage)?;
    let users = state.auth.list_users()?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
struct SetRoleRequest {
    role: Role,
}

async fn set_role_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::UsersManage)?;
    state.auth.set_role(id, request.role)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct AdjustRequest {
    delta: i64,
    note: String,
}

async fn adjust_loyalty_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AdjustRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::LoyaltyAdjust)?;
    state.loyalty.adjust(user_id, request.delta, &request.note)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_franchises_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Franchise>>, ApiError> {
    require_permission(&state, &headers, Permission::OrdersView)?;
    Ok(Json(state.orders.list_franchises()?))
}

async fn create_franchise_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewFranchise>,
) -> Result<(StatusCode, Json<Franchise>), ApiError> {
    require_permission(&state, &headers, Permission::UsersManage)?;
    let franchise = state.orders.create_franchise(&new.code, &new.name)?;
    Ok((StatusCode::CREATED, Json(franchise)))
}

#[derive(Debug, Deserialize)]
struct SetActive {
    active: bool,
}

async fn set_franchise_active_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<SetActive>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::UsersManage)?;
    state.orders.set_franchise_active(id, body.active)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct PermissionEntry {
    method: &'static str,
    path: &'static str,
    permission: Permission,
}

/// The permission registry, derived from the admin route table.
async fn permissions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PermissionEntry>>, ApiError> {
    require_permission(&state, &headers, Permission::UsersManage)?;
    Ok(Json(
        ADMIN_ROUTES
            .iter()
            .map(|(method, path, permission)| PermissionEntry {
                method,
                path,
                permission: *permission,
            })
            .collect(),
    ))
}
