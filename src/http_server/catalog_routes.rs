//! Admin catalog routes: category/product/variant CRUD, display-order
//! reordering and combo group management. The public storefront menu
//! lives here too.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::auth::Permission;
use crate::catalog::{
    Category, ComboGroup, MenuCategory, NewCategory, NewComboGroup, NewComboOption, NewProduct,
    NewVariant, Product, ReorderRequest, UpdateCategory, UpdateProduct, Variant,
};

use super::error::ApiError;
use super::extract::require_permission;
use super::state::AppState;

/// Public storefront menu.
pub fn menu_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(menu_handler))
        .with_state(state)
}

pub fn catalog_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories_handler).post(create_category_handler))
        .route(
            "/categories/:id",
            patch(update_category_handler).delete(delete_category_handler),
        )
        .route("/categories/reorder", post(reorder_categories_handler))
        .route("/categories/:id/products", get(list_products_handler))
        .route("/categories/:id/products/reorder", post(reorder_products_handler))
        .route("/products", post(create_product_handler))
        .route("/products/:id", get(get_product_handler).patch(update_product_handler))
        .route("/products/:id/variants", get(list_variants_handler))
        .route("/variants", post(create_variant_handler))
        .route("/variants/:id/active", patch(set_variant_active_handler))
        .route("/combo-groups", post(create_group_handler))
        .route("/combo-options", post(add_option_handler))
        .route("/combo-groups/:group_id/options/:variant_id", delete(remove_option_handler))
        .with_state(state)
}

async fn menu_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MenuCategory>>, ApiError> {
    Ok(Json(state.catalog.menu()?))
}

async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Category>>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.list_categories()?))
}

async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    let category = state.catalog.create_category(&new.name)?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<UpdateCategory>,
) -> Result<Json<Category>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.update_category(id, update)?))
}

async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    state.catalog.delete_category(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_categories_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuReorder)?;
    state.catalog.reorder_categories(&request.ids)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Product>>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.list_products(category_id)?))
}

async fn reorder_products_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(category_id): Path<i64>,
    Json(request): Json<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuReorder)?;
    state.catalog.reorder_products(category_id, &request.ids)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    let product = state.catalog.create_product(new)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.get_product(id)?))
}

async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.update_product(id, update)?))
}

async fn list_variants_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<i64>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    Ok(Json(state.catalog.list_variants(product_id)?))
}

async fn create_variant_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewVariant>,
) -> Result<(StatusCode, Json<Variant>), ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    let variant = state.catalog.create_variant(new.product_id, &new.name)?;
    Ok((StatusCode::CREATED, Json(variant)))
}

#[derive(Debug, serde::Deserialize)]
struct SetActive {
    active: bool,
}

async fn set_variant_active_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<SetActive>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    state.catalog.set_variant_active(id, body.active)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_group_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewComboGroup>,
) -> Result<(StatusCode, Json<ComboGroup>), ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    let group = state.catalog.create_group(new.product_id, &new.name)?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn add_option_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewComboOption>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    state
        .catalog
        .add_option(new.group_id, new.variant_id, new.surcharge)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_option_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((group_id, variant_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &headers, Permission::MenuEdit)?;
    state.catalog.remove_option(group_id, variant_id)?;
    Ok(StatusCode::NO_CONTENT)
}
