//! Loyalty routes: customer balance and statement.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::loyalty::LedgerEntry;

use super::error::ApiError;
use super::extract::require_auth;
use super::state::AppState;

pub fn loyalty_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/balance", get(balance_handler))
        .route("/statement", get(statement_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    points: i64,
}

async fn balance_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BalanceResponse>, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    Ok(Json(BalanceResponse {
        points: state.loyalty.balance(ctx.user_id)?,
    }))
}

#[derive(Debug, Deserialize)]
struct StatementQuery {
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    50
}

async fn statement_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatementQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    Ok(Json(state.loyalty.statement(ctx.user_id, query.limit)?))
}
