//! Bearer-token extraction helpers shared by all route modules.

use axum::http::HeaderMap;

use crate::auth::{AuthContext, Permission};

use super::error::ApiError;
use super::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// The caller must present a valid access token.
pub fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;
    Ok(state.auth.validate_access(token)?)
}

/// Anonymous access allowed; a bad token is still rejected.
pub fn optional_auth(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthContext>, ApiError> {
    match bearer_token(headers) {
        None => Ok(None),
        Some(token) => Ok(Some(state.auth.validate_access(token)?)),
    }
}

/// Admin gate: authenticated and holding `permission`.
pub fn require_permission(
    state: &AppState,
    headers: &HeaderMap,
    permission: Permission,
) -> Result<AuthContext, ApiError> {
    let ctx = require_auth(state, headers)?;
    ctx.require(permission)?;
    Ok(ctx)
}
