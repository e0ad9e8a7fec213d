//! Auth HTTP routes: signup, login (password and Google), token
//! refresh, logout and the current-user endpoint.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::auth::{LoginRequest, SignupRequest, TokenResponse, User};

use super::error::ApiError;
use super::extract::require_auth;
use super::state::AppState;

pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/login/google", post(google_login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, tokens) = state.auth.signup(request)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, tokens) = state.auth.login(request)?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        tokens,
    }))
}

async fn google_login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, tokens) = state
        .auth
        .login_social(&state.google, &request.access_token)
        .await?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        tokens,
    }))
}

async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.auth.refresh(&request.refresh_token)?))
}

async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(&request.refresh_token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let ctx = require_auth(&state, &headers)?;
    let user = state.auth.get_user(ctx.user_id)?;
    Ok(Json(UserResponse::from(&user)))
}
