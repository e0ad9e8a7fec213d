//! Unified HTTP error body: every domain error renders as
//! `{ "error": "...", "code": NNN }` with its module's status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::db::DbError;
use crate::loyalty::LoyaltyError;
use crate::notifications::NotifyError;
use crate::orders::OrderError;
use crate::pricing::PricingError;
use crate::promotions::PromotionError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: ErrorBody {
                error: message.into(),
                code,
            },
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(401, message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

macro_rules! from_domain_error {
    ($($ty:ty),+ $(,)?) => {
        $(impl From<$ty> for ApiError {
            fn from(err: $ty) -> Self {
                ApiError::new(err.status_code(), err.to_string())
            }
        })+
    };
}

from_domain_error!(
    AuthError,
    CatalogError,
    PricingError,
    PromotionError,
    CartError,
    OrderError,
    LoyaltyError,
    NotifyError,
    DbError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_maps_status() {
        let err: ApiError = AuthError::AuthenticationRequired.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.body.code, 401);
    }

    #[test]
    fn test_unknown_code_falls_back_to_500() {
        let err = ApiError::new(999, "weird");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
