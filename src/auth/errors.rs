//! # Auth Errors
//!
//! Error types for authentication and authorization.

use thiserror::Error;

use crate::db::DbError;

use super::permissions::Permission;

pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Generic on purpose: must not reveal whether the email exists.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Session expired or invalid")]
    SessionInvalid,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session has been revoked")]
    SessionRevoked,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Missing permission: {0}")]
    PermissionDenied(Permission),

    #[error("User not found")]
    UserNotFound,

    /// The identity provider rejected or failed the profile fetch.
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Identity provider did not verify the email")]
    ProviderEmailUnverified,

    #[error("Internal error: password hashing failed")]
    HashingFailed,

    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidEmail | AuthError::WeakPassword(_) | AuthError::MalformedToken => 400,

            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::InvalidRefreshToken
            | AuthError::SessionRevoked
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::AuthenticationRequired => 401,

            AuthError::PermissionDenied(_) | AuthError::ProviderEmailUnverified => 403,

            AuthError::UserNotFound => 404,

            AuthError::EmailAlreadyExists => 409,

            AuthError::Provider(_) => 502,

            AuthError::HashingFailed | AuthError::TokenGenerationFailed | AuthError::Storage(_) => {
                500
            }
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(
            AuthError::PermissionDenied(Permission::UsersManage).status_code(),
            403
        );
        assert_eq!(AuthError::EmailAlreadyExists.status_code(), 409);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
    }

    #[test]
    fn test_invalid_credentials_is_generic() {
        let message = AuthError::InvalidCredentials.to_string();
        assert!(!message.contains("password"));
        assert!(!message.contains("email"));
    }
}
