//! Error types for loyalty points.

use thiserror::Error;

use crate::db::DbError;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[derive(Debug, Error)]
pub enum LoyaltyError {
    #[error("Insufficient points: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("Invalid adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LoyaltyError {
    pub fn status_code(&self) -> u16 {
        match self {
            LoyaltyError::InsufficientBalance { .. } => 422,
            LoyaltyError::InvalidAdjustment(_) => 400,
            LoyaltyError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for LoyaltyError {
    fn from(err: DbError) -> Self {
        LoyaltyError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for LoyaltyError {
    fn from(err: rusqlite::Error) -> Self {
        LoyaltyError::Storage(err.to_string())
    }
}
