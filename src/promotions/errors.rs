//! Error types for promotions.

use thiserror::Error;

use crate::db::DbError;

pub type PromotionResult<T> = Result<T, PromotionError>;

#[derive(Debug, Error)]
pub enum PromotionError {
    #[error("Promotion {0} not found")]
    NotFound(i64),

    #[error("Invalid promotion rule: {0}")]
    InvalidRule(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PromotionError {
    pub fn status_code(&self) -> u16 {
        match self {
            PromotionError::NotFound(_) => 404,
            PromotionError::InvalidRule(_) => 400,
            PromotionError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for PromotionError {
    fn from(err: DbError) -> Self {
        PromotionError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for PromotionError {
    fn from(err: rusqlite::Error) -> Self {
        PromotionError::Storage(err.to_string())
    }
}
