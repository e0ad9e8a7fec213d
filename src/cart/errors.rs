//! Error types for carts.

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::db::DbError;
use crate::pricing::PricingError;
use crate::promotions::PromotionError;

pub type CartResult<T> = Result<T, CartError>;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart {0} not found")]
    NotFound(Uuid),

    #[error("Cart line {0} not found")]
    LineNotFound(i64),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Variant {0} is not available")]
    VariantUnavailable(i64),

    #[error("Invalid combo selection: {0}")]
    InvalidComboSelection(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CartError {
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::NotFound(_) | CartError::LineNotFound(_) => 404,
            CartError::InvalidQuantity | CartError::InvalidComboSelection(_) => 400,
            CartError::VariantUnavailable(_) => 422,
            CartError::Pricing(e) => e.status_code(),
            CartError::Catalog(e) => e.status_code(),
            CartError::Promotion(e) => e.status_code(),
            CartError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for CartError {
    fn from(err: DbError) -> Self {
        CartError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for CartError {
    fn from(err: rusqlite::Error) -> Self {
        CartError::Storage(err.to_string())
    }
}
