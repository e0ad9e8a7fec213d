//! Error types for orders.

use thiserror::Error;

use crate::cart::CartError;
use crate::db::DbError;
use crate::loyalty::LoyaltyError;

use super::model::OrderStatus;

pub type OrderResult<T> = Result<T, OrderError>;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(i64),

    #[error("Franchise {0} not found")]
    FranchiseNotFound(i64),

    #[error("Franchise {0} is not taking orders")]
    FranchiseInactive(i64),

    #[error("Franchise code already in use")]
    DuplicateFranchiseCode,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::NotFound(_) | OrderError::FranchiseNotFound(_) => 404,
            OrderError::EmptyCart => 400,
            OrderError::FranchiseInactive(_) => 422,
            OrderError::InvalidTransition { .. } | OrderError::DuplicateFranchiseCode => 409,
            OrderError::Cart(e) => e.status_code(),
            OrderError::Loyalty(e) => e.status_code(),
            OrderError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for OrderError {
    fn from(err: DbError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for OrderError {
    fn from(err: rusqlite::Error) -> Self {
        OrderError::Storage(err.to_string())
    }
}
