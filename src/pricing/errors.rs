//! Error types for pricing.

use thiserror::Error;

use crate::db::DbError;
use crate::types::{ServiceType, Zone};

pub type PricingResult<T> = Result<T, PricingError>;

#[derive(Debug, Error)]
pub enum PricingError {
    /// A variant is only orderable where a zone price exists.
    #[error("No price for variant {variant_id} in zone {zone} ({service_type})")]
    NoPrice {
        variant_id: i64,
        zone: Zone,
        service_type: ServiceType,
    },

    #[error("Daily special {0} not found")]
    SpecialNotFound(i64),

    #[error("Invalid schedule window: {0}")]
    InvalidWindow(String),

    #[error("Price must not be negative")]
    NegativePrice,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PricingError {
    pub fn status_code(&self) -> u16 {
        match self {
            PricingError::NoPrice { .. } => 422,
            PricingError::SpecialNotFound(_) => 404,
            PricingError::InvalidWindow(_) | PricingError::NegativePrice => 400,
            PricingError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for PricingError {
    fn from(err: DbError) -> Self {
        PricingError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for PricingError {
    fn from(err: rusqlite::Error) -> Self {
        PricingError::Storage(err.to_string())
    }
}
