//! Error types for menu management.

use thiserror::Error;

use crate::db::DbError;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category {0} not found")]
    CategoryNotFound(i64),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Variant {0} not found")]
    VariantNotFound(i64),

    #[error("Choice group {0} not found")]
    GroupNotFound(i64),

    #[error("Category {0} still has products")]
    CategoryNotEmpty(i64),

    #[error("Product {0} is not a combo")]
    NotACombo(i64),

    /// Reorder payloads must be a permutation of the stored ids.
    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("Category name already in use")]
    DuplicateName,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::CategoryNotFound(_)
            | CatalogError::ProductNotFound(_)
            | CatalogError::VariantNotFound(_)
            | CatalogError::GroupNotFound(_) => 404,

            CatalogError::InvalidReorder(_) | CatalogError::NotACombo(_) => 400,

            CatalogError::CategoryNotEmpty(_) | CatalogError::DuplicateName => 409,

            CatalogError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(err: DbError) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}
