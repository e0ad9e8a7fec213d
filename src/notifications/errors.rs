//! Error types for push notifications.

use thiserror::Error;

use crate::db::DbError;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Device token not registered")]
    DeviceNotFound,

    #[error("Push delivery failed: {0}")]
    Delivery(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl NotifyError {
    pub fn status_code(&self) -> u16 {
        match self {
            NotifyError::DeviceNotFound => 404,
            NotifyError::Delivery(_) => 502,
            NotifyError::Storage(_) => 500,
        }
    }
}

impl From<DbError> for NotifyError {
    fn from(err: DbError) -> Self {
        NotifyError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for NotifyError {
    fn from(err: rusqlite::Error) -> Self {
        NotifyError::Storage(err.to_string())
    }
}
