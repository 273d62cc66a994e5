//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Schema bootstrap error: {0}")]
    Bootstrap(#[source] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<StorageError> for pipeline_domain::EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Connection(source) | StorageError::Bootstrap(source) => source.into(),
            StorageError::Query(source) => source.into(),
        }
    }
}
