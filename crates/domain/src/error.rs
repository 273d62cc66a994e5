//! Error taxonomy shared by every stage (spec §7 "Error Handling Design").
//!
//! Lives in `domain` rather than `engines` so that `storage` can return it
//! directly instead of defining its own parallel type for `sqlx::Error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("malformed input row: {0}")]
    DataShape(String),

    #[error("transient store error, retries exhausted: {0}")]
    Transient(#[source] sqlx::Error),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl EngineError {
    /// Spec §7: connection resets, serialization failures and the like are
    /// retried up to the configured retry budget; everything else aborts
    /// the batch immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Store(source) => is_transient_sqlx_error(source),
            EngineError::Transient(_) => true,
            _ => false,
        }
    }
}

fn is_transient_sqlx_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db_err) => {
            // Class 40 (transaction rollback) and 08 (connection exception).
            matches!(db_err.code().as_deref(), Some(code) if code.starts_with("40") || code.starts_with("08"))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        let err = EngineError::Store(sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
    }

    #[test]
    fn invariant_violation_is_not_transient() {
        let err = EngineError::InvariantViolation("risk weights did not sum to 1".into());
        assert!(!err.is_transient());
    }
}
