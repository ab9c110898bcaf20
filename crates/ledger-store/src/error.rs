//! Error types for ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Commit condition failed: the transaction key is already present.
    #[error("transaction already exists: {idempotency_key}")]
    TransactionExists {
        /// The key that was already committed.
        idempotency_key: String,
    },

    /// Commit condition failed: the balance record is not what the caller read.
    #[error("balance changed for {user_id}: expected {expected:?}, found {actual:?}")]
    BalanceChanged {
        /// The user whose balance moved.
        user_id: String,
        /// Balance the caller read (`None` = no record).
        expected: Option<i64>,
        /// Balance currently stored (`None` = no record).
        actual: Option<i64>,
    },
}

impl StoreError {
    /// Whether this error is a failed commit condition rather than a backend failure.
    #[must_use]
    pub const fn is_condition_failure(&self) -> bool {
        matches!(
            self,
            Self::TransactionExists { .. } | Self::BalanceChanged { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_failures_are_distinguished_from_backend_errors() {
        assert!(StoreError::TransactionExists {
            idempotency_key: "k1".into()
        }
        .is_condition_failure());
        assert!(StoreError::BalanceChanged {
            user_id: "u1".into(),
            expected: None,
            actual: Some(100),
        }
        .is_condition_failure());

        assert!(!StoreError::Database("disk full".into()).is_condition_failure());
        assert!(!StoreError::Serialization("bad cbor".into()).is_condition_failure());
    }
}
