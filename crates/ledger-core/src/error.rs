//! Error types for the ledger.
//!
//! Errors form a closed set of kinds so callers branch on the variant rather
//! than on message text.

use std::time::Duration;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The request was malformed. Nothing was written.
    ///
    /// Storage was not read either, except for
    /// [`ValidationError::BalanceOverflow`], which needs the current balance.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The idempotency key has already been applied.
    ///
    /// Not an operational failure: the original operation is the outcome.
    #[error("duplicate transaction: idempotency key {idempotency_key} has already been used")]
    DuplicateTransaction {
        /// The key that was replayed.
        idempotency_key: String,
    },

    /// The operation would take the balance below zero. No state changed.
    #[error("insufficient balance for {user_id}: balance={balance}, required={required}")]
    InsufficientBalance {
        /// The user being debited.
        user_id: String,
        /// Balance at the time of the check.
        balance: i64,
        /// Amount the debit asked for.
        required: i64,
    },

    /// The balance changed between read and commit. Retry with the same key.
    #[error("concurrent modification of balance for {user_id}")]
    Conflict {
        /// The user whose balance moved underneath the operation.
        user_id: String,
    },

    /// Storage was unreachable, failed, or timed out.
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl LedgerError {
    /// Whether retrying the same call with the same idempotency key may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Infrastructure(_))
    }

    /// Short machine-readable name of the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateTransaction { .. } => "duplicate_transaction",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::Conflict { .. } => "conflict",
            Self::Infrastructure(_) => "infrastructure_error",
        }
    }
}

/// A field-specific reason a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The idempotency key was empty.
    #[error("idempotency key required")]
    MissingIdempotencyKey,

    /// The user id was empty.
    #[error("user id required")]
    MissingUserId,

    /// The amount was zero or negative.
    #[error("amount must be greater than 0")]
    NonPositiveAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// The kind was neither credit nor debit.
    #[error("type must be either credit or debit")]
    InvalidKind {
        /// The rejected kind string.
        kind: String,
    },

    /// Applying the amount would overflow the balance.
    ///
    /// Unlike the other variants this is detected after the balance read,
    /// since it depends on stored state.
    #[error("amount overflows balance")]
    BalanceOverflow {
        /// Balance before the operation.
        balance: i64,
        /// The amount that could not be applied.
        amount: i64,
    },
}

/// Failures of the storage backend itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InfrastructureError {
    /// A storage call did not finish within the configured timeout.
    ///
    /// If the operation was a commit its outcome is unknown; retry with the
    /// same idempotency key.
    #[error("storage {operation} timed out after {timeout:?}")]
    Timeout {
        /// The storage operation that timed out.
        operation: &'static str,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The storage backend reported an error.
    #[error("storage error: {0}")]
    Storage(String),

    /// The task running the storage call failed.
    #[error("storage task failed: {0}")]
    TaskFailed(String),
}
