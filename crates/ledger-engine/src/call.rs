//! Bounded storage calls.
//!
//! Store calls are blocking, so each one runs on tokio's blocking pool and is
//! raced against the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use ledger_core::{InfrastructureError, LedgerError};
use ledger_store::{Store, StoreError};

/// Run `f` against the store on the blocking pool, giving up after `timeout`.
///
/// A call that times out keeps running in the background; for a commit the
/// outcome is then unknown to the caller.
pub(crate) async fn bounded<S, T, F>(
    store: &Arc<S>,
    timeout: Duration,
    operation: &'static str,
    f: F,
) -> Result<T, LedgerError>
where
    S: Store + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> ledger_store::Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || f(&store));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result.map_err(|err| {
            if !err.is_condition_failure() {
                tracing::error!(operation, error = %err, "Storage call failed");
            }
            from_store_error(err)
        }),
        Ok(Err(join_error)) => {
            tracing::error!(operation, error = %join_error, "Storage task failed");
            Err(InfrastructureError::TaskFailed(join_error.to_string()).into())
        }
        Err(_) => {
            tracing::error!(operation, ?timeout, "Storage call timed out");
            Err(InfrastructureError::Timeout { operation, timeout }.into())
        }
    }
}

/// Map a storage error onto the ledger taxonomy.
///
/// Condition failures only come out of `commit`: an existing key means the
/// operation was already applied, a moved balance is a retryable conflict.
pub(crate) fn from_store_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::TransactionExists { idempotency_key } => {
            LedgerError::DuplicateTransaction { idempotency_key }
        }
        StoreError::BalanceChanged { user_id, .. } => LedgerError::Conflict { user_id },
        StoreError::Database(msg) | StoreError::Serialization(msg) => {
            InfrastructureError::Storage(msg).into()
        }
    }
}
