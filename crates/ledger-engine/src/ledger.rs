//! The ledger engine.

use std::sync::Arc;

use ledger_core::{
    validate, validate_user_id, IdempotencyKey, LedgerConfig, LedgerError, Result,
    TransactRequest, TransactionRecord, ValidationError,
};
use ledger_store::{CommitConditions, Store};

use crate::call::bounded;
#[cfg(feature = "rocksdb-backend")]
use crate::call::from_store_error;

/// Largest page [`Ledger::list_transactions`] returns.
pub const MAX_PAGE_SIZE: usize = 100;

/// A page of a user's transaction history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPage {
    /// Transactions, newest first.
    pub transactions: Vec<TransactionRecord>,

    /// Whether more transactions exist past this page.
    pub has_more: bool,
}

/// Applies idempotent credits and debits against a [`Store`].
///
/// The engine keeps no state between calls besides its store handle and
/// configuration. Concurrent calls are serialized only by the store's
/// conditional commit, which rejects writes based on a stale read.
pub struct Ledger<S> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store + 'static> Ledger<S> {
    /// Create a ledger over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        tracing::debug!(
            default_balance = config.default_balance,
            storage_timeout = ?config.storage_timeout,
            "Ledger engine configured"
        );
        Self { store, config }
    }

    /// The configuration this ledger runs with.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Apply a credit or debit exactly once per idempotency key.
    ///
    /// Returns the committed transaction record. On error nothing is written,
    /// except that after an `Infrastructure` timeout during the commit the
    /// outcome is unknown; retrying with the same key is always safe.
    ///
    /// # Errors
    ///
    /// - `Validation` if the request is malformed (storage is not touched).
    /// - `DuplicateTransaction` if the key was already applied.
    /// - `Validation` if the new balance would overflow (after the balance read).
    /// - `InsufficientBalance` if the balance would end up below zero.
    /// - `Conflict` if the balance changed between read and commit.
    /// - `Infrastructure` if storage failed or timed out.
    pub async fn transact(&self, request: TransactRequest) -> Result<TransactionRecord> {
        let request = validate(&request).map_err(|e| {
            tracing::debug!(error = %e, "Rejected invalid transact request");
            e
        })?;

        tracing::debug!(
            idempotency_key = %request.idempotency_key,
            user_id = %request.user_id,
            amount = request.amount,
            kind = %request.kind,
            "Processing transaction"
        );

        let key = request.idempotency_key.clone();
        let existing = self
            .call("get_transaction", move |store| store.get_transaction(&key))
            .await?;
        if existing.is_some() {
            tracing::warn!(
                idempotency_key = %request.idempotency_key,
                "Duplicate transaction rejected"
            );
            return Err(LedgerError::DuplicateTransaction {
                idempotency_key: request.idempotency_key.to_string(),
            });
        }

        let user = request.user_id.clone();
        let read = self
            .call("get_balance", move |store| store.get_balance(&user))
            .await?;
        let current = read
            .as_ref()
            .map_or(self.config.default_balance, |record| record.balance);

        let new_balance = request.kind.apply(current, request.amount).ok_or(
            ValidationError::BalanceOverflow {
                balance: current,
                amount: request.amount,
            },
        )?;

        // Also covers a credit against a negative `default_balance` set
        // directly on the config
        if new_balance < 0 {
            tracing::warn!(
                user_id = %request.user_id,
                balance = current,
                required = request.amount,
                kind = %request.kind,
                "Insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                user_id: request.user_id.to_string(),
                balance: current,
                required: request.amount,
            });
        }

        let conditions = CommitConditions::from_read(read.as_ref());
        let record = request.into_record();
        let to_commit = record.clone();

        let written = self
            .call("commit", move |store| {
                store.commit(&to_commit, new_balance, &conditions)
            })
            .await
            .map_err(|e| {
                if matches!(
                    e,
                    LedgerError::DuplicateTransaction { .. } | LedgerError::Conflict { .. }
                ) {
                    tracing::warn!(
                        idempotency_key = %record.idempotency_key,
                        user_id = %record.user_id,
                        error = %e,
                        "Commit condition failed"
                    );
                }
                e
            })?;

        tracing::info!(
            idempotency_key = %record.idempotency_key,
            user_id = %record.user_id,
            amount = record.amount,
            kind = %record.kind,
            new_balance = written.balance,
            "Transaction committed"
        );

        Ok(record)
    }

    /// Current balance of a user, or the configured default if none is stored.
    ///
    /// # Errors
    ///
    /// - `Validation` if `user_id` is blank.
    /// - `Infrastructure` if storage failed or timed out.
    pub async fn get_balance(&self, user_id: &str) -> Result<i64> {
        let user_id = validate_user_id(user_id)?;
        let record = self
            .call("get_balance", move |store| store.get_balance(&user_id))
            .await?;

        Ok(record.map_or(self.config.default_balance, |record| record.balance))
    }

    /// Look up the committed transaction for an idempotency key.
    ///
    /// Callers that received `DuplicateTransaction` use this to recover the
    /// original outcome.
    ///
    /// # Errors
    ///
    /// - `Validation` if the key is blank.
    /// - `Infrastructure` if storage failed or timed out.
    pub async fn get_transaction(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<TransactionRecord>> {
        let key = IdempotencyKey::new(idempotency_key)
            .map_err(|_| ValidationError::MissingIdempotencyKey)?;

        self.call("get_transaction", move |store| store.get_transaction(&key))
            .await
    }

    /// A page of a user's transactions, newest first.
    ///
    /// `limit` is capped at [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// - `Validation` if `user_id` is blank.
    /// - `Infrastructure` if storage failed or timed out.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<TransactionPage> {
        let user_id = validate_user_id(user_id)?;
        let limit = limit.min(MAX_PAGE_SIZE);

        // Fetch one extra to see whether another page exists
        let mut transactions = self
            .call("list_transactions", move |store| {
                store.list_transactions_by_user(&user_id, limit + 1, offset)
            })
            .await?;

        let has_more = transactions.len() > limit;
        transactions.truncate(limit);

        Ok(TransactionPage {
            transactions,
            has_more,
        })
    }

    async fn call<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> ledger_store::Result<T> + Send + 'static,
    {
        bounded(&self.store, self.config.storage_timeout, operation, f).await
    }
}

#[cfg(feature = "rocksdb-backend")]
impl Ledger<ledger_store::RocksStore> {
    /// Open a `RocksDB`-backed ledger at `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `Infrastructure` if the database cannot be opened.
    pub fn open(config: LedgerConfig) -> Result<Self> {
        tracing::info!(path = %config.data_dir, "Opening RocksDB ledger store");
        let store =
            ledger_store::RocksStore::open(&config.data_dir).map_err(from_store_error)?;
        Ok(Self::new(Arc::new(store), config))
    }
}
