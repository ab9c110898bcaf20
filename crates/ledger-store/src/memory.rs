//! In-memory storage implementation.
//!
//! A single `RwLock` guards all maps, so a commit checks its conditions and
//! writes both records under one write lock.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use ledger_core::{BalanceRecord, IdempotencyKey, TransactionRecord, UserId};

use crate::error::{Result, StoreError};
use crate::{CommitConditions, Store};

/// In-memory ledger store for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    transactions: HashMap<IdempotencyKey, TransactionRecord>,
    balances: HashMap<UserId, BalanceRecord>,
    /// Keys per user in commit order.
    by_user: HashMap<UserId, Vec<IdempotencyKey>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed transactions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the lock is poisoned.
    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.read()?.transactions.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }
}

impl Store for InMemoryStore {
    fn get_transaction(
        &self,
        idempotency_key: &IdempotencyKey,
    ) -> Result<Option<TransactionRecord>> {
        Ok(self.read()?.transactions.get(idempotency_key).cloned())
    }

    fn get_balance(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        Ok(self.read()?.balances.get(user_id).cloned())
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>> {
        let state = self.read()?;
        let Some(keys) = state.by_user.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(keys
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .filter_map(|key| state.transactions.get(key).cloned())
            .collect())
    }

    fn commit(
        &self,
        record: &TransactionRecord,
        new_balance: i64,
        conditions: &CommitConditions,
    ) -> Result<BalanceRecord> {
        let mut state = self.write()?;

        let key_exists = state.transactions.contains_key(&record.idempotency_key);
        let current = state.balances.get(&record.user_id).map(|b| b.balance);
        conditions.check(record, key_exists, current)?;

        let balance = BalanceRecord {
            user_id: record.user_id.clone(),
            balance: new_balance,
            updated_at: Utc::now(),
        };

        state
            .transactions
            .insert(record.idempotency_key.clone(), record.clone());
        state
            .balances
            .insert(record.user_id.clone(), balance.clone());
        state
            .by_user
            .entry(record.user_id.clone())
            .or_default()
            .push(record.idempotency_key.clone());

        Ok(balance)
    }
}
