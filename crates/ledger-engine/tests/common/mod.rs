//! Common test utilities for ledger engine integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledger_core::{BalanceRecord, IdempotencyKey, LedgerConfig, TransactionRecord, UserId};
use ledger_engine::Ledger;
use ledger_store::{CommitConditions, InMemoryStore, Store, StoreError};

/// Store wrapper that counts every call and can inject commit faults.
#[derive(Default)]
pub struct TestStore {
    /// The real store underneath.
    pub inner: InMemoryStore,
    calls: AtomicUsize,
    fail_commits: AtomicBool,
    commit_delay: Mutex<Option<Duration>>,
    interleaved: Mutex<Option<(TransactionRecord, i64)>>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every commit fail with a database error without writing.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Make every commit sleep for `delay`, then fail without writing.
    pub fn stall_commits(&self, delay: Duration) {
        *self.commit_delay.lock().unwrap() = Some(delay);
    }

    /// Before the next commit, apply `record` as if a concurrent writer won the race.
    pub fn interleave_before_next_commit(&self, record: TransactionRecord, new_balance: i64) {
        *self.interleaved.lock().unwrap() = Some((record, new_balance));
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Store for TestStore {
    fn get_transaction(
        &self,
        idempotency_key: &IdempotencyKey,
    ) -> ledger_store::Result<Option<TransactionRecord>> {
        self.count();
        self.inner.get_transaction(idempotency_key)
    }

    fn get_balance(&self, user_id: &UserId) -> ledger_store::Result<Option<BalanceRecord>> {
        self.count();
        self.inner.get_balance(user_id)
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> ledger_store::Result<Vec<TransactionRecord>> {
        self.count();
        self.inner.list_transactions_by_user(user_id, limit, offset)
    }

    fn commit(
        &self,
        record: &TransactionRecord,
        new_balance: i64,
        conditions: &CommitConditions,
    ) -> ledger_store::Result<BalanceRecord> {
        self.count();

        let delay = *self.commit_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
            return Err(StoreError::Database("simulated stalled commit".into()));
        }

        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated commit failure".into()));
        }

        let competing = self.interleaved.lock().unwrap().take();
        if let Some((competing, balance)) = competing {
            self.inner
                .commit(&competing, balance, &CommitConditions::key_absent())?;
        }

        self.inner.commit(record, new_balance, conditions)
    }
}

/// A ledger over a fresh [`TestStore`] with the default configuration.
pub fn test_ledger() -> (Ledger<TestStore>, Arc<TestStore>) {
    test_ledger_with(LedgerConfig::default())
}

/// A ledger over a fresh [`TestStore`] with `config`.
pub fn test_ledger_with(config: LedgerConfig) -> (Ledger<TestStore>, Arc<TestStore>) {
    let store = Arc::new(TestStore::new());
    (Ledger::new(Arc::clone(&store), config), store)
}
