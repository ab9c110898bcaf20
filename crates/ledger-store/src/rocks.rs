//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Commits hold `commit_lock` while they read their conditions and write a
//! single `WriteBatch`; readers never take the lock.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use ledger_core::{BalanceRecord, IdempotencyKey, TransactionRecord, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{CommitConditions, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    commit_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!("Opened RocksDB ledger store");

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read and decode a value from a column family.
    fn get_value<T: serde::de::DeserializeOwned>(&self, name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(name)?;

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Reads
    // =========================================================================

    fn get_transaction(
        &self,
        idempotency_key: &IdempotencyKey,
    ) -> Result<Option<TransactionRecord>> {
        self.get_value(cf::TRANSACTIONS, &keys::transaction_key(idempotency_key))
    }

    fn get_balance(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        self.get_value(cf::BALANCES, &keys::balance_key(user_id))
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_transactions_prefix(user_id);

        let iter = self
            .db
            .iterator_cf(&cf_by_user, IteratorMode::From(&prefix, Direction::Forward));

        // Index keys are time-ordered within the prefix
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        // Newest first
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys.into_iter().skip(offset).take(limit) {
            let idempotency_key = keys::extract_idempotency_key_from_user_key(&key)?;
            if let Some(tx) = self.get_transaction(&idempotency_key)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Atomic Commit
    // =========================================================================

    fn commit(
        &self,
        record: &TransactionRecord,
        new_balance: i64,
        conditions: &CommitConditions,
    ) -> Result<BalanceRecord> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| StoreError::Database("commit lock poisoned".into()))?;

        let key_exists = self.get_transaction(&record.idempotency_key)?.is_some();
        let current = self.get_balance(&record.user_id)?.map(|b| b.balance);
        conditions.check(record, key_exists, current)?;

        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_balances = self.cf(cf::BALANCES)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let balance = BalanceRecord {
            user_id: record.user_id.clone(),
            balance: new_balance,
            updated_at: Utc::now(),
        };

        let tx_key = keys::transaction_key(&record.idempotency_key);
        let balance_key = keys::balance_key(&record.user_id);
        let user_tx_key =
            keys::user_transaction_key(&record.user_id, &record.timestamp, &record.idempotency_key);

        let tx_value = Self::serialize(record)?;
        let balance_value = Self::serialize(&balance)?;

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_tx, &tx_key, &tx_value);
        batch.put_cf(&cf_balances, &balance_key, &balance_value);
        batch.put_cf(&cf_by_user, &user_tx_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(balance)
    }
}
