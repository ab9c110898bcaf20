//! Storage layer for the idempotent ledger.
//!
//! This crate provides persistence for transaction records and per-user
//! balances behind the [`Store`] trait, with two implementations:
//!
//! - [`InMemoryStore`]: lock-guarded maps, for tests and embedding.
//! - [`RocksStore`] (feature `rocksdb-backend`): `RocksDB` with column families.
//!
//! # Atomic commit
//!
//! [`Store::commit`] is the only write. It checks its [`CommitConditions`] and
//! writes the transaction record and the new balance in one all-or-nothing
//! step, so a commit based on a stale read is rejected instead of applied.
//!
//! # Example
//!
//! ```
//! use ledger_core::{TransactionKind, TransactionRecord};
//! use ledger_store::{CommitConditions, InMemoryStore, Store};
//!
//! let store = InMemoryStore::new();
//! let record = TransactionRecord::new(
//!     "k1".parse().unwrap(),
//!     "u1".parse().unwrap(),
//!     100,
//!     TransactionKind::Credit,
//! );
//!
//! store
//!     .commit(&record, 200, &CommitConditions::balance_absent())
//!     .unwrap();
//!
//! let balance = store.get_balance(&record.user_id).unwrap().unwrap();
//! assert_eq!(balance.balance, 200);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use ledger_core::{BalanceRecord, IdempotencyKey, TransactionRecord, UserId};

/// Expected state of a user's balance record at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCondition {
    /// No balance check.
    Any,

    /// The user must have no balance record yet.
    Absent,

    /// The stored balance must equal this value.
    Equals(i64),
}

/// Preconditions evaluated atomically with a commit.
///
/// The transaction key is always required to be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitConditions {
    /// Expected balance record state.
    pub balance: BalanceCondition,
}

impl CommitConditions {
    /// Require only that the transaction key is absent.
    #[must_use]
    pub const fn key_absent() -> Self {
        Self {
            balance: BalanceCondition::Any,
        }
    }

    /// Additionally require the user to have no balance record.
    #[must_use]
    pub const fn balance_absent() -> Self {
        Self {
            balance: BalanceCondition::Absent,
        }
    }

    /// Additionally require the stored balance to equal `balance`.
    #[must_use]
    pub const fn balance_equals(balance: i64) -> Self {
        Self {
            balance: BalanceCondition::Equals(balance),
        }
    }

    /// Conditions matching a balance read: absent if nothing was read,
    /// otherwise the value that was read.
    #[must_use]
    pub fn from_read(read: Option<&BalanceRecord>) -> Self {
        read.map_or_else(Self::balance_absent, |record| {
            Self::balance_equals(record.balance)
        })
    }

    /// Evaluate the conditions against the current stored state.
    ///
    /// Backends call this while holding whatever makes check-and-write atomic.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionExists` if `key_exists`.
    /// - `StoreError::BalanceChanged` if the balance does not match.
    pub fn check(
        &self,
        record: &TransactionRecord,
        key_exists: bool,
        current_balance: Option<i64>,
    ) -> Result<()> {
        if key_exists {
            return Err(StoreError::TransactionExists {
                idempotency_key: record.idempotency_key.to_string(),
            });
        }

        let expected = match self.balance {
            BalanceCondition::Any => return Ok(()),
            BalanceCondition::Absent => None,
            BalanceCondition::Equals(balance) => Some(balance),
        };

        if expected == current_balance {
            Ok(())
        } else {
            Err(StoreError::BalanceChanged {
                user_id: record.user_id.to_string(),
                expected,
                actual: current_balance,
            })
        }
    }
}

/// The storage trait defining all ledger database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing). Calls are blocking.
pub trait Store: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a transaction by idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(
        &self,
        idempotency_key: &IdempotencyKey,
    ) -> Result<Option<TransactionRecord>>;

    /// Get the balance record of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_balance(&self, user_id: &UserId) -> Result<Option<BalanceRecord>>;

    /// List transactions for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>>;

    // =========================================================================
    // Atomic Commit
    // =========================================================================

    /// Insert a transaction record and set the user's balance atomically.
    ///
    /// Returns the balance record that was written.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionExists` if the key was committed already.
    /// - `StoreError::BalanceChanged` if the balance condition fails.
    /// - `StoreError::Database` / `StoreError::Serialization` on backend failure.
    ///
    /// On any error nothing is written.
    fn commit(
        &self,
        record: &TransactionRecord,
        new_balance: i64,
        conditions: &CommitConditions,
    ) -> Result<BalanceRecord>;
}
