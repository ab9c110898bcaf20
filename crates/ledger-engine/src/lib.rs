//! Idempotent ledger engine.
//!
//! [`Ledger`] records credits and debits against per-user balances. Each
//! operation carries an idempotency key and is applied at most once; the
//! transaction record and the balance update are committed together or not
//! at all.
//!
//! # Flow
//!
//! 1. Validate the request (no storage access on failure).
//! 2. Reject keys that were already applied.
//! 3. Read the balance, falling back to the configured default.
//! 4. Compute the new balance; debits may not go below zero.
//! 5. Commit both records conditioned on the key still being absent and the
//!    balance being unchanged since step 3.
//!
//! The engine never retries. `Conflict` and `Infrastructure` errors are safe
//! to retry with the same idempotency key.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ledger_core::{LedgerConfig, LedgerError, TransactRequest};
//! use ledger_engine::Ledger;
//! use ledger_store::InMemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ledger = Ledger::new(Arc::new(InMemoryStore::new()), LedgerConfig::default());
//!
//! ledger.transact(TransactRequest::credit("k1", "u1", 100)).await.unwrap();
//! assert_eq!(ledger.get_balance("u1").await.unwrap(), 200);
//!
//! let replay = ledger.transact(TransactRequest::credit("k1", "u1", 100)).await;
//! assert!(matches!(replay, Err(LedgerError::DuplicateTransaction { .. })));
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod call;
pub mod ledger;

pub use ledger::{Ledger, TransactionPage, MAX_PAGE_SIZE};

pub use ledger_core::{
    LedgerConfig, LedgerError, Result, TransactRequest, TransactionKind, TransactionRecord,
};
#[cfg(feature = "rocksdb-backend")]
pub use ledger_store::RocksStore;
pub use ledger_store::{InMemoryStore, Store};
