//! Core types and utilities for the idempotent ledger.
//!
//! This crate provides the foundational types used throughout the ledger:
//!
//! - **Identifiers**: `IdempotencyKey`, `UserId`
//! - **Records**: `TransactionRecord`, `BalanceRecord`, `TransactionKind`
//! - **Requests**: `TransactRequest`, `ValidRequest` and the `validate` function
//! - **Errors**: `LedgerError`, `ValidationError`, `InfrastructureError`
//! - **Configuration**: `LedgerConfig`
//!
//! # Units
//!
//! Amounts and balances are `i64` integer units. There is no currency and no
//! subdivision below one unit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod ids;
pub mod transaction;
pub mod validation;

pub use config::{LedgerConfig, DEFAULT_STORAGE_TIMEOUT_MS};
pub use error::{InfrastructureError, LedgerError, Result, ValidationError};
pub use ids::{IdError, IdempotencyKey, UserId};
pub use transaction::{
    fold_balance, BalanceRecord, TransactRequest, TransactionKind, TransactionRecord,
    ValidRequest, DEFAULT_STARTING_BALANCE,
};
pub use validation::{validate, validate_user_id};
