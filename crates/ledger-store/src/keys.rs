//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use chrono::{DateTime, Utc};
use ledger_core::{IdempotencyKey, UserId};

use crate::error::{Result, StoreError};

/// Create a transaction key from an idempotency key.
#[must_use]
pub fn transaction_key(idempotency_key: &IdempotencyKey) -> Vec<u8> {
    idempotency_key.as_bytes().to_vec()
}

/// Create a balance key from a user ID.
#[must_use]
pub fn balance_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a prefix for iterating all transactions for a user.
///
/// Format: `len(user_id) (4 bytes, BE) || user_id`
///
/// The length prefix keeps one user's prefix from matching another user
/// whose id starts with the same bytes.
#[must_use]
pub fn user_transactions_prefix(user_id: &UserId) -> Vec<u8> {
    let bytes = user_id.as_bytes();
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    let mut prefix = Vec::with_capacity(4 + bytes.len());
    prefix.extend_from_slice(&len.to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

/// Create a user-transaction index key.
///
/// Format: `prefix || timestamp micros (8 bytes, BE) || idempotency_key`
///
/// Transactions for a user sort by commit time.
#[must_use]
pub fn user_transaction_key(
    user_id: &UserId,
    timestamp: &DateTime<Utc>,
    idempotency_key: &IdempotencyKey,
) -> Vec<u8> {
    let micros = u64::try_from(timestamp.timestamp_micros()).unwrap_or(0);
    let mut key = user_transactions_prefix(user_id);
    key.reserve(8 + idempotency_key.as_bytes().len());
    key.extend_from_slice(&micros.to_be_bytes());
    key.extend_from_slice(idempotency_key.as_bytes());
    key
}

/// Extract the idempotency key from a user-transaction index key.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the key is malformed.
pub fn extract_idempotency_key_from_user_key(key: &[u8]) -> Result<IdempotencyKey> {
    let malformed = || StoreError::Serialization("malformed user transaction key".into());

    let len_bytes: [u8; 4] = key
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(malformed)?;
    let user_len = usize::try_from(u32::from_be_bytes(len_bytes)).map_err(|_| malformed())?;
    let start = 4 + user_len + 8;

    let raw = key.get(start..).ok_or_else(malformed)?;
    let text = std::str::from_utf8(raw).map_err(|_| malformed())?;
    IdempotencyKey::new(text).map_err(|_| malformed())
}
