//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Transaction records, keyed by idempotency key.
    pub const TRANSACTIONS: &str = "transactions";

    /// Balance records, keyed by `user_id`.
    pub const BALANCES: &str = "balances";

    /// Index: transactions by user, keyed by `user_id || timestamp || idempotency_key`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::TRANSACTIONS, cf::BALANCES, cf::TRANSACTIONS_BY_USER]
}
