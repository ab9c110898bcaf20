//! Ledger record types.
//!
//! This module defines the two persistent records (transactions and balances)
//! and the request shapes handed to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IdempotencyKey, UserId};

// ============================================================================
// Constants
// ============================================================================

/// Starting balance for a user with no balance record, in units.
///
/// Override it through [`crate::LedgerConfig`]; a default of 0 makes every
/// user start empty.
pub const DEFAULT_STARTING_BALANCE: i64 = 100;

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Adds the amount to the balance.
    Credit,

    /// Subtracts the amount from the balance.
    Debit,
}

impl TransactionKind {
    /// Get the kind name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Return the amount with the sign this kind applies to a balance.
    #[must_use]
    pub const fn signed_amount(&self, amount: i64) -> i64 {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Apply `amount` to `balance`, returning `None` on overflow.
    #[must_use]
    pub const fn apply(&self, balance: i64, amount: i64) -> Option<i64> {
        match self {
            Self::Credit => balance.checked_add(amount),
            Self::Debit => balance.checked_sub(amount),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(crate::ValidationError::InvalidKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// A committed ledger operation.
///
/// Written exactly once, together with the balance update it caused, and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Idempotency key; the primary identity of the operation.
    pub idempotency_key: IdempotencyKey,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Amount in units. Always positive; the sign comes from `kind`.
    pub amount: i64,

    /// Credit or debit.
    pub kind: TransactionKind,

    /// When the engine committed the transaction.
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        idempotency_key: IdempotencyKey,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
    ) -> Self {
        Self {
            idempotency_key,
            user_id,
            amount,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Amount with its balance sign (credits positive, debits negative).
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        self.kind.signed_amount(self.amount)
    }
}

/// The current balance of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// The user this balance belongs to.
    pub user_id: UserId,

    /// Balance in units. Never negative after a committed operation.
    pub balance: i64,

    /// When the balance was last written.
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Create a balance record stamped with the current time.
    #[must_use]
    pub fn new(user_id: UserId, balance: i64) -> Self {
        Self {
            user_id,
            balance,
            updated_at: Utc::now(),
        }
    }
}

/// Replay a user's transaction log on top of the starting balance.
///
/// Returns `None` if the fold overflows. A ledger that honours its
/// invariants always agrees with the stored [`BalanceRecord`].
#[must_use]
pub fn fold_balance<'a, I>(starting_balance: i64, records: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    records
        .into_iter()
        .try_fold(starting_balance, |acc, record| record.kind.apply(acc, record.amount))
}

/// An unvalidated transact request, as received from a binding layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactRequest {
    /// Caller-supplied idempotency key.
    pub idempotency_key: String,

    /// The user to credit or debit.
    pub user_id: String,

    /// Amount in units; must be positive.
    pub amount: i64,

    /// `"credit"` or `"debit"`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TransactRequest {
    /// Build a request from its parts.
    #[must_use]
    pub fn new(
        idempotency_key: impl Into<String>,
        user_id: impl Into<String>,
        amount: i64,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            user_id: user_id.into(),
            amount,
            kind: kind.into(),
        }
    }

    /// Shorthand for a credit request.
    #[must_use]
    pub fn credit(
        idempotency_key: impl Into<String>,
        user_id: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self::new(idempotency_key, user_id, amount, TransactionKind::Credit.as_str())
    }

    /// Shorthand for a debit request.
    #[must_use]
    pub fn debit(
        idempotency_key: impl Into<String>,
        user_id: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self::new(idempotency_key, user_id, amount, TransactionKind::Debit.as_str())
    }
}

/// A request accepted by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    /// Non-empty idempotency key.
    pub idempotency_key: IdempotencyKey,

    /// Non-empty user id.
    pub user_id: UserId,

    /// Strictly positive amount.
    pub amount: i64,

    /// Parsed kind.
    pub kind: TransactionKind,
}

impl ValidRequest {
    /// Turn the request into the record that will be committed.
    #[must_use]
    pub fn into_record(self) -> TransactionRecord {
        TransactionRecord::new(self.idempotency_key, self.user_id, self.amount, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, amount: i64, kind: TransactionKind) -> TransactionRecord {
        TransactionRecord::new(
            key.parse().unwrap(),
            "u1".parse().unwrap(),
            amount,
            kind,
        )
    }

    #[test]
    fn kind_signs_amount() {
        assert_eq!(TransactionKind::Credit.signed_amount(40), 40);
        assert_eq!(TransactionKind::Debit.signed_amount(40), -40);
    }

    #[test]
    fn kind_apply_detects_overflow() {
        assert_eq!(TransactionKind::Credit.apply(100, 50), Some(150));
        assert_eq!(TransactionKind::Debit.apply(100, 150), Some(-50));
        assert_eq!(TransactionKind::Credit.apply(i64::MAX, 1), None);
    }

    #[test]
    fn kind_parses_lowercase_names_only() {
        assert_eq!("credit".parse::<TransactionKind>(), Ok(TransactionKind::Credit));
        assert_eq!("debit".parse::<TransactionKind>(), Ok(TransactionKind::Debit));
        assert!("Credit".parse::<TransactionKind>().is_err());
        assert!("refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn fold_replays_log() {
        let log = vec![
            record("k1", 100, TransactionKind::Credit),
            record("k2", 50, TransactionKind::Debit),
            record("k3", 5, TransactionKind::Credit),
        ];
        assert_eq!(fold_balance(DEFAULT_STARTING_BALANCE, &log), Some(155));
        assert_eq!(fold_balance(0, std::iter::empty::<&TransactionRecord>()), Some(0));
    }

    #[test]
    fn request_uses_type_field_on_the_wire() {
        let json = r#"{"idempotency_key":"k1","user_id":"u1","amount":10,"type":"debit"}"#;
        let request: TransactRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, TransactRequest::debit("k1", "u1", 10));
    }

    #[test]
    fn record_serializes_kind_in_snake_case() {
        let json = serde_json::to_value(record("k1", 10, TransactionKind::Credit)).unwrap();
        assert_eq!(json["kind"], "credit");
        assert_eq!(json["idempotency_key"], "k1");
    }
}
