//! Request validation.
//!
//! Validation is pure and runs before any storage access. Rules are checked
//! in a fixed order and the first violation is returned.

use crate::error::ValidationError;
use crate::transaction::{TransactRequest, ValidRequest};
use crate::{IdempotencyKey, UserId};

/// Validate a transact request.
///
/// Checks, in order: idempotency key, user id, amount, kind.
///
/// # Errors
///
/// Returns the [`ValidationError`] for the first rule the request breaks.
pub fn validate(request: &TransactRequest) -> Result<ValidRequest, ValidationError> {
    let idempotency_key = IdempotencyKey::new(request.idempotency_key.as_str())
        .map_err(|_| ValidationError::MissingIdempotencyKey)?;
    let user_id = validate_user_id(&request.user_id)?;

    if request.amount <= 0 {
        return Err(ValidationError::NonPositiveAmount {
            amount: request.amount,
        });
    }

    let kind = request.kind.parse()?;

    Ok(ValidRequest {
        idempotency_key,
        user_id,
        amount: request.amount,
        kind,
    })
}

/// Validate a bare user id, as used by balance queries.
///
/// # Errors
///
/// Returns `ValidationError::MissingUserId` if the id is blank.
pub fn validate_user_id(user_id: &str) -> Result<UserId, ValidationError> {
    UserId::new(user_id).map_err(|_| ValidationError::MissingUserId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionKind;

    #[test]
    fn accepts_well_formed_request() {
        let valid = validate(&TransactRequest::credit("k1", "u1", 100)).unwrap();
        assert_eq!(valid.idempotency_key.as_str(), "k1");
        assert_eq!(valid.user_id.as_str(), "u1");
        assert_eq!(valid.amount, 100);
        assert_eq!(valid.kind, TransactionKind::Credit);
    }

    #[test]
    fn rejects_each_field() {
        assert_eq!(
            validate(&TransactRequest::credit("", "u1", 10)),
            Err(ValidationError::MissingIdempotencyKey)
        );
        assert_eq!(
            validate(&TransactRequest::credit("k1", "", 10)),
            Err(ValidationError::MissingUserId)
        );
        assert_eq!(
            validate(&TransactRequest::debit("k1", "u1", 0)),
            Err(ValidationError::NonPositiveAmount { amount: 0 })
        );
        assert_eq!(
            validate(&TransactRequest::debit("k1", "u1", -5)),
            Err(ValidationError::NonPositiveAmount { amount: -5 })
        );
        assert_eq!(
            validate(&TransactRequest::new("k1", "u1", 10, "transfer")),
            Err(ValidationError::InvalidKind {
                kind: "transfer".into()
            })
        );
    }

    #[test]
    fn short_circuits_in_fixed_order() {
        // Every field is bad; the key is reported first.
        let request = TransactRequest::new("", "", -1, "bogus");
        assert_eq!(validate(&request), Err(ValidationError::MissingIdempotencyKey));

        let request = TransactRequest::new("k1", " ", -1, "bogus");
        assert_eq!(validate(&request), Err(ValidationError::MissingUserId));

        let request = TransactRequest::new("k1", "u1", -1, "bogus");
        assert_eq!(
            validate(&request),
            Err(ValidationError::NonPositiveAmount { amount: -1 })
        );
    }

    #[test]
    fn user_id_must_not_be_blank() {
        assert!(validate_user_id("u1").is_ok());
        assert_eq!(validate_user_id(""), Err(ValidationError::MissingUserId));
    }
}
