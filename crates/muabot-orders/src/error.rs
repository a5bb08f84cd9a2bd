// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order placement error types.

use muabot_core::MuabotError;
use thiserror::Error;

/// Which precondition of order placement was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The conversation never captured a customer name.
    MissingName,
    /// The conversation never captured a customer phone.
    MissingPhone,
    /// No product offers are selected.
    EmptySelection,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationFailure::MissingName => "customer name is missing",
            ValidationFailure::MissingPhone => "customer phone is missing",
            ValidationFailure::EmptySelection => "no products are selected",
        };
        f.write_str(s)
    }
}

/// Failure modes of [`place_order`](crate::service::place_order).
///
/// `Validation` and `NotAwaitingConfirmation` are domain outcomes that roll
/// the transaction back without touching any row; `Storage` is an
/// infrastructure failure.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A precondition on the conversation was not met. The conversation
    /// stays in `confirm_order`.
    #[error("order validation failed: {0}")]
    Validation(ValidationFailure),

    /// The conversation was not in `confirm_order` when re-read inside the
    /// transaction. Duplicate confirmations land here and are dropped
    /// silently by the caller.
    #[error("conversation is no longer awaiting confirmation")]
    NotAwaitingConfirmation,

    /// Database or transaction failure.
    #[error(transparent)]
    Storage(#[from] MuabotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_messages() {
        assert_eq!(
            OrderError::Validation(ValidationFailure::MissingPhone).to_string(),
            "order validation failed: customer phone is missing"
        );
        assert_eq!(
            OrderError::Validation(ValidationFailure::EmptySelection).to_string(),
            "order validation failed: no products are selected"
        );
    }

    #[test]
    fn storage_error_is_transparent() {
        let err = OrderError::from(MuabotError::Internal("db gone".into()));
        assert_eq!(err.to_string(), "internal error: db gone");
    }
}
