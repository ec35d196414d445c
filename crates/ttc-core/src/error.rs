//! Error types for the donation domain
//!
//! Separates the two failure families the domain can produce on its own:
//! - Validation of incoming payloads
//! - Illegal lifecycle operations on a record

use rust_decimal::Decimal;

use crate::types::DonationStatus;

/// Domain rule violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Payload failed validation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Status change not allowed from the current state
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: DonationStatus,
        to: DonationStatus,
    },

    /// Status text not recognised
    #[error("unknown status: '{0}'")]
    UnknownStatus(String),
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Amount zero or negative
    #[error("amount must be a positive number")]
    NonPositiveAmount,

    /// Amount above the accepted maximum
    #[error("amount must not exceed {0}")]
    AmountTooLarge(Decimal),

    /// Required text field missing or blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Email does not look like an address
    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    /// Currency is not a three letter code
    #[error("invalid currency code: '{0}'")]
    InvalidCurrency(String),

    /// Free text over the allowed length
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Status update targets a non-terminal status
    #[error("status must be 'completed' or 'failed', got '{0}'")]
    NonTerminalStatus(DonationStatus),

    /// Wallet recipient is not a `0x` address
    #[error("invalid wallet address: '{0}'")]
    InvalidAddress(String),
}

impl DomainError {
    /// Check if error was caused by the caller's payload
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownStatus(_))
    }
}
