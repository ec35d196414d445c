//! Server-side payload validation
//!
//! Every payload is re-checked here regardless of what the browser form
//! already enforced, so direct API calls cannot store malformed records.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{NewDonation, StatusUpdate};

/// Maximum length of the optional donor message
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Largest accepted donation amount, in currency units
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Check an email address against a permissive `local@domain.tld` shape
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

impl NewDonation {
    /// Validate and normalize a creation payload
    ///
    /// The currency code is upper-cased; every other field is kept as sent.
    ///
    /// # Errors
    /// The first rule the payload breaks, checked in field order.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        require(&self.donor.first_name, "donor.firstName")?;
        require(&self.donor.last_name, "donor.lastName")?;
        require(&self.donor.email, "donor.email")?;
        if !is_valid_email(&self.donor.email) {
            return Err(ValidationError::InvalidEmail(self.donor.email));
        }
        require(&self.charity, "charity")?;

        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(MAX_AMOUNT));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(self.currency));
        }
        self.currency = self.currency.to_ascii_uppercase();

        if let Some(message) = &self.message {
            if message.chars().count() > MAX_MESSAGE_LEN {
                return Err(ValidationError::TooLong {
                    field: "message",
                    max: MAX_MESSAGE_LEN,
                });
            }
        }

        Ok(self)
    }
}

impl StatusUpdate {
    /// Validate a status update payload
    ///
    /// # Errors
    /// - `ValidationError::NonTerminalStatus` if the target is `pending`
    /// - `ValidationError::MissingField` if a blank transaction hash is supplied
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.status.is_terminal() {
            return Err(ValidationError::NonTerminalStatus(self.status));
        }
        if let Some(hash) = &self.transaction_hash {
            require(hash, "transactionHash")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DonationStatus, Donor, PaymentMethod};
    use proptest::prelude::*;

    fn request() -> NewDonation {
        NewDonation {
            donor: Donor {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.org".to_string(),
                phone: Some("555-0100".to_string()),
                is_anonymous: false,
            },
            charity: "education-for-all".to_string(),
            amount: Decimal::new(2550, 2),
            currency: "usd".to_string(),
            payment_method: PaymentMethod::Paypal,
            message: Some("keep going".to_string()),
        }
    }

    #[test]
    fn accepts_and_normalizes_currency() {
        let valid = request().validated().unwrap();
        assert_eq!(valid.currency, "USD");
        assert_eq!(valid.amount, Decimal::new(2550, 2));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut r = request();
        r.amount = Decimal::ZERO;
        assert_eq!(r.validated().unwrap_err(), ValidationError::NonPositiveAmount);

        let mut r = request();
        r.amount = Decimal::new(-1, 0);
        assert_eq!(r.validated().unwrap_err(), ValidationError::NonPositiveAmount);
    }

    #[test]
    fn rejects_amount_over_maximum() {
        let mut r = request();
        r.amount = MAX_AMOUNT;
        assert!(r.validated().is_ok());

        let mut r = request();
        r.amount = Decimal::from_scientific("5e28").unwrap();
        assert_eq!(
            r.validated().unwrap_err(),
            ValidationError::AmountTooLarge(MAX_AMOUNT)
        );
    }

    #[test]
    fn rejects_blank_donor_fields() {
        let mut r = request();
        r.donor.last_name = "   ".to_string();
        assert_eq!(
            r.validated().unwrap_err(),
            ValidationError::MissingField("donor.lastName")
        );
    }

    #[test]
    fn rejects_bad_email_and_currency() {
        let mut r = request();
        r.donor.email = "not-an-email".to_string();
        assert!(matches!(r.validated(), Err(ValidationError::InvalidEmail(_))));

        let mut r = request();
        r.currency = "US".to_string();
        assert!(matches!(r.validated(), Err(ValidationError::InvalidCurrency(_))));
    }

    #[test]
    fn rejects_long_message() {
        let mut r = request();
        r.message = Some("x".repeat(MAX_MESSAGE_LEN + 1));
        assert!(matches!(r.validated(), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn status_update_must_be_terminal() {
        assert!(StatusUpdate::new(DonationStatus::Completed).validate().is_ok());
        assert!(StatusUpdate::new(DonationStatus::Failed).validate().is_ok());
        assert_eq!(
            StatusUpdate::new(DonationStatus::Pending).validate(),
            Err(ValidationError::NonTerminalStatus(DonationStatus::Pending))
        );
        assert!(StatusUpdate::new(DonationStatus::Completed)
            .with_transaction_hash(" ")
            .validate()
            .is_err());
    }

    proptest! {
        #[test]
        fn prop_positive_amounts_pass(cents in 1i64..10_000_000) {
            let mut r = request();
            r.amount = Decimal::new(cents, 2);
            prop_assert!(r.validated().is_ok());
        }

        #[test]
        fn prop_emails_without_at_fail(local in "[a-z]{1,12}", domain in "[a-z]{1,12}") {
            let mut r = request();
            r.donor.email = format!("{local}{domain}.com");
            prop_assert!(r.validated().is_err());
        }
    }
}
