//! Core domain types
//!
//! Defines the records that flow through the service:
//! - Donations and their donors
//! - Status and payment method enumerations
//! - Creation and status-update payloads
//! - Charities (read-mostly reference data)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Unique donation identifier (UUID v4 in hyphenated form)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationId(String);

impl DonationId {
    /// Generate new donation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DonationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DonationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DonationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a donation
///
/// A donation starts `Pending` and moves exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Created, awaiting payment confirmation
    Pending,
    /// Payment confirmed
    Completed,
    /// Payment failed or was abandoned
    Failed,
}

impl DonationStatus {
    /// Wire name of the status
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Check if no further transition is allowed
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Check if `next` is a legal successor of `self`
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Pending && next.is_terminal()
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// How the donor intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Wallet transfer
    Crypto,
    /// Card payment
    CreditCard,
    /// Bank transfer
    BankTransfer,
    /// PayPal
    Paypal,
}

impl PaymentMethod {
    /// Wire name of the payment method
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::CreditCard => "credit-card",
            Self::BankTransfer => "bank-transfer",
            Self::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Donor contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email, matched exactly on lookup
    pub email: String,
    /// Optional phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Hide the donor from public listings
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Creation payload for `POST /api/donations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    /// Donor details
    pub donor: Donor,
    /// Charity identifier (slug)
    pub charity: String,
    /// Amount in `currency` units
    pub amount: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Intended payment method
    pub payment_method: PaymentMethod,
    /// Optional note to the charity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Payload for `PATCH /api/donations/{id}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// Target status (must be terminal)
    pub status: DonationStatus,
    /// Transaction hash to attach, stored unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl StatusUpdate {
    /// Create status update without a transaction hash
    #[inline]
    #[must_use]
    pub fn new(status: DonationStatus) -> Self {
        Self {
            status,
            transaction_hash: None,
        }
    }

    /// With transaction hash
    #[inline]
    #[must_use]
    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }
}

/// A single pledge tracked through pending → terminal status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    /// Identifier assigned at creation
    pub id: DonationId,
    /// Donor details
    pub donor: Donor,
    /// Charity identifier (not checked against the catalog)
    pub charity: String,
    /// Amount in `currency` units
    pub amount: Decimal,
    /// ISO currency code
    pub currency: String,
    /// Intended payment method
    pub payment_method: PaymentMethod,
    /// Optional note to the charity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Lifecycle state
    pub status: DonationStatus,
    /// Attached once the payment settles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Materialize a creation payload into a pending record
    #[must_use]
    pub fn from_request(request: NewDonation) -> Self {
        Self::from_request_at(request, Utc::now())
    }

    /// Same as [`Donation::from_request`] with an explicit creation time
    #[must_use]
    pub fn from_request_at(request: NewDonation, created_at: DateTime<Utc>) -> Self {
        Self {
            id: DonationId::new(),
            donor: request.donor,
            charity: request.charity,
            amount: request.amount,
            currency: request.currency,
            payment_method: request.payment_method,
            message: request.message,
            status: DonationStatus::Pending,
            transaction_hash: None,
            created_at,
        }
    }

    /// Apply a status update in place
    ///
    /// # Errors
    /// - `DomainError::InvalidTransition` if the record already left `Pending`
    pub fn apply(&mut self, update: &StatusUpdate) -> Result<(), DomainError> {
        if !self.status.can_transition_to(update.status) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: update.status,
            });
        }
        self.status = update.status;
        if let Some(hash) = &update.transaction_hash {
            self.transaction_hash = Some(hash.clone());
        }
        Ok(())
    }
}

/// A donation recipient organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charity {
    /// Identifier (slug)
    pub id: String,
    /// Display name
    pub name: String,
    /// Category label
    pub category: String,
    /// Short description
    pub description: String,
    /// Long-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Impact statement
    pub impact: String,
    /// Where the charity operates
    pub location: String,
    /// Image reference
    pub image_url: String,
    /// Optional URL slug, usually equal to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Ordered goals
    #[serde(default)]
    pub goals: Vec<String>,
    /// Wallet address for crypto donations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
}
