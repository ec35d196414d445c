//! Trace the Change - donation domain
//!
//! Storage-agnostic core of the donation service:
//! - Donation and charity records with their wire format
//! - Server-side payload validation
//! - The default charity catalog
//! - Dashboard statistics
//! - A simulated wallet for crypto confirmations
//!
//! # Example
//!
//! ```rust,ignore
//! use ttc_core::{Donation, NewDonation, StatusUpdate, DonationStatus};
//!
//! let request: NewDonation = serde_json::from_str(body)?.validated()?;
//! let mut donation = Donation::from_request(request);
//! donation.apply(&StatusUpdate::new(DonationStatus::Completed))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod stats;
pub mod types;
pub mod validation;
pub mod wallet;

pub use error::{DomainError, ValidationError};
pub use stats::{Bucket, DailyAmount, DonationStats, Trend};
pub use types::{
    Charity, Donation, DonationId, DonationStatus, Donor, NewDonation, PaymentMethod,
    StatusUpdate,
};
pub use wallet::{SimulatedWallet, TransactionReceipt, TransferRequest};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with donation records
    pub use crate::{
        Charity, Donation, DonationId, DonationStatus, Donor, NewDonation, PaymentMethod,
        StatusUpdate,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
