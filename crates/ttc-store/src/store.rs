//! Storage seams
//!
//! One interface per record family. Backends are chosen once at startup and
//! handed to the HTTP layer as trait objects.

use async_trait::async_trait;
use ttc_core::{Charity, Donation, DonationId, StatusUpdate};

use crate::error::StoreResult;

/// Persistence for donation records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Store a freshly created record and return its id
    ///
    /// # Errors
    /// - `StoreError::Duplicate` if the id is already present
    /// - Backend errors from the underlying medium
    async fn create(&self, donation: Donation) -> StoreResult<DonationId>;

    /// Move a pending record to a terminal status
    ///
    /// Only the targeted record changes. Concurrent updates to the same id
    /// are decided by whichever reaches the backend first.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if no record has this id (nothing is mutated)
    /// - `StoreError::Domain(InvalidTransition)` if the record is already terminal
    async fn update_status(&self, id: &DonationId, update: StatusUpdate) -> StoreResult<Donation>;

    /// Fetch one record
    async fn get(&self, id: &DonationId) -> StoreResult<Option<Donation>>;

    /// All records whose donor email equals `email` exactly, newest first
    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Donation>>;

    /// Newest records first, at most `limit`
    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Donation>>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Read access to charity reference data
#[async_trait]
pub trait CharitySource: Send + Sync {
    /// Every known charity
    async fn list(&self) -> StoreResult<Vec<Charity>>;

    /// One charity by id
    async fn get(&self, id: &str) -> StoreResult<Option<Charity>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Charities compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCharities;

#[async_trait]
impl CharitySource for StaticCharities {
    async fn list(&self) -> StoreResult<Vec<Charity>> {
        Ok(ttc_core::catalog::default_charities())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Charity>> {
        Ok(ttc_core::catalog::default_charity(id))
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

/// Order records newest first, ties broken by id for a stable listing
pub(crate) fn sort_newest_first(donations: &mut [Donation]) {
    donations.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
