//! In-process donation store
//!
//! Records live for the lifetime of the process only.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ttc_core::{Donation, DonationId, StatusUpdate};

use crate::error::{StoreError, StoreResult};
use crate::store::{sort_newest_first, DonationStore};

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<DonationId, Donation>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store preloaded with records (later duplicates win)
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Donation>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.id.clone(), record);
        }
        store
    }

    /// Number of stored records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of every record, newest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<Donation> {
        let mut all: Vec<Donation> = self.records.iter().map(|r| r.value().clone()).collect();
        sort_newest_first(&mut all);
        all
    }

    pub(crate) fn insert(&self, donation: Donation) -> StoreResult<DonationId> {
        match self.records.entry(donation.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(donation.id)),
            Entry::Vacant(slot) => {
                let id = donation.id.clone();
                slot.insert(donation);
                Ok(id)
            }
        }
    }

    /// Apply an update, returning the previous and new record
    pub(crate) fn apply(
        &self,
        id: &DonationId,
        update: &StatusUpdate,
    ) -> StoreResult<(Donation, Donation)> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let previous = entry.clone();
        entry.apply(update)?;
        Ok((previous, entry.clone()))
    }

    pub(crate) fn remove(&self, id: &DonationId) {
        self.records.remove(id);
    }

    pub(crate) fn restore(&self, donation: Donation) {
        self.records.insert(donation.id.clone(), donation);
    }
}

#[async_trait]
impl DonationStore for MemoryStore {
    async fn create(&self, donation: Donation) -> StoreResult<DonationId> {
        let id = self.insert(donation)?;
        tracing::debug!("Stored donation {} in memory", id);
        Ok(id)
    }

    async fn update_status(&self, id: &DonationId, update: StatusUpdate) -> StoreResult<Donation> {
        let (_, updated) = self.apply(id, &update)?;
        tracing::debug!("Donation {} is now {}", id, updated.status);
        Ok(updated)
    }

    async fn get(&self, id: &DonationId) -> StoreResult<Option<Donation>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Donation>> {
        let mut matches: Vec<Donation> = self
            .records
            .iter()
            .filter(|r| r.donor.email == email)
            .map(|r| r.value().clone())
            .collect();
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Donation>> {
        let mut all = self.snapshot();
        all.truncate(limit);
        Ok(all)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ttc_core::{DomainError, DonationStatus};
    use ttc_test_utils::{donation_for, sample_donation};

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryStore::new();
        let donation = sample_donation();
        let id = store.create(donation.clone()).await.unwrap();
        assert_eq!(id, donation.id);
        assert_eq!(store.get(&id).await.unwrap(), Some(donation));
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let donation = sample_donation();
        store.create(donation.clone()).await.unwrap();
        let err = store.create(donation).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_touches_only_target() {
        let store = MemoryStore::new();
        let a = sample_donation();
        let b = sample_donation();
        store.create(a.clone()).await.unwrap();
        store.create(b.clone()).await.unwrap();

        let updated = store
            .update_status(
                &a.id,
                StatusUpdate::new(DonationStatus::Completed).with_transaction_hash("0xfeed"),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, DonationStatus::Completed);
        assert_eq!(updated.transaction_hash.as_deref(), Some("0xfeed"));
        assert_eq!(store.get(&b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn update_unknown_id_mutates_nothing() {
        let store = MemoryStore::new();
        let a = sample_donation();
        store.create(a.clone()).await.unwrap();

        let err = store
            .update_status(
                &DonationId::from("missing"),
                StatusUpdate::new(DonationStatus::Failed),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.snapshot(), vec![a]);
    }

    #[tokio::test]
    async fn terminal_records_reject_second_update() {
        let store = MemoryStore::new();
        let a = sample_donation();
        store.create(a.clone()).await.unwrap();
        store
            .update_status(&a.id, StatusUpdate::new(DonationStatus::Failed))
            .await
            .unwrap();

        let err = store
            .update_status(&a.id, StatusUpdate::new(DonationStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::InvalidTransition { .. })
        ));
        let stored = store.get(&a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DonationStatus::Failed);
    }

    #[tokio::test]
    async fn email_lookup_is_exact_and_case_sensitive() {
        let store = MemoryStore::new();
        store.create(donation_for("a@x.com", 10)).await.unwrap();
        store.create(donation_for("a@x.com", 20)).await.unwrap();
        store.create(donation_for("A@x.com", 30)).await.unwrap();
        store.create(donation_for("a@x.co", 40)).await.unwrap();

        let found = store.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.donor.email == "a@x.com"));
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_bounded() {
        let store = MemoryStore::new();
        for amount in 1..=5 {
            store.create(donation_for("a@x.com", amount)).await.unwrap();
        }
        let recent = store.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
        assert!(store.list_recent(0).await.unwrap().is_empty());
        assert_eq!(store.list_recent(50).await.unwrap().len(), 5);
    }
}
