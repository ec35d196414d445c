//! Primary/fallback composition
//!
//! Calls go to the primary store. When the primary fails for a backend
//! reason the same call is served by the fallback, so donations are still
//! taken while the hosted collection is unreachable. Records that only the
//! fallback knows about stay addressable by id and appear in listings and
//! email lookups alongside the primary's records.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use ttc_core::{Donation, DonationId, StatusUpdate};

use crate::error::StoreResult;
use crate::store::{sort_newest_first, DonationStore};

/// Two-tier donation store
#[derive(Clone)]
pub struct FailoverStore {
    primary: Arc<dyn DonationStore>,
    fallback: Arc<dyn DonationStore>,
}

impl std::fmt::Debug for FailoverStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverStore")
            .field("primary", &self.primary.backend())
            .field("fallback", &self.fallback.backend())
            .finish()
    }
}

impl FailoverStore {
    /// Compose a primary with its fallback
    #[inline]
    #[must_use]
    pub fn new(primary: Arc<dyn DonationStore>, fallback: Arc<dyn DonationStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl DonationStore for FailoverStore {
    async fn create(&self, donation: Donation) -> StoreResult<DonationId> {
        match self.primary.create(donation.clone()).await {
            Err(e) if e.is_backend() => {
                tracing::warn!(
                    "{} create failed, using {}: {}",
                    self.primary.backend(),
                    self.fallback.backend(),
                    e
                );
                self.fallback.create(donation).await
            }
            other => other,
        }
    }

    async fn update_status(&self, id: &DonationId, update: StatusUpdate) -> StoreResult<Donation> {
        match self.primary.update_status(id, update.clone()).await {
            Err(e) if e.is_backend() || e.is_not_found() => {
                if e.is_backend() {
                    tracing::warn!(
                        "{} update failed, using {}: {}",
                        self.primary.backend(),
                        self.fallback.backend(),
                        e
                    );
                }
                self.fallback.update_status(id, update).await
            }
            other => other,
        }
    }

    async fn get(&self, id: &DonationId) -> StoreResult<Option<Donation>> {
        match self.primary.get(id).await {
            Ok(Some(found)) => Ok(Some(found)),
            Ok(None) => self.fallback.get(id).await,
            Err(e) if e.is_backend() => {
                tracing::warn!("{} get failed: {}", self.primary.backend(), e);
                self.fallback.get(id).await
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Donation>> {
        let primary = match self.primary.find_by_email(email).await {
            Ok(found) => found,
            Err(e) if e.is_backend() => {
                tracing::warn!("{} lookup failed: {}", self.primary.backend(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let fallback = self.fallback.find_by_email(email).await?;
        Ok(merge(primary, fallback))
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Donation>> {
        let primary = match self.primary.list_recent(limit).await {
            Ok(found) => found,
            Err(e) if e.is_backend() => {
                tracing::warn!("{} listing failed: {}", self.primary.backend(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let fallback = self.fallback.list_recent(limit).await?;
        let mut merged = merge(primary, fallback);
        merged.truncate(limit);
        Ok(merged)
    }

    fn backend(&self) -> &'static str {
        "failover"
    }
}

/// Union of both tiers, newest first; the primary copy wins on equal ids
fn merge(primary: Vec<Donation>, fallback: Vec<Donation>) -> Vec<Donation> {
    let mut seen: HashSet<DonationId> = primary.iter().map(|d| d.id.clone()).collect();
    let mut merged = primary;
    merged.extend(fallback.into_iter().filter(|d| seen.insert(d.id.clone())));
    sort_newest_first(&mut merged);
    merged
}
