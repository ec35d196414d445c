//! Request handlers
//!
//! Each handler validates its input, calls one storage operation and shapes
//! the reply. Errors become rejections rendered by
//! [`handle_rejection`](crate::error::handle_rejection).

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ttc_core::catalog;
use ttc_core::{
    Donation, DonationId, DonationStats, NewDonation, SimulatedWallet, StatusUpdate,
    TransferRequest,
};
use ttc_store::{CharitySource, DonationStore};
use warp::{Rejection, Reply};

use crate::config::ListLimits;
use crate::error::ApiError;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Donation records
    pub donations: Arc<dyn DonationStore>,
    /// Charity reference data
    pub charities: Arc<dyn CharitySource>,
    /// Simulated wallet
    pub wallet: SimulatedWallet,
    /// Listing limits
    pub limits: ListLimits,
}

impl AppState {
    /// Create state over opened backends
    #[must_use]
    pub fn new(
        donations: Arc<dyn DonationStore>,
        charities: Arc<dyn CharitySource>,
        limits: ListLimits,
    ) -> Self {
        Self {
            donations,
            charities,
            wallet: SimulatedWallet::new(),
            limits,
        }
    }
}

/// Query for `GET /api/donations` and `/api/donations/stats`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict to one donor email
    pub email: Option<String>,
    /// Maximum records returned
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

fn envelope<T: Serialize>(data: T) -> warp::reply::Json {
    warp::reply::json(&Envelope { success: true, data })
}

#[derive(Serialize)]
struct Created {
    id: DonationId,
}

#[derive(Serialize)]
struct Updated {
    success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Transferred {
    success: bool,
    tx_hash: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    backend: &'static str,
}

/// `GET /api/charities`
pub async fn list_charities(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let all = state.charities.list().await.map_err(ApiError::from)?;
    Ok(envelope(catalog::filter_approved(all)))
}

/// `GET /api/charities/{id}`
pub async fn get_charity(id: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    match state.charities.get(&id).await.map_err(ApiError::from)? {
        Some(charity) => Ok(envelope(charity)),
        None => Err(ApiError::NotFound(format!("charity not found: {id}")).into()),
    }
}

/// `POST /api/donations`
pub async fn create_donation(
    request: NewDonation,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let request = request.validated().map_err(ApiError::from)?;

    match state.charities.get(&request.charity).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!("Donation for unknown charity '{}'", request.charity),
        Err(e) => tracing::warn!("Could not check charity '{}': {}", request.charity, e),
    }

    let donation = Donation::from_request(request);
    tracing::info!(
        charity = %donation.charity,
        amount = %donation.amount,
        currency = %donation.currency,
        method = %donation.payment_method,
        "Creating donation {}",
        donation.id
    );

    let id = state
        .donations
        .create(donation)
        .await
        .map_err(ApiError::from)?;
    Ok(warp::reply::json(&Created { id }))
}

/// `PATCH /api/donations/{id}/status`
pub async fn update_status(
    id: String,
    update: StatusUpdate,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("donation id is required".to_string()).into());
    }
    update.validate().map_err(ApiError::from)?;

    let id = DonationId::from(id);
    let donation = state
        .donations
        .update_status(&id, update)
        .await
        .map_err(ApiError::from)?;
    tracing::info!("Donation {} marked {}", id, donation.status);
    Ok(warp::reply::json(&Updated { success: true }))
}

/// `GET /api/donations/{id}`
pub async fn get_donation(id: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let id = DonationId::from(id);
    match state.donations.get(&id).await.map_err(ApiError::from)? {
        Some(donation) => Ok(warp::reply::json(&donation)),
        None => Err(ApiError::NotFound(format!("donation not found: {id}")).into()),
    }
}

/// `GET /api/donations?email=&limit=`
///
/// An email lookup returns every match; `limit` applies to it only when given.
pub async fn list_donations(
    query: ListQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let donations = match query.email.as_deref() {
        // Every match unless the caller asked for fewer
        Some(email) => {
            let mut found = state
                .donations
                .find_by_email(email)
                .await
                .map_err(ApiError::from)?;
            if let Some(limit) = query.limit {
                found.truncate(limit.min(state.limits.max));
            }
            found
        }
        None => state
            .donations
            .list_recent(state.limits.resolve(query.limit))
            .await
            .map_err(ApiError::from)?,
    };
    tracing::debug!("Listing {} donations", donations.len());
    Ok(envelope(donations))
}

/// `GET /api/donations/stats?limit=`
pub async fn donation_stats(
    query: ListQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let limit = state.limits.resolve(query.limit);
    let recent = state
        .donations
        .list_recent(limit)
        .await
        .map_err(ApiError::from)?;
    Ok(envelope(DonationStats::compute(&recent)))
}

/// `POST /api/wallet/transactions`
pub async fn simulate_transfer(
    request: TransferRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let receipt = state.wallet.send(&request).map_err(ApiError::from)?;
    Ok(warp::reply::json(&Transferred {
        success: true,
        tx_hash: receipt.tx_hash,
    }))
}

/// `GET /healthz`
pub async fn health(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&Health {
        status: "ok",
        backend: state.donations.backend(),
    }))
}
