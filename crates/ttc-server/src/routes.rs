//! Route table
//!
//! | Method | Path                          | Handler             |
//! |--------|-------------------------------|---------------------|
//! | GET    | /api/charities                | `list_charities`    |
//! | GET    | /api/charities/{id}           | `get_charity`       |
//! | POST   | /api/donations                | `create_donation`   |
//! | GET    | /api/donations                | `list_donations`    |
//! | GET    | /api/donations/stats          | `donation_stats`    |
//! | GET    | /api/donations/{id}           | `get_donation`      |
//! | PATCH  | /api/donations/{id}/status    | `update_status`     |
//! | POST   | /api/wallet/transactions      | `simulate_transfer` |
//! | GET    | /healthz                      | `health`            |

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::error::handle_rejection;
use crate::handlers::{self, AppState, ListQuery};
use crate::logging;

/// Largest accepted request body
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Charity endpoints
pub fn charities(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "charities")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_charities);

    let get = warp::path!("api" / "charities" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_charity);

    list.or(get)
}

/// Donation endpoints
pub fn donations(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create = warp::path!("api" / "donations")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_donation);

    let list = warp::path!("api" / "donations")
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::list_donations);

    // Must precede the `{id}` route
    let stats = warp::path!("api" / "donations" / "stats")
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::donation_stats);

    let get = warp::path!("api" / "donations" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_donation);

    let update = warp::path!("api" / "donations" / String / "status")
        .and(warp::patch())
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::update_status);

    create.or(list).or(stats).or(get).or(update)
}

/// Wallet endpoint
pub fn wallet(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "wallet" / "transactions")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::simulate_transfer)
}

/// Liveness probe
pub fn health(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("healthz")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::health)
}

/// Full API with error rendering and request logging
pub fn api(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    charities(state.clone())
        .or(donations(state.clone()))
        .or(wallet(state.clone()))
        .or(health(state))
        .recover(handle_rejection)
        .with(logging::request_log())
}
