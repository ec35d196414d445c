//! Trace the Change - HTTP service
//!
//! JSON API over the donation store, the charity catalog and the simulated
//! wallet. See [`routes`] for the route table and [`error`] for how failures
//! are reported.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;

pub use config::{CliOverrides, ListLimits, LogConfig, LogFormat, ServiceConfig};
pub use error::{ApiError, ConfigError};
pub use handlers::AppState;

use std::future::Future;
use std::sync::Arc;

/// Open storage, bind and serve until `shutdown` resolves
///
/// # Errors
/// - Storage backends that fail to open
/// - An address that cannot be bound
pub async fn run(
    config: &ServiceConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let backends = config.store.open().await?;
    let state = Arc::new(AppState::new(
        backends.donations,
        backends.charities,
        config.limits,
    ));

    let (addr, server) =
        warp::serve(routes::api(state)).try_bind_with_graceful_shutdown(config.bind, shutdown)?;
    tracing::info!("Listening on http://{}", addr);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Seed the hosted charity collection
///
/// Returns the number of records inserted; zero when the collection already
/// had data or no hosted backend is configured.
///
/// # Errors
/// Storage failures while opening or writing.
pub async fn seed(config: &ServiceConfig) -> anyhow::Result<usize> {
    let backends = config.store.open().await?;
    match backends.seeder {
        Some(seeder) => Ok(seeder.seed_if_empty().await?),
        None => {
            tracing::warn!("No hosted database configured; nothing to seed");
            Ok(0)
        }
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
