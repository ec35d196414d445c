//! Trace the Change - storage
//!
//! One polymorphic interface per record family with interchangeable backends:
//! - [`MemoryStore`]: process-local
//! - [`JsonFileStore`]: process-local, mirrored to a JSON file
//! - [`HostedStore`]: hosted document collection over the Data API
//! - [`FailoverStore`]: hosted primary with a local fallback
//!
//! Backends are chosen once at startup from a [`StoreConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ttc_store::StoreConfig;
//!
//! let backends = StoreConfig::new().apply_env().open().await?;
//! let id = backends.donations.create(donation).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod failover;
pub mod file;
pub mod hosted;
pub mod memory;
pub mod store;

pub use config::{Backends, HostedConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use failover::FailoverStore;
pub use file::JsonFileStore;
pub use hosted::{DataApiClient, HostedCharities, HostedStore};
pub use memory::MemoryStore;
pub use store::{CharitySource, DonationStore, StaticCharities};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
