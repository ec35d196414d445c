//! Error types for the storage layer
//!
//! Distinguishes caller-visible outcomes (not found, conflicting status) from
//! backend failures, which the failover store uses to decide when to switch
//! to the local tier.

use std::path::PathBuf;
use ttc_core::{DomainError, DonationId};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id
    #[error("donation not found: {0}")]
    NotFound(DonationId),

    /// Record with this id already stored
    #[error("duplicate donation id: {0}")]
    Duplicate(DonationId),

    /// Domain rule rejected the operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Local file could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failure talking to the hosted collection
    #[error("hosted request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Hosted collection answered with an error
    #[error("hosted {command} failed: {message}")]
    Hosted { command: String, message: String },

    /// Backend misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create hosted command error
    pub fn hosted(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hosted {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Check if the record was missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the request conflicts with the record's current state
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Duplicate(_) | Self::Domain(DomainError::InvalidTransition { .. })
        )
    }

    /// Check if the failure came from the backend rather than the request
    #[inline]
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Serialization(_) | Self::Http(_) | Self::Hosted { .. }
        )
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
