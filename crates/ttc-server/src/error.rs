//! Error types for the HTTP surface
//!
//! Every failure leaves the service as `{"error": message}` with a status
//! code chosen by cause:
//! - 400 for payloads that fail validation or do not parse
//! - 404 for unknown records and routes
//! - 411 for bodies sent without a length
//! - 409 for status changes a record no longer allows
//! - 502 when the hosted collection fails
//! - 500 for anything else

use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use ttc_core::{DomainError, ValidationError};
use ttc_store::StoreError;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Request-level error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Payload rejected
    #[error("{0}")]
    BadRequest(String),

    /// Record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record state does not allow the change
    #[error("{0}")]
    Conflict(String),

    /// Hosted backend failed
    #[error("storage backend unavailable: {0}")]
    Backend(String),

    /// Unexpected failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl warp::reject::Reject for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        if e.is_validation() {
            Self::BadRequest(e.to_string())
        } else {
            Self::Conflict(e.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound(e.to_string()),
            StoreError::Domain(domain) => domain.into(),
            StoreError::Duplicate(_) => Self::Conflict(e.to_string()),
            StoreError::Http(_) | StoreError::Hosted { .. } => Self::Backend(e.to_string()),
            StoreError::Io { .. } | StoreError::Serialization(_) | StoreError::Config(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the schema
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Turn any rejection into a JSON error reply
///
/// # Errors
/// Never; the `Result` satisfies `warp::Filter::recover`.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(api) = err.find::<ApiError>() {
        if matches!(api, ApiError::Backend(_) | ApiError::Internal(_)) {
            tracing::error!("Request failed: {}", api);
        }
        (api.status(), api.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("invalid body: {e}"))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "content-length header is required".to_string(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected application/json".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error: message }),
        status,
    ))
}
