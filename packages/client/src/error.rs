use thiserror::Error;

use offerdesk_shared::{OfferId, UserId};

use crate::forms::FormError;

/// Failure reported by an offer data source or user directory.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("offer not found: {0}")]
    NotFound(OfferId),

    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error("not authenticated")]
    Unauthorized,
}

/// Failure of a create, edit, or delete action.
///
/// Returned to the caller of the mutation; never folded into the query
/// pipeline's error state.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors at the application boundary: configuration and session storage.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
