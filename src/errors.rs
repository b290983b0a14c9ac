//! Error taxonomy for backend interactions.
//!
//! Two kinds matter to callers: the request never completed
//! ([`ApiError::Network`]) and a single resource does not exist
//! ([`ApiError::NotFound`]). Everything else collapses into a generic
//! API failure carrying whatever message the server provided.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected, refused, or timed out before a
    /// response arrived.
    #[error("{0}")]
    Network(String),

    /// A single-resource fetch returned 404.
    #[error("{resource} not found. It may have been deleted.")]
    NotFound { resource: String },

    /// Any other non-success response. `message` is the server's
    /// `{"error": ...}` body when present, else the raw body.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
