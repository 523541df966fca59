//! Error types for Yahoo OAuth operations

/// Transport-level failures. An explicit error payload from the token
/// endpoint is not an `Error`; it comes back as `TokenGrant::Rejected`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
