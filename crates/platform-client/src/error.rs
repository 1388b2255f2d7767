//! Error type for platform API calls.

/// Error raised when a platform API call fails.
///
/// A check endpoint reporting a failed validation is not an error; the
/// check methods return `false` for that. This type covers the cases where
/// the call itself did not complete: the request never got an answer, the
/// platform answered with a non-success status, or the body could not be
/// decoded into the expected record.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request could not be sent or timed out before a response arrived.
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The platform answered with an HTTP status outside the success range.
    ///
    /// `message` is the structured `message` field of the error body when
    /// the body is JSON carrying one, otherwise the whole body text.
    #[error("{method} {path} returned HTTP {status}: {message}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },

    /// A successful response carried a body that is not JSON of the
    /// expected shape.
    #[error("Undecodable response from {method} {path}: {body}")]
    Decode {
        method: &'static str,
        path: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The HTTP status code, when the platform answered with one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
