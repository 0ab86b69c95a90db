use http::StatusCode;
use thiserror::Error;

use crate::response::ResponseHeaders;

/// Message reported for every transport failure. The underlying cause is
/// logged, never returned to the caller.
pub const BACKEND_UNAVAILABLE: &str = "Error while accessing the backend service";

/// Message of the empty-result error raised for `204 No Content`.
pub const NO_CONTENT_FOUND: &str = "No content Found";

/// Placeholder message for remote errors that carry no body.
pub const GENERIC_REMOTE_MESSAGE: &str = "error";

/// Structured error returned by every [`ApiClient`](crate::ApiClient) call.
///
/// Each variant maps to a numeric status through [`ApiError::status`], so
/// callers can branch on the status the same way for local and remote
/// failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The inputs of the call were rejected before any network I/O.
    #[error("{message}")]
    Contract { message: String },

    /// The request never produced a response (connection refused, timeout,
    /// malformed exchange).
    #[error("{message}")]
    Transport { message: String },

    /// The service answered `204 No Content`.
    ///
    /// This is an error and not an empty success: callers that expect
    /// "deleted, nothing to return" semantics must match on this variant.
    #[error("No content Found")]
    NoContent { headers: ResponseHeaders },

    /// The service answered with a non-2xx status.
    #[error("HTTP error: status={status}: {message}")]
    Remote {
        status: u16,
        message: String,
        headers: ResponseHeaders,
        body: String,
    },

    /// A 2xx body could not be decoded into the requested type.
    #[error("Deserialization error: {message}")]
    Deserialization {
        status: u16,
        message: String,
        headers: ResponseHeaders,
    },
}

impl ApiError {
    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    pub(crate) fn transport() -> Self {
        Self::Transport {
            message: BACKEND_UNAVAILABLE.to_owned(),
        }
    }

    /// Numeric status of the failure. Local failures report `500`.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Contract { .. } | Self::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR.as_u16()
            }
            Self::NoContent { .. } => StatusCode::NO_CONTENT.as_u16(),
            Self::Remote { status, .. } | Self::Deserialization { status, .. } => *status,
        }
    }

    /// Human-readable message, without the status prefix added by `Display`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Contract { message }
            | Self::Transport { message }
            | Self::Remote { message, .. }
            | Self::Deserialization { message, .. } => message,
            Self::NoContent { .. } => NO_CONTENT_FOUND,
        }
    }

    /// Response headers, when the error came back from the service.
    #[must_use]
    pub fn headers(&self) -> Option<&ResponseHeaders> {
        match self {
            Self::NoContent { headers }
            | Self::Remote { headers, .. }
            | Self::Deserialization { headers, .. } => Some(headers),
            Self::Contract { .. } | Self::Transport { .. } => None,
        }
    }

    /// Raw response body of a remote error.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Remote { body, .. } => Some(body),
            _ => None,
        }
    }
}
