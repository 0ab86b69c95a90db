use std::collections::BTreeMap;

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, GENERIC_REMOTE_MESSAGE};

/// Response headers: lower-case name to every value, in arrival order.
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// Successful outcome of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    status: u16,
    headers: ResponseHeaders,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Get the status code
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the response headers
    #[must_use]
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Decoded payload; `None` when the service sent no body.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the response and return the decoded payload
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

pub fn collect_headers(headers: &HeaderMap) -> ResponseHeaders {
    let mut collected = ResponseHeaders::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_owned())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

/// Turn a received response into a typed outcome.
///
/// `204` is an error, other 2xx statuses decode the body when `decode` is
/// set and the body is non-empty, everything else is a remote error.
pub fn classify<T: DeserializeOwned>(
    status: StatusCode,
    headers: ResponseHeaders,
    body: &[u8],
    decode: bool,
) -> Result<ApiResponse<T>, ApiError> {
    if status == StatusCode::NO_CONTENT {
        return Err(ApiError::NoContent { headers });
    }

    if status.is_success() {
        let data = if decode && !body.is_empty() {
            match serde_json::from_slice(body) {
                Ok(data) => Some(data),
                Err(e) => {
                    return Err(ApiError::Deserialization {
                        status: status.as_u16(),
                        message: e.to_string(),
                        headers,
                    });
                }
            }
        } else {
            None
        };
        return Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            data,
        });
    }

    let body = String::from_utf8(body.to_vec()).unwrap_or_default();
    let message = if body.is_empty() {
        GENERIC_REMOTE_MESSAGE.to_owned()
    } else {
        body.clone()
    };
    Err(ApiError::Remote {
        status: status.as_u16(),
        message,
        headers,
        body,
    })
}
