//! Identity API Client
//!
//! Blocking HTTP client shared by the generated identity management REST
//! bindings. It builds URLs and query strings, negotiates content types,
//! serializes bodies (JSON, form-urlencoded, multipart), authenticates with
//! the `Client` application scheme and classifies responses into typed
//! results or [`ApiError`]s.
//!
//! # Examples
//!
//! ```no_run
//! use identity_api_client::{ApiClient, ApiClientConfig, AppCredentials, Operation, Verb};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_config(ApiClientConfig::from_env()?)?
//!     .with_credentials(AppCredentials::new("dashboard", "dashboard"));
//!
//! let operation = Operation::builder()
//!     .verb(Verb::Post)
//!     .path("/recover-password")
//!     .query("type", "email")
//!     .json(&json!({"user": {"username": "admin"}}))?
//!     .accepts(["application/json"])
//!     .content_types(["application/json"])
//!     .build()?;
//!
//! let response = client.invoke::<serde_json::Value>(&operation)?;
//! if let Some(data) = response.data() {
//!     println!("{}: {data}", response.status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Calls that expect no payload use [`ApiClient::invoke_without_result`].
//! A `204 No Content` reply is reported as [`ApiError::NoContent`].

mod body;
mod client;
mod config;
mod credentials;
mod date;
mod error;
mod media;
mod params;
mod request;
mod response;
mod url;

// Re-export public API
pub use body::{FormValue, MultipartPart, Payload};
pub use client::ApiClient;
pub use config::{
    ApiClientConfig, ConfigError, ENV_PREFIX, JsonSettings, RECOVERY_API_RELATIVE_PATH,
    ServiceEndpoint,
};
pub use credentials::AppCredentials;
pub use date::{DEFAULT_DATE_PATTERN, DateFormat};
pub use error::{ApiError, BACKEND_UNAVAILABLE, NO_CONTENT_FOUND};
pub use media::{
    APPLICATION_JSON, FORM_URLENCODED, MULTIPART_FORM_DATA, is_json_mime, select_header_accept,
    select_header_content_type,
};
pub use params::{CollectionFormat, Pair, ParamValue};
pub use request::{Operation, OperationBuilder, PreparedRequest, Verb};
pub use response::{ApiResponse, ResponseHeaders};
pub use url::escape_string;

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};
