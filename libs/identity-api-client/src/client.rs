use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;

use crate::body::{MultipartPart, Payload, serialize};
use crate::config::{ApiClientConfig, JsonSettings};
use crate::credentials::AppCredentials;
use crate::date::DateFormat;
use crate::error::ApiError;
use crate::media::{select_header_accept, select_header_content_type};
use crate::params::{CollectionFormat, Pair, ParamValue, expand_pairs};
use crate::request::{Operation, PreparedRequest, QueryEntry, Verb};
use crate::response::{ApiResponse, classify, collect_headers};
use crate::url::build_url;

const X_HTTP_METHOD_OVERRIDE: HeaderName = HeaderName::from_static("x-http-method-override");

/// Blocking client for the identity management REST APIs.
///
/// The configuration is immutable while a call runs. Every `with_*` method
/// that touches transport settings returns a client whose transport was
/// rebuilt from the updated configuration.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    transport: Client,
}

impl ApiClient {
    /// Client for the default service endpoint.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be built.
    pub fn new() -> Result<Self, ApiError> {
        Self::from_config(ApiClientConfig::default())
    }

    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be built.
    pub fn from_config(config: ApiClientConfig) -> Result<Self, ApiError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Get the client configuration
    #[must_use]
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Get the base path every request URL starts with
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    /// Check whether request and response summaries are logged
    #[must_use]
    pub fn is_debugging(&self) -> bool {
        self.config.debugging
    }

    /// Get the date format
    #[must_use]
    pub fn date_format(&self) -> &DateFormat {
        &self.config.date_format
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    /// Header sent on every request unless a call sets it explicitly.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: AppCredentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be rebuilt.
    pub fn with_debugging(mut self, debugging: bool) -> Result<Self, ApiError> {
        self.config.debugging = debugging;
        self.rebuild_transport()
    }

    /// Connect timeout in milliseconds; `0` disables it.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be rebuilt.
    pub fn with_connect_timeout(mut self, millis: u64) -> Result<Self, ApiError> {
        self.config.connect_timeout_ms = millis;
        self.rebuild_transport()
    }

    /// Replace the date format used for query parameters, form fields and
    /// instants in JSON bodies.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be rebuilt.
    pub fn with_date_format(mut self, date_format: DateFormat) -> Result<Self, ApiError> {
        self.config.date_format = date_format;
        self.rebuild_transport()
    }

    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be rebuilt.
    pub fn with_json_settings(mut self, json: JsonSettings) -> Result<Self, ApiError> {
        self.config.json = json;
        self.rebuild_transport()
    }

    /// Use a caller-built transport as is. A later settings change rebuilds
    /// it from the configuration.
    #[must_use]
    pub fn with_transport(mut self, transport: Client) -> Self {
        self.transport = transport;
        self
    }

    /// Rebuild the transport from the current configuration.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP transport cannot be built.
    pub fn rebuild_transport(mut self) -> Result<Self, ApiError> {
        self.transport = build_transport(&self.config)?;
        Ok(self)
    }

    #[must_use]
    pub fn format_date(&self, instant: &DateTime<Utc>) -> String {
        self.config.date_format.format(instant)
    }

    /// # Errors
    /// Returns `ApiError::Contract` when `input` does not match the date format.
    pub fn parse_date(&self, input: &str) -> Result<DateTime<Utc>, ApiError> {
        self.config.date_format.parse(input)
    }

    #[must_use]
    pub fn parameter_to_string(&self, value: &ParamValue) -> String {
        value.to_param_string(&self.config.date_format)
    }

    #[must_use]
    pub fn parameter_to_pairs(
        &self,
        format: CollectionFormat,
        name: &str,
        value: &ParamValue,
    ) -> Vec<Pair> {
        expand_pairs(format, name, value, &self.config.date_format)
    }

    /// Build the full request for `operation` without sending it.
    ///
    /// # Errors
    /// Returns `ApiError::Contract` when a header is invalid or the body
    /// cannot be serialized.
    pub fn prepare(&self, operation: &Operation) -> Result<PreparedRequest, ApiError> {
        let query: Vec<Pair> = operation
            .query
            .iter()
            .flat_map(|entry| match entry {
                QueryEntry::Pair(pair) => vec![pair.clone()],
                QueryEntry::Param {
                    format,
                    name,
                    value,
                } => self.parameter_to_pairs(*format, name, value),
            })
            .collect();
        let url = build_url(&self.config.base_path, &operation.path, &query);

        let mut headers = HeaderMap::new();
        if let Some(accept) = select_header_accept(operation.accepts.as_slice()) {
            headers.insert(ACCEPT, header_value(&accept)?);
        }
        for (name, value) in &operation.headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::contract(format!("Invalid header name: {e}")))?;
            if !operation.headers.contains_key(&name) {
                headers.insert(name, header_value(value)?);
            }
        }

        let payload = if operation.verb == Verb::Get {
            Payload::Empty
        } else {
            let content_type = select_header_content_type(operation.content_types.as_slice());
            let payload = serialize(
                operation.body.as_ref(),
                &content_type,
                &operation.form,
                &self.config.date_format,
                &self.config.json,
            )?;
            headers.insert(CONTENT_TYPE, header_value(&content_type)?);
            payload
        };

        if operation.verb == Verb::Patch {
            headers.insert(X_HTTP_METHOD_OVERRIDE, HeaderValue::from_static("PATCH"));
        }

        let mut authorization = header_value(&self.config.credentials.authorization_header())?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        Ok(PreparedRequest::new(operation.verb, url, headers, payload))
    }

    /// Send `operation` and decode a successful body into `T`.
    ///
    /// # Errors
    /// - `ApiError::Contract` for invalid inputs, before any I/O
    /// - `ApiError::Transport` when no response was received
    /// - `ApiError::NoContent` for `204`
    /// - `ApiError::Remote` for non-2xx statuses
    /// - `ApiError::Deserialization` when a 2xx body does not decode into `T`
    pub fn invoke<T: DeserializeOwned>(
        &self,
        operation: &Operation,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(operation, true)
    }

    /// Send `operation` and ignore any response body.
    ///
    /// # Errors
    /// Same as [`ApiClient::invoke`], minus `ApiError::Deserialization`.
    pub fn invoke_without_result(&self, operation: &Operation) -> Result<ApiResponse<()>, ApiError> {
        self.execute(operation, false)
    }

    fn execute<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        decode: bool,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = self.prepare(operation)?;
        let verb = request.verb();
        let url = request.url().to_owned();

        if self.config.debugging {
            tracing::debug!(
                %verb,
                %url,
                headers = ?request.headers().keys().collect::<Vec<_>>(),
                form = ?operation.form.iter().map(|(name, _)| name).collect::<Vec<_>>(),
                "Initiating api request"
            );
        }

        let response = self.send(request)?;
        let status = response.status();
        let headers = collect_headers(response.headers());

        if self.config.debugging {
            tracing::debug!(
                %verb,
                %url,
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or_default(),
                "Received api response"
            );
        }

        let body = read_body(response, status, verb, &url)?;
        classify(status, headers, &body, decode)
    }

    fn send(&self, request: PreparedRequest) -> Result<Response, ApiError> {
        let (method, url, mut headers, payload) = request.into_parts();
        let builder = self.transport.request(method.clone(), &url);

        let builder = match payload {
            Payload::Empty => builder.headers(headers),
            Payload::Bytes(bytes) => builder.headers(headers).body(bytes.to_vec()),
            Payload::Form(form) => builder.headers(headers).body(form),
            Payload::Multipart(parts) => {
                headers.remove(CONTENT_TYPE);
                attach_multipart(builder.headers(headers), parts, &url)?
            }
        };

        builder.send().map_err(|e| {
            tracing::error!(
                %method,
                %url,
                error = %e,
                "Error while performing the request"
            );
            ApiError::transport()
        })
    }
}

fn build_transport(config: &ApiClientConfig) -> Result<Client, ApiError> {
    Client::builder()
        .redirect(Policy::none())
        .connect_timeout(config.connect_timeout())
        .timeout(None::<Duration>)
        .connection_verbose(config.debugging)
        .build()
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build HTTP transport");
            ApiError::transport()
        })
}

fn attach_multipart(
    builder: RequestBuilder,
    parts: Vec<MultipartPart>,
    url: &str,
) -> Result<RequestBuilder, ApiError> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File { name, path } => form.file(name, &path).map_err(|e| {
                tracing::error!(
                    %url,
                    path = %path.display(),
                    error = %e,
                    "Cannot read multipart file"
                );
                ApiError::transport()
            })?,
        };
    }
    Ok(builder.multipart(form))
}

/// Read the whole body. A failed read is fatal for 2xx responses and yields
/// an empty body otherwise.
fn read_body(response: Response, status: StatusCode, verb: Verb, url: &str) -> Result<Bytes, ApiError> {
    match response.bytes() {
        Ok(body) => Ok(body),
        Err(e) if status.is_success() && status != StatusCode::NO_CONTENT => {
            tracing::error!(%verb, %url, error = %e, "Error while reading the response body");
            Err(ApiError::transport())
        }
        Err(e) => {
            tracing::debug!(%verb, %url, error = %e, "Unreadable error response body");
            Ok(Bytes::new())
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::contract(format!("Invalid header value: {e}")))
}
