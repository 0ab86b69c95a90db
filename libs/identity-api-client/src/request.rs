use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;

use crate::body::{FormValue, Payload};
use crate::error::ApiError;
use crate::params::{CollectionFormat, Pair, ParamValue};

/// HTTP verbs the client can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    /// Sent as `POST` with `X-HTTP-Method-Override: PATCH`.
    Patch,
}

impl Verb {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Method that actually goes on the wire.
    #[must_use]
    pub fn wire_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post | Self::Patch => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl FromStr for Verb {
    type Err = ApiError;

    /// Names are matched exactly, upper case only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            other => Err(ApiError::contract(format!("unknown method type {other}"))),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query entry; parameters are expanded with the client's date format.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEntry {
    Pair(Pair),
    Param {
        format: CollectionFormat,
        name: String,
        value: ParamValue,
    },
}

/// One logical API call.
#[derive(Debug, Clone)]
pub struct Operation {
    pub(crate) verb: Verb,
    pub(crate) path: String,
    pub(crate) query: Vec<QueryEntry>,
    pub(crate) body: Option<Value>,
    pub(crate) form: Vec<(String, FormValue)>,
    pub(crate) headers: HeaderMap,
    pub(crate) accepts: Vec<String>,
    pub(crate) content_types: Vec<String>,
}

impl Operation {
    /// Create a new operation builder
    #[must_use]
    pub fn builder() -> OperationBuilder {
        OperationBuilder::default()
    }

    /// Get the verb
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Get the sub-path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Builder for [`Operation`] with a fluent API
#[derive(Debug, Default)]
pub struct OperationBuilder {
    verb: Option<Verb>,
    unknown_verb: Option<String>,
    path: String,
    query: Vec<QueryEntry>,
    body: Option<Value>,
    form: Vec<(String, FormValue)>,
    headers: HeaderMap,
    accepts: Vec<String>,
    content_types: Vec<String>,
}

impl OperationBuilder {
    /// Set the verb. Defaults to `GET`.
    #[must_use]
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = Some(verb);
        self.unknown_verb = None;
        self
    }

    /// Set the verb from its name; an unknown name fails at [`build`](Self::build).
    #[must_use]
    pub fn method(mut self, name: &str) -> Self {
        if let Ok(verb) = name.parse::<Verb>() {
            return self.verb(verb);
        }
        self.unknown_verb = Some(name.to_owned());
        self
    }

    /// Sub-path appended to the base path. May carry a constant query string.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Append a pre-built query pair.
    #[must_use]
    pub fn query_pair(mut self, pair: Pair) -> Self {
        self.query.push(QueryEntry::Pair(pair));
        self
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = Pair>) -> Self {
        self.query.extend(pairs.into_iter().map(QueryEntry::Pair));
        self
    }

    /// Append a parameter in `csv` collection format.
    #[must_use]
    pub fn query(self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query_with_format(CollectionFormat::Csv, name, value)
    }

    #[must_use]
    pub fn query_with_format(
        mut self,
        format: CollectionFormat,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.query.push(QueryEntry::Param {
            format,
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a per-call header; it takes priority over the client defaults.
    ///
    /// # Errors
    /// Returns `ApiError::Contract` for an invalid header name or value.
    pub fn header<K, V>(mut self, key: K, value: V) -> Result<Self, ApiError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: fmt::Display,
        V::Error: fmt::Display,
    {
        let key = key
            .try_into()
            .map_err(|e| ApiError::contract(format!("Invalid header name: {e}")))?;
        let value = value
            .try_into()
            .map_err(|e| ApiError::contract(format!("Invalid header value: {e}")))?;
        self.headers.insert(key, value);
        Ok(self)
    }

    /// Set the body to a JSON-serializable value.
    ///
    /// # Errors
    /// Returns `ApiError::Contract` when the value cannot be serialized.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ApiError::contract(format!("cannot serialize request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Set or replace a form field.
    #[must_use]
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.form.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.form.push((name, value)),
        }
        self
    }

    /// Attach a file; sent as a file part in multipart bodies.
    #[must_use]
    pub fn form_file(self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.form_param(name, FormValue::File(path.into()))
    }

    /// Candidate media types for the `Accept` header.
    #[must_use]
    pub fn accepts<S: Into<String>>(mut self, accepts: impl IntoIterator<Item = S>) -> Self {
        self.accepts = accepts.into_iter().map(Into::into).collect();
        self
    }

    /// Candidate media types for the `Content-Type` header.
    #[must_use]
    pub fn content_types<S: Into<String>>(
        mut self,
        content_types: impl IntoIterator<Item = S>,
    ) -> Self {
        self.content_types = content_types.into_iter().map(Into::into).collect();
        self
    }

    /// Build the operation.
    ///
    /// # Errors
    /// Returns `ApiError::Contract` for an unknown verb name or when both a
    /// body and form fields were supplied.
    pub fn build(self) -> Result<Operation, ApiError> {
        if let Some(name) = self.unknown_verb {
            return Err(ApiError::contract(format!("unknown method type {name}")));
        }
        if self.body.is_some() && !self.form.is_empty() {
            return Err(ApiError::contract("Cannot have body and form params"));
        }

        Ok(Operation {
            verb: self.verb.unwrap_or(Verb::Get),
            path: self.path,
            query: self.query,
            body: self.body,
            form: self.form,
            headers: self.headers,
            accepts: self.accepts,
            content_types: self.content_types,
        })
    }
}

/// Fully built HTTP request, produced by [`ApiClient::prepare`](crate::ApiClient::prepare).
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    verb: Verb,
    url: String,
    headers: HeaderMap,
    payload: Payload,
}

impl PreparedRequest {
    pub(crate) fn new(verb: Verb, url: String, headers: HeaderMap, payload: Payload) -> Self {
        Self {
            verb,
            url,
            headers,
            payload,
        }
    }

    /// Logical verb of the operation.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Method sent on the wire; `PATCH` becomes `POST`.
    #[must_use]
    pub fn method(&self) -> Method {
        self.verb.wire_method()
    }

    /// Get the full URL, query string included
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the request headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the serialized payload
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn into_parts(self) -> (Method, String, HeaderMap, Payload) {
        (self.verb.wire_method(), self.url, self.headers, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verbs_parse_exactly() {
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("PATCH".parse::<Verb>().unwrap(), Verb::Patch);
        let err = "get".parse::<Verb>().unwrap_err();
        assert_eq!(err.message(), "unknown method type get");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn patch_goes_out_as_post() {
        assert_eq!(Verb::Patch.wire_method(), Method::POST);
        assert_eq!(Verb::Delete.wire_method(), Method::DELETE);
    }

    #[test]
    fn unknown_method_fails_at_build() {
        let err = Operation::builder().method("TRACE").path("/x").build().unwrap_err();
        assert!(matches!(err, ApiError::Contract { .. }));
        assert_eq!(err.message(), "unknown method type TRACE");
    }

    #[test]
    fn known_method_name_is_accepted() {
        let op = Operation::builder().method("PUT").build().unwrap();
        assert_eq!(op.verb(), Verb::Put);
    }

    #[test]
    fn body_and_form_are_mutually_exclusive() {
        let err = Operation::builder()
            .verb(Verb::Post)
            .json(&json!({"username": "admin"}))
            .unwrap()
            .form_param("username", "admin")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Contract { .. }));
        assert_eq!(err.message(), "Cannot have body and form params");
    }

    #[test]
    fn body_without_form_is_fine() {
        let op = Operation::builder()
            .verb(Verb::Post)
            .json(&json!({"username": "admin"}))
            .unwrap()
            .build()
            .unwrap();
        assert!(op.body.is_some());
        assert!(op.form.is_empty());
    }

    #[test]
    fn form_param_replaces_same_name() {
        let op = Operation::builder()
            .form_param("code", "1")
            .form_param("code", "2")
            .build()
            .unwrap();
        assert_eq!(op.form, vec![("code".to_owned(), FormValue::from("2"))]);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = Operation::builder().header("bad header", "x").unwrap_err();
        assert!(matches!(err, ApiError::Contract { .. }));
    }

    #[test]
    fn defaults_to_get() {
        let op = Operation::builder().path("/me").build().unwrap();
        assert_eq!(op.verb(), Verb::Get);
        assert_eq!(op.path(), "/me");
    }
}
