use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::JsonSettings;
use crate::date::DateFormat;
use crate::error::ApiError;
use crate::media::{FORM_URLENCODED, MULTIPART_FORM_DATA, is_json_mime};
use crate::params::ParamValue;

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Stringified with the parameter rules before it is sent.
    Value(ParamValue),
    /// Uploaded as a file part in multipart bodies.
    File(PathBuf),
}

impl From<ParamValue> for FormValue {
    fn from(value: ParamValue) -> Self {
        Self::Value(value)
    }
}

macro_rules! form_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FormValue {
                fn from(value: $ty) -> Self {
                    Self::Value(ParamValue::from(value))
                }
            }
        )*
    };
}

form_value_from!(&str, String, i64, i32, u32, f64, bool, DateTime<Utc>);

impl<T: Into<ParamValue>> From<Vec<T>> for FormValue {
    fn from(values: Vec<T>) -> Self {
        Self::Value(ParamValue::from(values))
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

/// Serialized request payload, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// Pre-encoded bytes (JSON or raw text).
    Bytes(Bytes),
    /// `application/x-www-form-urlencoded` body.
    Form(String),
    /// `multipart/form-data` parts; the transport picks the boundary.
    Multipart(Vec<MultipartPart>),
}

impl Payload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Encode the body or form fields according to `content_type`.
pub fn serialize(
    body: Option<&Value>,
    content_type: &str,
    form: &[(String, FormValue)],
    date_format: &DateFormat,
    json: &JsonSettings,
) -> Result<Payload, ApiError> {
    if content_type.starts_with(MULTIPART_FORM_DATA) {
        let parts = form
            .iter()
            .map(|(name, value)| match value {
                FormValue::File(path) => MultipartPart::File {
                    name: name.clone(),
                    path: path.clone(),
                },
                FormValue::Value(v) => MultipartPart::Text {
                    name: name.clone(),
                    value: v.to_param_string(date_format),
                },
            })
            .collect();
        return Ok(Payload::Multipart(parts));
    }

    if content_type.starts_with(FORM_URLENCODED) {
        return Ok(Payload::Form(encode_form(form, date_format)));
    }

    match body {
        None => Ok(Payload::Empty),
        Some(Value::String(text)) if !is_json_mime(content_type) => {
            Ok(Payload::Bytes(Bytes::from(text.clone())))
        }
        Some(value) => {
            let value = normalize(value.clone(), json.omit_null_fields, date_format);
            let encoded = serde_json::to_vec(&value)
                .map_err(|e| ApiError::contract(format!("cannot serialize request body: {e}")))?;
            Ok(Payload::Bytes(Bytes::from(encoded)))
        }
    }
}

/// `key=value` pairs joined by `&`. File references are sent by path.
fn encode_form(form: &[(String, FormValue)], date_format: &DateFormat) -> String {
    form.iter()
        .map(|(name, value)| {
            let value = match value {
                FormValue::Value(v) => v.to_param_string(date_format),
                FormValue::File(path) => path.display().to_string(),
            };
            format!(
                "{}={}",
                form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>(),
                form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Drop `null` object members when `omit_nulls` is set and re-render
/// RFC 3339 instants with `date_format`.
fn normalize(value: Value, omit_nulls: bool, date_format: &DateFormat) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !(omit_nulls && v.is_null()))
                .map(|(k, v)| (k, normalize(v, omit_nulls, date_format)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| normalize(v, omit_nulls, date_format))
                .collect(),
        ),
        Value::String(text) => match DateTime::parse_from_rfc3339(&text) {
            Ok(instant) => Value::String(date_format.format(&instant.with_timezone(&Utc))),
            Err(_) => Value::String(text),
        },
        other => other,
    }
}
