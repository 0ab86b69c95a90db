use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::date::DateFormat;

/// Loosely typed parameter value accepted for query strings and form fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    List(Vec<ParamValue>),
}

impl ParamValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render the value for the wire.
    ///
    /// Null renders as an empty string, instants use `date_format`, and lists
    /// are comma-joined element by element.
    #[must_use]
    pub fn to_param_string(&self, date_format: &DateFormat) -> String {
        match self {
            Self::Null => String::new(),
            Self::Str(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(instant) => date_format.format(instant),
            Self::List(items) => items
                .iter()
                .map(|item| item.to_param_string(date_format))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// One query parameter. A `None` value drops the parameter from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    name: String,
    value: Option<String>,
}

impl Pair {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A pair that is skipped entirely when the URL is built.
    #[must_use]
    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Get the parameter name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the rendered value, `None` for a null pair
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Wire convention for multi-valued query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFormat {
    /// `a,b,c`
    #[default]
    Csv,
    /// `a b c`
    Ssv,
    /// `a\tb\tc`
    Tsv,
    /// `a|b|c`
    Pipes,
    /// `name=a&name=b&name=c`
    Multi,
}

impl CollectionFormat {
    /// Join delimiter, or `None` for [`CollectionFormat::Multi`].
    #[must_use]
    pub fn delimiter(self) -> Option<&'static str> {
        match self {
            Self::Csv => Some(","),
            Self::Ssv => Some(" "),
            Self::Tsv => Some("\t"),
            Self::Pipes => Some("|"),
            Self::Multi => None,
        }
    }
}

impl FromStr for CollectionFormat {
    type Err = std::convert::Infallible;

    /// Unknown or empty names fall back to `csv`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ssv" => Self::Ssv,
            "tsv" => Self::Tsv,
            "pipes" => Self::Pipes,
            "multi" => Self::Multi,
            _ => Self::Csv,
        })
    }
}

impl fmt::Display for CollectionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Ssv => "ssv",
            Self::Tsv => "tsv",
            Self::Pipes => "pipes",
            Self::Multi => "multi",
        })
    }
}

/// Expand a parameter into query pairs according to `format`.
pub fn expand_pairs(
    format: CollectionFormat,
    name: &str,
    value: &ParamValue,
    date_format: &DateFormat,
) -> Vec<Pair> {
    if name.is_empty() || value.is_null() {
        return Vec::new();
    }

    let ParamValue::List(items) = value else {
        return vec![Pair::new(name, value.to_param_string(date_format))];
    };
    if items.is_empty() {
        return Vec::new();
    }

    let rendered = items.iter().map(|item| item.to_param_string(date_format));
    match format.delimiter() {
        None => rendered.map(|v| Pair::new(name, v)).collect(),
        Some(delimiter) => vec![Pair::new(name, rendered.collect::<Vec<_>>().join(delimiter))],
    }
}
