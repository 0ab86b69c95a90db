use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// RFC 3339 with millisecond precision, rendered in UTC with a `Z` offset.
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Pattern used to render and parse instants in query parameters and
/// request bodies.
///
/// Patterns use chrono's `strftime` syntax. Instants are always rendered in
/// UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// # Errors
    /// Returns `ApiError::Contract` when the pattern holds an unknown
    /// specifier.
    pub fn new(pattern: impl Into<String>) -> Result<Self, ApiError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(ApiError::contract(format!("invalid date pattern '{pattern}'")));
        }
        Ok(Self { pattern })
    }

    /// Get the strftime pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        if self.is_default() {
            return instant.to_rfc3339_opts(SecondsFormat::Millis, true);
        }
        instant.format(&self.pattern).to_string()
    }

    fn is_default(&self) -> bool {
        self.pattern == DEFAULT_DATE_PATTERN
    }

    /// Parse a string produced by this format back into an instant.
    ///
    /// The default format reads any RFC 3339 instant, `Z` or numeric offset.
    /// Other patterns without an offset are read as UTC; date-only patterns
    /// resolve to midnight.
    ///
    /// # Errors
    /// Returns `ApiError::Contract` when the input does not match the pattern.
    pub fn parse(&self, input: &str) -> Result<DateTime<Utc>, ApiError> {
        if self.is_default() {
            return DateTime::parse_from_rfc3339(input)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|e| {
                    ApiError::contract(format!("cannot parse date '{input}' as RFC 3339: {e}"))
                });
        }
        if let Ok(parsed) = DateTime::parse_from_str(input, &self.pattern) {
            return Ok(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, &self.pattern) {
            return Ok(naive.and_utc());
        }
        NaiveDate::parse_from_str(input, &self.pattern)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|e| {
                ApiError::contract(format!(
                    "cannot parse date '{input}' with pattern '{}': {e}",
                    self.pattern
                ))
            })
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_PATTERN.to_owned(),
        }
    }
}

impl TryFrom<String> for DateFormat {
    type Error = ApiError;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(pattern)
    }
}

impl From<DateFormat> for String {
    fn from(format: DateFormat) -> Self {
        format.pattern
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
