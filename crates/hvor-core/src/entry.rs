//! Decoded calendar entries as seen by the classifier.
//!
//! Reading the ICS grammar is someone else's job. This module only describes
//! what the classifier needs from a decoded VEVENT: its all-day bounds and a
//! named property lookup.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Property carrying summary text.
pub const SUMMARY: &str = "SUMMARY";

/// Property carrying free-form description text.
pub const DESCRIPTION: &str = "DESCRIPTION";

/// Vendor property carrying a geocoded place.
pub const STRUCTURED_LOCATION: &str = "X-APPLE-STRUCTURED-LOCATION";

/// A failure to decode an entry's start or end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The property is not present on the entry.
    #[error("missing {property}")]
    Missing { property: &'static str },

    /// The property is present but its value is not a date or date-time.
    #[error("malformed {property}: {value:?}")]
    Malformed {
        property: &'static str,
        value: String,
    },

    /// The entry ends before it starts.
    #[error("entry ends ({to}) before it starts ({from})")]
    Inverted { from: DateTime<Utc>, to: DateTime<Utc> },
}

impl DecodeError {
    /// Creates a missing property error.
    pub fn missing(property: &'static str) -> Self {
        Self::Missing { property }
    }

    /// Creates a malformed property error.
    pub fn malformed(property: &'static str, value: impl Into<String>) -> Self {
        Self::Malformed {
            property,
            value: value.into(),
        }
    }
}

/// A single property of an entry: its raw value and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryProperty {
    /// The raw property value.
    pub value: String,
    /// Parameters keyed by upper-case name.
    pub params: HashMap<String, String>,
}

impl EntryProperty {
    /// Creates a property with the given value and no parameters.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            params: HashMap::new(),
        }
    }

    /// Builder: add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns a parameter value, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// A decoded calendar entry.
///
/// Implemented by the feed decoder for real VEVENTs and by in-memory fakes
/// in tests.
pub trait CalendarEntry {
    /// Returns the entry's UID, used for log context only.
    fn uid(&self) -> Option<String> {
        None
    }

    /// Decodes the start of the entry as an all-day instant.
    fn all_day_start(&self) -> Result<DateTime<Utc>, DecodeError>;

    /// Decodes the end of the entry as an all-day instant.
    fn all_day_end(&self) -> Result<DateTime<Utc>, DecodeError>;

    /// Looks up a property by name.
    fn property(&self, name: &str) -> Option<EntryProperty>;
}
