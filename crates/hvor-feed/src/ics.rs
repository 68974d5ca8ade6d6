//! ICS decoding.
//!
//! Parses the feed with `icalendar` and exposes every VEVENT to the core
//! classifier through [`CalendarEntry`].

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event};
use tracing::debug;

use hvor_core::{CalendarEntry, DecodeError, EntryProperty};

use crate::error::{FeedError, FeedResult};

const DTSTART: &str = "DTSTART";
const DTEND: &str = "DTEND";

/// A decoded VEVENT.
#[derive(Debug, Clone)]
pub struct FeedEntry(Event);

impl FeedEntry {
    /// Wraps a parsed event.
    pub fn new(event: Event) -> Self {
        Self(event)
    }

    fn decode_bound(
        &self,
        property: &'static str,
        value: Option<DatePerhapsTime>,
    ) -> Result<DateTime<Utc>, DecodeError> {
        match value {
            Some(value) => Ok(to_utc(value)),
            None => match self.0.property_value(property) {
                Some(raw) => Err(DecodeError::malformed(property, raw)),
                None => Err(DecodeError::missing(property)),
            },
        }
    }
}

impl CalendarEntry for FeedEntry {
    fn uid(&self) -> Option<String> {
        self.0.get_uid().map(str::to_string)
    }

    fn all_day_start(&self) -> Result<DateTime<Utc>, DecodeError> {
        self.decode_bound(DTSTART, self.0.get_start())
    }

    fn all_day_end(&self) -> Result<DateTime<Utc>, DecodeError> {
        self.decode_bound(DTEND, self.0.get_end())
    }

    fn property(&self, name: &str) -> Option<EntryProperty> {
        let prop = self.0.properties().get(name)?;
        let mut entry = EntryProperty::new(prop.value());
        for (key, param) in prop.params() {
            entry = entry.with_param(key.to_ascii_uppercase(), unquote(param.value()));
        }
        Some(entry)
    }
}

/// Strips the double quotes iCalendar puts around parameter values with separators.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Converts a date or date-time to a UTC instant.
///
/// Dates become midnight UTC. Floating and zoned times are read as UTC.
fn to_utc(value: DatePerhapsTime) -> DateTime<Utc> {
    match value {
        DatePerhapsTime::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
        DatePerhapsTime::DateTime(cdt) => match cdt {
            CalendarDateTime::Utc(dt) => dt,
            CalendarDateTime::Floating(naive) => Utc.from_utc_datetime(&naive),
            CalendarDateTime::WithTimezone { date_time, tzid: _ } => {
                Utc.from_utc_datetime(&date_time)
            }
        },
    }
}

/// Parses raw feed bytes into entries, in feed order.
///
/// # Errors
///
/// Fails if the bytes are not UTF-8 or not an iCalendar document.
pub fn parse_feed(bytes: &[u8]) -> FeedResult<Vec<FeedEntry>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FeedError::parse("calendar is not valid UTF-8").with_source(e))?;

    let calendar = text
        .parse::<Calendar>()
        .map_err(|e| FeedError::parse(format!("failed to parse calendar: {e}")))?;

    let entries: Vec<_> = calendar
        .components
        .into_iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(FeedEntry::new(event)),
            _ => None,
        })
        .collect();

    debug!(events = entries.len(), "Parsed calendar");
    Ok(entries)
}
