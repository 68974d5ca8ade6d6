//! Classified events and the page they are published in.
//!
//! - [`Event`]: one decoded calendar entry, ready for display
//! - [`Bucket`]: where an event lands relative to "now"
//! - [`Page`]: one immutable snapshot of classified events

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Location;

/// One calendar entry, decoded and cleaned up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Start of the stay (inclusive).
    pub from: DateTime<Utc>,
    /// End of the stay.
    pub to: DateTime<Utc>,
    /// Where the stay takes place, if the entry says.
    pub location: Option<Location>,
    /// Single-line summary.
    pub summary: String,
    /// Description paragraphs, possibly empty.
    pub description: Vec<String>,
}

impl Event {
    /// Returns the bucket this event belongs to at `now`.
    pub fn bucket_at(&self, now: DateTime<Utc>) -> Bucket {
        if self.to < now {
            Bucket::Past
        } else if self.from > now {
            Bucket::Future
        } else {
            Bucket::Current
        }
    }
}

/// Classification outcome of an event relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Ended before now.
    Past,
    /// Contains now.
    Current,
    /// Starts after now.
    Future,
}

impl Bucket {
    /// Returns the lowercase name used in routes and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Current => "current",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown bucket name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bucket: {0:?}")]
pub struct UnknownBucket(pub String);

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "past" => Ok(Self::Past),
            "current" => Ok(Self::Current),
            "future" => Ok(Self::Future),
            other => Err(UnknownBucket(other.to_string())),
        }
    }
}

/// One consistent snapshot of classified events.
///
/// Built once per refresh and never mutated afterwards. `past` is ordered
/// most recently ended first, `future` soonest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// The instant the page was classified against.
    pub generated_at: DateTime<Utc>,
    /// The event containing `generated_at`, if any.
    pub current: Option<Event>,
    /// Events that ended before `generated_at`.
    pub past: Vec<Event>,
    /// Events that start after `generated_at`.
    pub future: Vec<Event>,
}

impl Page {
    /// Creates an empty page classified at `now`.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            current: None,
            past: Vec::new(),
            future: Vec::new(),
        }
    }

    /// Returns the events of a bucket as a slice.
    pub fn bucket(&self, bucket: Bucket) -> &[Event] {
        match bucket {
            Bucket::Past => &self.past,
            Bucket::Future => &self.future,
            Bucket::Current => self.current.as_slice(),
        }
    }

    /// Returns the total number of events on the page.
    pub fn len(&self) -> usize {
        self.past.len() + self.future.len() + usize::from(self.current.is_some())
    }

    /// Returns true if the page holds no events at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
