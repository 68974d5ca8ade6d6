//! Geocoded places attached to calendar entries.
//!
//! The mapping application stores a place in a vendor property of the form
//!
//! ```text
//! X-APPLE-STRUCTURED-LOCATION;VALUE=URI;X-APPLE-RADIUS=1200;
//!  X-APPLE-MAPKIT-HANDLE=...;X-TITLE="Leiden\nNetherlands":geo:52.16,4.49
//! ```
//!
//! Every part of it is optional. Extraction never fails: missing pieces
//! become empty strings or an unknown radius.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entry::{CalendarEntry, EntryProperty, STRUCTURED_LOCATION};
use crate::text::normalize_title;

/// Parameter carrying the place title.
pub const TITLE_PARAM: &str = "X-TITLE";

/// Parameter carrying the accuracy radius in meters.
pub const RADIUS_PARAM: &str = "X-APPLE-RADIUS";

/// Parameter carrying the vendor's opaque place handle.
pub const HANDLE_PARAM: &str = "X-APPLE-MAPKIT-HANDLE";

const GEO_PREFIX: &str = "geo:";

/// A geocoded place with an accuracy radius.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Canonical display title.
    pub title: String,
    /// Accuracy radius in meters, `None` when unknown.
    pub radius: Option<f64>,
    /// Latitude exactly as written in the feed.
    pub latitude: String,
    /// Longitude exactly as written in the feed.
    pub longitude: String,
    /// Vendor handle, passed through untouched.
    pub opaque_handle: String,
}

impl Location {
    /// Returns true if both coordinates are known, i.e. a map can be drawn.
    pub fn has_coordinates(&self) -> bool {
        !self.latitude.is_empty() && !self.longitude.is_empty()
    }
}

/// Reads the structured location of an entry, if it has one.
pub fn extract_location<E: CalendarEntry + ?Sized>(entry: &E) -> Option<Location> {
    let property = entry.property(STRUCTURED_LOCATION)?;
    Some(location_from_property(&property))
}

/// Builds a [`Location`] from a structured location property.
pub fn location_from_property(property: &EntryProperty) -> Location {
    let title = property
        .param(TITLE_PARAM)
        .map(normalize_title)
        .unwrap_or_default();

    let radius = property.param(RADIUS_PARAM).and_then(parse_radius);

    let opaque_handle = property
        .param(HANDLE_PARAM)
        .map(str::to_string)
        .unwrap_or_default();

    let (latitude, longitude) = parse_geo(&property.value).unwrap_or_default();

    let location = Location {
        title,
        radius,
        latitude,
        longitude,
        opaque_handle,
    };
    if !location.has_coordinates() {
        trace!(value = %property.value, "No usable coordinates in structured location");
    }
    location
}

/// Parses a radius in meters. Negative and non-finite values are unknown.
fn parse_radius(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r >= 0.0)
}

/// Splits `geo:<lat>,<lon>` into its two components, verbatim.
fn parse_geo(value: &str) -> Option<(String, String)> {
    let coords = value.strip_prefix(GEO_PREFIX)?;
    match coords.split(',').collect::<Vec<_>>().as_slice() {
        [lat, lon] => Some((lat.to_string(), lon.to_string())),
        _ => None,
    }
}
