//! Paginated views over the past and future buckets.
//!
//! A window is the half-open index range `[from, to)` into one bucket of a
//! [`Page`]. The end is clamped to the bucket length; everything else out of
//! range is the caller's mistake and reported as a [`WindowError`].
//!
//! The `more` flag on a [`Window`] is what drives incremental loading: when
//! it is set, [`Window::next`] describes the following window.

use serde::Serialize;
use thiserror::Error;

use crate::event::{Bucket, Event, Page};

/// Number of events in the first window of a bucket and in each following one.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// A window request that cannot be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A bound was negative.
    #[error("negative window bound: from={from}, to={to}")]
    Negative { from: i64, to: i64 },

    /// The start is after the end.
    #[error("window start {from} is after its end {to}")]
    Inverted { from: i64, to: i64 },

    /// The start is past the end of the bucket.
    #[error("window start {from} is beyond the {len} events available")]
    StartOutOfRange { from: i64, len: usize },

    /// The bucket cannot be windowed.
    #[error("the {0} bucket cannot be windowed")]
    NotWindowable(Bucket),
}

/// A half-open index range into a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowRange {
    /// First index (inclusive).
    pub from: usize,
    /// Last index (exclusive).
    pub to: usize,
}

impl WindowRange {
    /// The first window of a bucket.
    pub fn first() -> Self {
        Self {
            from: 0,
            to: DEFAULT_WINDOW_SIZE,
        }
    }

    /// The window of default size starting at `from`.
    pub fn starting_at(from: usize) -> Self {
        Self {
            from,
            to: from.saturating_add(DEFAULT_WINDOW_SIZE),
        }
    }
}

/// A slice of a bucket plus whether more events follow it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window<'a> {
    /// The bucket the events come from.
    pub bucket: Bucket,
    /// Events in the window, in bucket order.
    pub events: &'a [Event],
    /// True if the bucket holds events after this window.
    pub more: bool,
    /// The following window, present when `more` is set.
    pub next: Option<WindowRange>,
}

/// Selects `bucket[from..to]` from a page, clamping `to` to the bucket length.
///
/// # Errors
///
/// Fails for negative bounds, `from > to`, `from` beyond the bucket length,
/// and for the current bucket.
pub fn window(page: &Page, bucket: Bucket, from: i64, to: i64) -> Result<Window<'_>, WindowError> {
    if bucket == Bucket::Current {
        return Err(WindowError::NotWindowable(bucket));
    }
    if from < 0 || to < 0 {
        return Err(WindowError::Negative { from, to });
    }
    if from > to {
        return Err(WindowError::Inverted { from, to });
    }

    let events = page.bucket(bucket);
    let len = events.len();

    let start = usize::try_from(from)
        .ok()
        .filter(|start| *start <= len)
        .ok_or(WindowError::StartOutOfRange { from, len })?;
    let end = usize::try_from(to).map_or(len, |end| end.min(len));

    let more = end < len;
    Ok(Window {
        bucket,
        events: &events[start..end],
        more,
        next: more.then(|| WindowRange::starting_at(end)),
    })
}

impl Page {
    /// Selects a window of the given bucket. See [`window`].
    pub fn window(&self, bucket: Bucket, from: i64, to: i64) -> Result<Window<'_>, WindowError> {
        window(self, bucket, from, to)
    }

    /// Selects the first window of the given bucket.
    pub fn first_window(&self, bucket: Bucket) -> Result<Window<'_>, WindowError> {
        let range = WindowRange::first();
        // The first range always fits in i64.
        self.window(bucket, range.from as i64, range.to as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::fake::day;

    fn page_with_future(n: u32) -> Page {
        let now = day(2024, 1, 1);
        let mut page = Page::empty(now);
        page.future = (0..n)
            .map(|i| Event {
                from: day(2024, 2, 1 + i),
                to: day(2024, 2, 2 + i),
                location: None,
                summary: format!("trip {i}"),
                description: Vec::new(),
            })
            .collect();
        page
    }

    #[test]
    fn short_bucket_fits_in_first_window() {
        let page = page_with_future(3);
        let w = window(&page, Bucket::Future, 0, 5).unwrap();

        assert_eq!(w.events.len(), 3);
        assert!(!w.more);
        assert_eq!(w.next, None);
    }

    #[test]
    fn long_bucket_has_more() {
        let page = page_with_future(8);
        let w = window(&page, Bucket::Future, 0, 5).unwrap();

        assert_eq!(w.events.len(), 5);
        assert!(w.more);
        assert_eq!(w.next, Some(WindowRange { from: 5, to: 10 }));
    }

    #[test]
    fn following_window_is_clamped() {
        let page = page_with_future(8);
        let w = window(&page, Bucket::Future, 5, 10).unwrap();

        assert_eq!(w.events.len(), 3);
        assert_eq!(w.events[0].summary, "trip 5");
        assert!(!w.more);
    }

    #[test]
    fn exact_fit_has_no_more() {
        let page = page_with_future(5);
        let w = window(&page, Bucket::Future, 0, 5).unwrap();
        assert_eq!(w.events.len(), 5);
        assert!(!w.more);
    }

    #[test]
    fn window_at_end_is_empty() {
        let page = page_with_future(4);
        let w = window(&page, Bucket::Future, 4, 9).unwrap();
        assert!(w.events.is_empty());
        assert!(!w.more);
    }

    #[test]
    fn empty_bucket() {
        let page = page_with_future(0);
        let w = window(&page, Bucket::Past, 0, 5).unwrap();
        assert!(w.events.is_empty());
        assert!(!w.more);
    }

    #[test]
    fn rejects_bad_ranges() {
        let page = page_with_future(4);

        assert_eq!(
            window(&page, Bucket::Future, -1, 5).unwrap_err(),
            WindowError::Negative { from: -1, to: 5 }
        );
        assert_eq!(
            window(&page, Bucket::Future, 0, -5).unwrap_err(),
            WindowError::Negative { from: 0, to: -5 }
        );
        assert_eq!(
            window(&page, Bucket::Future, 3, 2).unwrap_err(),
            WindowError::Inverted { from: 3, to: 2 }
        );
        assert_eq!(
            window(&page, Bucket::Future, 6, 9).unwrap_err(),
            WindowError::StartOutOfRange { from: 6, len: 4 }
        );
        assert_eq!(
            window(&page, Bucket::Current, 0, 1).unwrap_err(),
            WindowError::NotWindowable(Bucket::Current)
        );
    }

    #[test]
    fn huge_end_is_clamped() {
        let page = page_with_future(2);
        let w = window(&page, Bucket::Future, 0, i64::MAX).unwrap();
        assert_eq!(w.events.len(), 2);
        assert!(!w.more);
    }

    #[test]
    fn first_window_helper() {
        let page = page_with_future(7);
        let w = page.first_window(Bucket::Future).unwrap();
        assert_eq!(w.events.len(), DEFAULT_WINDOW_SIZE);
        assert!(w.more);
    }
}
