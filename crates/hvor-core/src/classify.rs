//! Event classification.
//!
//! Walks the decoded entries of a feed, turns each into an [`Event`] and
//! sorts it into the past, current or future bucket of a [`Page`].
//!
//! Rules:
//! - `to < now` is past, `from > now` is future, anything else is current
//! - when several entries contain `now`, the last one in feed order wins
//! - one undecodable entry rejects the whole page

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::entry::{CalendarEntry, DESCRIPTION, DecodeError, SUMMARY};
use crate::error::{CoreError, CoreResult};
use crate::event::{Bucket, Event, Page};
use crate::location::extract_location;
use crate::text::{sanitize_text, split_description};

/// Decodes a single entry into an [`Event`].
pub fn decode_event<E: CalendarEntry + ?Sized>(entry: &E) -> Result<Event, DecodeError> {
    let from = entry.all_day_start()?;
    let to = entry.all_day_end()?;
    if from > to {
        return Err(DecodeError::Inverted { from, to });
    }

    let summary = entry
        .property(SUMMARY)
        .map(|p| sanitize_text(&p.value))
        .unwrap_or_default();

    let description = entry
        .property(DESCRIPTION)
        .map(|p| split_description(&p.value))
        .unwrap_or_default();

    Ok(Event {
        from,
        to,
        location: extract_location(entry),
        summary,
        description,
    })
}

/// Classifies every entry against `now` and builds a [`Page`].
///
/// # Errors
///
/// Returns [`CoreError::Decode`] for the first entry whose start or end
/// cannot be decoded. No partial page is produced.
pub fn classify<'a, E, I>(entries: I, now: DateTime<Utc>) -> CoreResult<Page>
where
    E: CalendarEntry + ?Sized + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut page = Page::empty(now);

    for (index, entry) in entries.into_iter().enumerate() {
        let event =
            decode_event(entry).map_err(|e| CoreError::decode(index, entry.uid(), e))?;

        match event.bucket_at(now) {
            Bucket::Past => page.past.push(event),
            Bucket::Future => page.future.push(event),
            Bucket::Current => {
                if let Some(previous) = page.current.replace(event) {
                    warn!(
                        index,
                        replaced = %previous.summary,
                        "Several entries contain now, keeping the later one"
                    );
                }
            }
        }
    }

    // Stable sorts: equal end instants keep feed order.
    page.past.sort_by(|a, b| b.to.cmp(&a.to));
    page.future.sort_by(|a, b| a.to.cmp(&b.to));

    debug!(
        past = page.past.len(),
        future = page.future.len(),
        has_current = page.current.is_some(),
        "Classified feed"
    );

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::fake::{FakeEntry, day};
    use crate::entry::{EntryProperty, STRUCTURED_LOCATION};
    use crate::location::TITLE_PARAM;

    fn entry(uid: &str, from: (u32, u32), to: (u32, u32)) -> FakeEntry {
        FakeEntry::new(uid, day(2024, from.0, from.1), day(2024, to.0, to.1)).with_summary(uid)
    }

    fn summaries(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.summary.as_str()).collect()
    }

    #[test]
    fn classifies_into_buckets() {
        let now = day(2024, 6, 10) + chrono::Duration::hours(12);
        let entries = vec![
            entry("oslo", (5, 1), (5, 10)),
            entry("leiden", (6, 8), (6, 12)),
            entry("berlin", (7, 1), (7, 5)),
            entry("london", (4, 1), (4, 20)),
            entry("memphis", (8, 1), (8, 3)),
        ];

        let page = classify(&entries, now).unwrap();

        assert_eq!(page.generated_at, now);
        assert_eq!(page.current.as_ref().unwrap().summary, "leiden");
        assert_eq!(summaries(&page.past), vec!["oslo", "london"]);
        assert_eq!(summaries(&page.future), vec!["berlin", "memphis"]);
    }

    #[test]
    fn every_entry_lands_in_exactly_one_bucket() {
        let now = day(2024, 3, 15) + chrono::Duration::hours(12);
        let entries: Vec<_> = (1..=28)
            .map(|d| entry(&format!("e{d}"), (3, d), (3, d + 1)))
            .collect();

        let page = classify(&entries, now).unwrap();
        assert_eq!(page.len(), entries.len());

        let mut seen: Vec<_> = page
            .past
            .iter()
            .chain(page.future.iter())
            .chain(page.current.iter())
            .map(|e| e.summary.clone())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), entries.len());

        assert!(page.past.iter().all(|e| e.to < now));
        assert!(page.future.iter().all(|e| e.from > now));
    }

    #[test]
    fn buckets_are_ordered_by_end() {
        let now = day(2024, 6, 1);
        let entries = vec![
            entry("p1", (1, 1), (1, 5)),
            entry("f3", (9, 1), (9, 30)),
            entry("p3", (5, 1), (5, 20)),
            entry("f1", (6, 5), (6, 6)),
            entry("p2", (3, 1), (3, 2)),
            entry("f2", (7, 1), (7, 2)),
        ];

        let page = classify(&entries, now).unwrap();

        assert_eq!(summaries(&page.past), vec!["p3", "p2", "p1"]);
        assert_eq!(summaries(&page.future), vec!["f1", "f2", "f3"]);
        assert!(page.past.windows(2).all(|w| w[0].to >= w[1].to));
        assert!(page.future.windows(2).all(|w| w[0].to <= w[1].to));
    }

    #[test]
    fn equal_ends_keep_feed_order() {
        let now = day(2024, 6, 1);
        let entries = vec![
            entry("a", (1, 1), (1, 5)),
            entry("b", (1, 2), (1, 5)),
            entry("c", (7, 1), (7, 5)),
            entry("d", (7, 2), (7, 5)),
        ];

        let page = classify(&entries, now).unwrap();
        assert_eq!(summaries(&page.past), vec!["a", "b"]);
        assert_eq!(summaries(&page.future), vec!["c", "d"]);
    }

    #[test]
    fn last_current_wins() {
        let now = day(2024, 6, 10);
        let entries = vec![
            entry("first", (6, 1), (6, 20)),
            entry("second", (6, 9), (6, 11)),
        ];

        let page = classify(&entries, now).unwrap();
        assert_eq!(page.current.unwrap().summary, "second");
        assert!(page.past.is_empty());
        assert!(page.future.is_empty());
    }

    #[test]
    fn no_current_entry() {
        let now = day(2024, 6, 10);
        let entries = vec![entry("past", (6, 1), (6, 2))];

        let page = classify(&entries, now).unwrap();
        assert!(page.current.is_none());
    }

    #[test]
    fn empty_feed() {
        let entries: Vec<FakeEntry> = Vec::new();
        let page = classify(&entries, day(2024, 1, 1)).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn decode_failure_rejects_page() {
        let now = day(2024, 6, 10);
        let mut broken = entry("broken", (6, 1), (6, 2));
        broken.end = Err(DecodeError::malformed("DTEND", "yesterday"));
        let entries = vec![entry("ok", (6, 1), (6, 2)), broken];

        let err = classify(&entries, now).unwrap_err();
        match err {
            CoreError::Decode { index, uid, source } => {
                assert_eq!(index, 1);
                assert_eq!(uid, "broken");
                assert_eq!(source, DecodeError::malformed("DTEND", "yesterday"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inverted_range_is_decode_error() {
        let entries = vec![entry("backwards", (6, 5), (6, 1))];
        let err = classify(&entries, day(2024, 6, 10)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Decode {
                source: DecodeError::Inverted { .. },
                ..
            }
        ));
    }

    #[test]
    fn decodes_text_fields() {
        let ev = FakeEntry::new("x", day(2024, 6, 1), day(2024, 6, 2))
            .with_summary(r"Leiden\, again")
            .with_description(r"Conference\, day one\nDinner after");

        let event = decode_event(&ev).unwrap();
        assert_eq!(event.summary, "Leiden, again");
        assert_eq!(
            event.description,
            vec!["Conference, day one".to_string(), "Dinner after".to_string()]
        );
        assert!(event.location.is_none());
    }

    #[test]
    fn missing_text_fields_are_empty() {
        let ev = FakeEntry::new("x", day(2024, 6, 1), day(2024, 6, 2));

        let event = decode_event(&ev).unwrap();
        assert_eq!(event.summary, "");
        assert!(event.description.is_empty());
    }

    #[test]
    fn decodes_location() {
        let ev = FakeEntry::new("x", day(2024, 6, 1), day(2024, 6, 2)).with_property(
            STRUCTURED_LOCATION,
            EntryProperty::new("geo:52.16,4.49").with_param(TITLE_PARAM, r"Leiden\nNetherlands"),
        );

        let location = decode_event(&ev).unwrap().location.unwrap();
        assert_eq!(location.title, "Leiden, Netherlands");
        assert_eq!(location.latitude, "52.16");
    }
}
