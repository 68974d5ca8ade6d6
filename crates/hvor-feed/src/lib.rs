//! Feed sources and ICS decoding.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │   HttpFeed   │   │   FileFeed   │
//! └──────┬───────┘   └──────┬───────┘
//!        │    FeedSource    │
//!        └────────┬─────────┘
//!                 ▼ raw bytes
//!          ┌─────────────┐
//!          │ parse_feed  │
//!          └──────┬──────┘
//!                 ▼ Vec<FeedEntry>: CalendarEntry
//!          hvor_core::classify
//! ```

pub mod error;
pub mod ics;
pub mod source;

pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use ics::{FeedEntry, parse_feed};
#[cfg(feature = "http")]
pub use source::HttpFeed;
pub use source::{BoxFuture, DEFAULT_FETCH_TIMEOUT, FeedSource, FileFeed};
