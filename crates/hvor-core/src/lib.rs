//! Core types: locations, events, classification, windows
//!
//! Everything here is pure: no I/O, no clocks. The caller supplies decoded
//! calendar entries and the current instant.

pub mod classify;
pub mod entry;
pub mod error;
pub mod event;
pub mod location;
pub mod regions;
pub mod text;
pub mod tracing;
pub mod window;

pub use crate::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use classify::{classify, decode_event};
pub use entry::{CalendarEntry, DecodeError, EntryProperty};
pub use error::{CoreError, CoreResult};
pub use event::{Bucket, Event, Page, UnknownBucket};
pub use location::{Location, extract_location};
pub use text::{normalize_title, sanitize_text, split_description};
pub use window::{DEFAULT_WINDOW_SIZE, Window, WindowError, WindowRange, window};
