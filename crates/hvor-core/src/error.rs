//! Core error types.

use thiserror::Error;

use crate::entry::DecodeError;
use crate::window::WindowError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by classification and windowing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An entry could not be decoded; the whole page is rejected.
    #[error("failed to decode entry {index} ({uid}): {source}")]
    Decode {
        /// Position of the entry in feed order.
        index: usize,
        /// UID of the entry, or `"<no uid>"`.
        uid: String,
        #[source]
        source: DecodeError,
    },

    /// A window request was out of range.
    #[error(transparent)]
    Window(#[from] WindowError),
}

impl CoreError {
    /// Creates a decode error for the entry at `index`.
    pub fn decode(index: usize, uid: Option<String>, source: DecodeError) -> Self {
        Self::Decode {
            index,
            uid: uid.unwrap_or_else(|| "<no uid>".to_string()),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let err = CoreError::decode(3, Some("abc@x".into()), DecodeError::missing("DTEND"));
        assert_eq!(
            err.to_string(),
            "failed to decode entry 3 (abc@x): missing DTEND"
        );

        let err = CoreError::decode(0, None, DecodeError::missing("DTSTART"));
        assert!(err.to_string().contains("<no uid>"));
    }

    #[test]
    fn window_error_is_transparent() {
        let err: CoreError = WindowError::Inverted { from: 4, to: 2 }.into();
        assert_eq!(err.to_string(), WindowError::Inverted { from: 4, to: 2 }.to_string());
    }
}
