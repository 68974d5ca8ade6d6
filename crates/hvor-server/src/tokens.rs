//! Access tokens for the landing page.
//!
//! A reader gets a direct link carrying `?from=<token>`. Tokens come from a
//! comma separated list; an empty list admits nobody.

use std::collections::HashSet;

/// The set of accepted `from` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTokens {
    tokens: HashSet<String>,
}

impl AccessTokens {
    /// Parses a comma separated token list.
    ///
    /// Surrounding whitespace is trimmed and empty entries are dropped.
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    /// Returns true if `token` is one of the accepted tokens.
    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
