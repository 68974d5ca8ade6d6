//! Free-text cleanup for calendar fields.
//!
//! The feed is an export from a mapping application and its text fields carry
//! two kinds of residue:
//! - iCalendar escaping of commas (`\,`) in summaries and descriptions
//! - line separators, which arrive as the two characters `\n`, as a real line
//!   feed when the decoder already unescaped the value or, in some US and
//!   Norwegian place titles, collapsed to a bare `n` glued between two names
//!
//! [`sanitize_text`] handles the first, [`normalize_title`] the second.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::regions::us_region_name;

/// Escaped comma as it appears in raw feed text.
const ESCAPED_COMMA: &str = r"\,";

/// Joiner for the components of a canonical place title.
const TITLE_JOINER: &str = ", ";

/// A line separator, escaped or already unescaped.
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[nN]|\r?\n").expect("Invalid line break regex"));

/// `<place>, <ST>n<United States>`, the separator in any of its forms.
static UNITED_STATES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w.+), ([A-Z]{2})(?:\\[nN]|\r?\n|n)(United States)")
        .expect("Invalid United States regex")
});

/// `Sandefjordn<Sandefjord Municipality>, <Norway>`, the separator in any of its forms.
static SANDEFJORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Sandefjord)(?:\\[nN]|\r?\n|n)(Sandefjord Municipality), (Norway)")
        .expect("Invalid Sandefjord regex")
});

/// A title rewrite: a pattern and how to turn its captures into a title.
struct TitleRule {
    regex: &'static LazyLock<Regex>,
    rewrite: fn(&Captures<'_>) -> String,
}

/// Ordered rewrite rules, first match wins.
///
/// These encode quirks of one upstream export format. Anything they do not
/// match falls through to plain separator substitution.
static TITLE_RULES: [TitleRule; 2] = [
    TitleRule {
        regex: &UNITED_STATES_REGEX,
        rewrite: rewrite_united_states,
    },
    TitleRule {
        regex: &SANDEFJORD_REGEX,
        rewrite: join_captures,
    },
];

fn rewrite_united_states(caps: &Captures<'_>) -> String {
    let region = us_region_name(&caps[2]);
    [&caps[1], region, &caps[3]].join(TITLE_JOINER)
}

fn join_captures(caps: &Captures<'_>) -> String {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(TITLE_JOINER)
}

/// Collapses escaped commas (`\,`) into literal commas.
///
/// # Example
///
/// ```
/// use hvor_core::text::sanitize_text;
///
/// assert_eq!(sanitize_text(r"Oslo\, Norway"), "Oslo, Norway");
/// ```
pub fn sanitize_text(raw: &str) -> String {
    raw.replace(ESCAPED_COMMA, ",")
}

/// Sanitizes a description and splits it into paragraphs on line separators,
/// escaped or not.
///
/// An empty description yields a single empty paragraph, the same as
/// splitting an empty string does.
pub fn split_description(raw: &str) -> Vec<String> {
    LINE_BREAK_REGEX
        .split(&sanitize_text(raw))
        .map(str::to_string)
        .collect()
}

/// Turns a raw place title into a canonical `City, Region, Country` string.
///
/// Total: input that matches none of the rewrite rules only has its line
/// separators replaced, which leaves it unchanged when there are none.
///
/// # Example
///
/// ```
/// use hvor_core::text::normalize_title;
///
/// assert_eq!(
///     normalize_title("Memphis, TNnUnited States"),
///     "Memphis, Tennessee, United States"
/// );
/// assert_eq!(normalize_title(r"Leiden\nNetherlands"), "Leiden, Netherlands");
/// ```
pub fn normalize_title(raw: &str) -> String {
    for rule in &TITLE_RULES {
        if let Some(caps) = rule.regex.captures(raw) {
            return (rule.rewrite)(&caps);
        }
    }

    LINE_BREAK_REGEX.replace_all(raw, TITLE_JOINER).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_known_titles() {
        let cases = [
            (r"Leiden\nNetherlands", "Leiden, Netherlands"),
            (r"London\nEngland", "London, England"),
            ("Memphis, TNnUnited States", "Memphis, Tennessee, United States"),
            (
                "SandefjordnSandefjord Municipality, Norway",
                "Sandefjord, Sandefjord Municipality, Norway",
            ),
            ("Flagstaff, AZnUnited States", "Flagstaff, Arizona, United States"),
            (r"Berlin\nGermany", "Berlin, Germany"),
            ("St. Louis, MOnUnited States", "St. Louis, Missouri, United States"),
            ("Norway", "Norway"),
        ];

        for (raw, want) in cases {
            assert_eq!(normalize_title(raw), want, "normalizing {raw:?}");
        }
    }

    #[test]
    fn normalize_expands_every_region_code() {
        for (code, name) in crate::regions::US_REGIONS {
            let raw = format!("Springfield, {code}nUnited States");
            assert_eq!(
                normalize_title(&raw),
                format!("Springfield, {name}, United States")
            );
        }
    }

    #[test]
    fn normalize_keeps_unknown_region_code() {
        assert_eq!(
            normalize_title("Somewhere, QQnUnited States"),
            "Somewhere, QQ, United States"
        );
    }

    #[test]
    fn normalize_multiple_separators() {
        assert_eq!(
            normalize_title(r"Tromsø\nTromsø Municipality\nNorway"),
            "Tromsø, Tromsø Municipality, Norway"
        );
    }

    #[test]
    fn normalize_empty_title() {
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let raws = [
            r"Leiden\nNetherlands",
            "Memphis, TNnUnited States",
            "SandefjordnSandefjord Municipality, Norway",
            "Somewhere, QQnUnited States",
            "Norway",
        ];

        for raw in raws {
            let once = normalize_title(raw);
            assert_eq!(normalize_title(&once), once, "re-normalizing {raw:?}");
        }
    }

    #[test]
    fn sanitize_collapses_escaped_commas() {
        assert_eq!(sanitize_text("a\\,b"), "a,b");
        assert_eq!(sanitize_text(r"one\, two\, three"), "one, two, three");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_text(r"Oslo\, Norway");
        assert_eq!(sanitize_text(&once), once);
        assert_eq!(sanitize_text("plain"), "plain");
    }

    #[test]
    fn split_description_into_paragraphs() {
        assert_eq!(
            split_description(r"First\, with comma\nSecond"),
            vec!["First, with comma".to_string(), "Second".to_string()]
        );
    }

    #[test]
    fn split_description_on_decoded_newlines() {
        assert_eq!(
            split_description("Conference, day one\nDinner after"),
            vec!["Conference, day one".to_string(), "Dinner after".to_string()]
        );
        assert_eq!(
            split_description("a\r\nb\\Nc"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn split_empty_description() {
        assert_eq!(split_description(""), vec![String::new()]);
    }

    #[test]
    fn normalize_decoded_newlines() {
        assert_eq!(normalize_title("Leiden\nNetherlands"), "Leiden, Netherlands");
    }

    #[test]
    fn region_rules_accept_any_separator() {
        for raw in [
            r"Memphis, TN\nUnited States",
            "Memphis, TN\nUnited States",
            "Memphis, TNnUnited States",
        ] {
            assert_eq!(normalize_title(raw), "Memphis, Tennessee, United States");
        }
        assert_eq!(
            normalize_title(r"Sandefjord\nSandefjord Municipality, Norway"),
            "Sandefjord, Sandefjord Municipality, Norway"
        );
    }

    #[test]
    fn split_description_without_separator() {
        assert_eq!(split_description("Just one"), vec!["Just one".to_string()]);
    }
}
