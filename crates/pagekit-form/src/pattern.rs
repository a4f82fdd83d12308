//! Field validation patterns.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use pagekit_core::error::AppError;
use pagekit_core::result::AppResult;

/// Flags accepted in `/source/flags` literals. Only `i`, `m`, and `s`
/// change matching.
const KNOWN_FLAGS: &str = "gimsuy";

/// A compiled validation pattern.
///
/// Matching is an unanchored search: the pattern passes if it matches
/// anywhere in the value. Anchor with `^`/`$` to match the whole value.
///
/// Equality and serialization use the source text as written.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// Accepts a bare regex (`^\d+$`) or a slash-delimited literal with
    /// trailing flags (`/^[a-z]+$/i`).
    pub fn new(source: &str) -> AppResult<Self> {
        let (body, flags) = split_literal(source).unwrap_or((source, ""));

        let regex = RegexBuilder::new(body)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| AppError::validation(format!("Invalid pattern '{source}': {e}")))?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Whether the pattern matches anywhere in `value`.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Source text as given to [`Pattern::new`].
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Split `/body/flags` into its parts. `None` when `source` is not a
/// literal or carries an unknown flag.
fn split_literal(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if flags.chars().all(|c| KNOWN_FLAGS.contains(c)) {
        Some((body, flags))
    } else {
        None
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Pattern {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_pattern_is_unanchored() {
        let pattern = Pattern::new(r"\d").unwrap();
        assert!(pattern.is_match("abc1"));
        assert!(!pattern.is_match("abc"));
    }

    #[test]
    fn test_anchored_pattern() {
        let pattern = Pattern::new(r"^\d+$").unwrap();
        assert!(pattern.is_match("123"));
        assert!(!pattern.is_match("abc"));
        assert!(!pattern.is_match("12a"));
    }

    #[test]
    fn test_literal_with_flags() {
        let pattern = Pattern::new("/^[a-z]+$/i").unwrap();
        assert!(pattern.is_match("ABC"));
        assert_eq!(pattern.as_str(), "/^[a-z]+$/i");
    }

    #[test]
    fn test_literal_ignores_stateful_flags() {
        let pattern = Pattern::new("/ok/gu").unwrap();
        assert!(pattern.is_match("ok"));
        assert!(pattern.is_match("ok"));
    }

    #[test]
    fn test_dot_all_flag() {
        assert!(Pattern::new("/a.b/s").unwrap().is_match("a\nb"));
        assert!(!Pattern::new("/a.b/").unwrap().is_match("a\nb"));
    }

    #[test]
    fn test_unknown_flag_treated_as_bare_source() {
        // "/x/q" is not a literal, so the slashes are part of the regex.
        let pattern = Pattern::new("/x/q").unwrap();
        assert!(pattern.is_match("a/x/q"));
        assert!(!pattern.is_match("x"));
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let err = Pattern::new("(unclosed").unwrap_err();
        assert_eq!(err.kind, pagekit_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_serde_as_string() {
        let pattern: Pattern = serde_json::from_str(r#""^\\w+$""#).unwrap();
        assert!(pattern.is_match("word"));
        assert_eq!(serde_json::to_string(&pattern).unwrap(), r#""^\\w+$""#);
        assert!(serde_json::from_str::<Pattern>(r#""[""#).is_err());
    }
}
