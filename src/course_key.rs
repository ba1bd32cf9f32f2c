//! Normalized course-key newtype (`"SUBJECT NUMBER[SUFFIX]"`, e.g. `"CS 100"`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A normalized course key. Wrapping this (rather than passing bare
/// `String`s around) keeps catalog lookups and request validation from
/// silently comparing an un-normalized key against a normalized one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseKey(String);

impl CourseKey {
    /// Wraps an already-normalized key verbatim. Use [`crate::normalizer::extract_course_key`]
    /// to normalize raw catalog text first.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for CourseKey {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CourseKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CourseKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
