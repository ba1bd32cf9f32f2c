//! The canonical section entity (C2) produced by the normalizer and
//! consumed by the filter engine and solver.

use serde::{Deserialize, Serialize};

use crate::course_key::CourseKey;
use crate::time::Meeting;

/// Opaque index into a [`crate::catalog::Catalog`]'s offering list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub(crate) u32);

impl SectionId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Course section enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Status {
    Open,
    Closed,
    Waitlist,
}

/// Course section delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delivery {
    InPerson,
    Online,
    Hybrid,
    Async,
}

/// A single course section offering, immutable once constructed by the
/// normalizer and shared by reference during search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    /// Opaque unique identifier; may be numeric text.
    pub crn: String,
    pub course_key: CourseKey,
    pub section: String,
    pub title: String,
    pub term: Option<String>,
    pub instructor: Option<String>,
    pub meetings: Vec<Meeting>,
    pub status: Status,
    pub delivery: Delivery,
    pub capacity: Option<u32>,
    pub enrolled: Option<u32>,
    pub credits: Option<f64>,
    pub info: Option<String>,
    pub comments: Option<String>,
}

impl Offering {
    /// `max(0, capacity - enrolled)`, undefined unless both are known.
    pub fn seats_available(&self) -> Option<u32> {
        match (self.capacity, self.enrolled) {
            (Some(cap), Some(enrolled)) => Some(cap.saturating_sub(enrolled)),
            _ => None,
        }
    }

    /// A section is honors when its code begins with `H` (case-insensitive).
    pub fn is_honors(&self) -> bool {
        self.section
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&'H'))
    }

    /// Whether any meeting of this offering overlaps any meeting of `other`.
    pub fn overlaps_with(&self, other: &Offering) -> bool {
        self.meetings
            .iter()
            .any(|m1| other.meetings.iter().any(|m2| m1.overlaps(m2)))
    }
}
