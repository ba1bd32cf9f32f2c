//! The normalized, immutable catalog of offerings that the filter engine
//! and solver operate over.
//!
//! Offerings are stored in one contiguous `Vec` indexed by [`SectionId`]
//! (spec.md §9's "arena-friendly layout") so candidate sets are cheap
//! `Vec<SectionId>`s rather than a graph of owned clones.

use std::collections::HashMap;

use crate::course_key::CourseKey;
use crate::error::NormalizeWarning;
use crate::filters::{self, ScheduleFilters};
use crate::normalizer::RawRow;
use crate::offering::{Offering, SectionId};

/// The full set of normalized offerings for a term, plus a by-course index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    offerings: Vec<Offering>,
    by_course: HashMap<CourseKey, Vec<SectionId>>,
}

impl Catalog {
    pub fn new(offerings: Vec<Offering>) -> Self {
        let mut by_course: HashMap<CourseKey, Vec<SectionId>> = HashMap::new();
        for (i, offering) in offerings.iter().enumerate() {
            by_course
                .entry(offering.course_key.clone())
                .or_default()
                .push(SectionId(i as u32));
        }
        Self {
            offerings,
            by_course,
        }
    }

    /// Normalizes a batch of raw rows into a catalog, returning any
    /// non-fatal warnings alongside it.
    #[tracing::instrument(
        name = "normalize",
        skip_all,
        fields(rows_in = tracing::field::Empty, offerings_out = tracing::field::Empty)
    )]
    pub fn from_rows(rows: impl IntoIterator<Item = RawRow>) -> (Catalog, Vec<NormalizeWarning>) {
        let rows: Vec<RawRow> = rows.into_iter().collect();
        let rows_in = rows.len();
        let (offerings, warnings) = crate::normalizer::normalize_rows(rows);
        let offerings_out = offerings.len();
        tracing::Span::current().record("rows_in", rows_in).record("offerings_out", offerings_out);
        (Catalog::new(offerings), warnings)
    }

    /// Combines two catalogs, re-applying CRN-merge and meeting-signature
    /// dedup across the union (spec.md §6: "multi-file ingestion applies
    /// CRN-merging across all rows before deduplication").
    pub fn merge(self, other: Catalog) -> Catalog {
        let mut combined = self.offerings;
        combined.extend(other.offerings);
        let merged = crate::normalizer::merge_by_crn(combined);
        let deduped = crate::normalizer::dedupe_by_signature(merged);
        Catalog::new(deduped)
    }

    pub fn offering(&self, id: SectionId) -> &Offering {
        &self.offerings[id.index()]
    }

    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    pub fn section_count(&self) -> usize {
        self.offerings.len()
    }

    pub fn course_count(&self) -> usize {
        self.by_course.len()
    }

    /// Whether the catalog contains *any* offering for this course key,
    /// regardless of filters — used to distinguish "unknown course" from
    /// "known course, filtered to zero candidates".
    pub fn has_course(&self, course_key: &CourseKey) -> bool {
        self.by_course.contains_key(course_key)
    }

    /// All offerings for `course_key` that survive `filters`, in catalog
    /// (input) order.
    pub fn candidates(&self, course_key: &CourseKey, filters: &ScheduleFilters) -> Vec<SectionId> {
        self.by_course
            .get(course_key)
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| filters::accepts(self.offering(*id), filters))
            .collect()
    }
}
