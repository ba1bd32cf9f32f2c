//! Filter engine (C4): per-section predicates applied once, before search,
//! to produce a per-course-key candidate list.

use serde::{Deserialize, Serialize};

use crate::offering::{Delivery, Offering, Status};
use crate::scoring::weights::ScoringWeights;
use crate::time::Minute;

/// Optional filters narrowing which offerings are eligible candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleFilters {
    pub status: Vec<Status>,
    pub delivery: Option<Vec<Delivery>>,
    pub campus_include: Option<Vec<String>>,
    pub campus_exclude: Option<Vec<String>>,
    pub avoid_instructors: Option<Vec<String>>,
    pub prefer_instructors: Option<Vec<String>>,
    pub earliest_start: Option<Minute>,
    pub latest_end: Option<Minute>,
    pub max_gap_min: Option<Minute>,
    pub include_honors: bool,
    pub include_non_honors: bool,
    /// Scoring coefficients, overridable per request rather than requiring
    /// a different entry point (spec.md §9: "expose the weights as fields
    /// ... rather than changing the constants silently").
    pub weights: ScoringWeights,
}

impl Default for ScheduleFilters {
    fn default() -> Self {
        Self {
            status: vec![Status::Open],
            delivery: None,
            campus_include: None,
            campus_exclude: None,
            avoid_instructors: None,
            prefer_instructors: None,
            earliest_start: None,
            latest_end: None,
            max_gap_min: None,
            include_honors: true,
            include_non_honors: true,
            weights: ScoringWeights::default(),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether `offering` survives every configured filter predicate (an AND gate).
pub fn accepts(offering: &Offering, filters: &ScheduleFilters) -> bool {
    if !filters.status.contains(&offering.status) {
        return false;
    }

    if let Some(allowed) = &filters.delivery
        && !allowed.contains(&offering.delivery)
    {
        return false;
    }

    if let Some(avoid) = &filters.avoid_instructors
        && let Some(instructor) = &offering.instructor
        && avoid.iter().any(|a| contains_ci(instructor, a))
    {
        return false;
    }

    if let Some(exclude) = &filters.campus_exclude {
        if offering.meetings.is_empty() {
            return false;
        }
        let hits = offering.meetings.iter().any(|m| {
            m.location
                .as_deref()
                .is_some_and(|loc| exclude.iter().any(|c| contains_ci(loc, c)))
        });
        if hits {
            return false;
        }
    }

    if let Some(include) = &filters.campus_include {
        let hits = offering.meetings.iter().any(|m| {
            m.location
                .as_deref()
                .is_some_and(|loc| include.iter().any(|c| contains_ci(loc, c)))
        });
        if !hits {
            return false;
        }
    }

    if let Some(earliest) = filters.earliest_start
        && offering.meetings.iter().any(|m| m.start_min < earliest)
    {
        return false;
    }

    if let Some(latest) = filters.latest_end
        && offering.meetings.iter().any(|m| m.end_min > latest)
    {
        return false;
    }

    let honors = offering.is_honors();
    if honors && !filters.include_honors {
        return false;
    }
    if !honors && !filters.include_non_honors {
        return false;
    }

    true
}
