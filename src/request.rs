//! Solve request/response shapes (C6), grounded on `SolveRequest`/`Schedule`
//! in the source implementation's `models.py`.

use serde::{Deserialize, Serialize};

use crate::course_key::CourseKey;
use crate::filters::ScheduleFilters;
use crate::offering::Offering;
use crate::time::AvailabilityBlock;

fn default_max_results() -> usize {
    500
}

/// A request to solve for valid schedules against a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub required_course_keys: Vec<CourseKey>,
    #[serde(default)]
    pub optional_course_keys: Option<Vec<CourseKey>>,
    #[serde(default)]
    pub min_credits: Option<f64>,
    #[serde(default)]
    pub max_credits: Option<f64>,
    #[serde(default)]
    pub unavailable: Vec<AvailabilityBlock>,
    #[serde(default)]
    pub filters: ScheduleFilters,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SolveRequest {
    /// Structural validation applied before solving (spec.md §5's
    /// `InvalidRequest` conditions): a non-empty required course list, a
    /// max_results within `[1, 2000]`, and a sane credit window.
    pub fn validate(&self) -> Result<(), crate::error::SolveError> {
        use crate::error::SolveError;

        if self.required_course_keys.is_empty() {
            return Err(SolveError::InvalidRequest("required_course_keys must not be empty".into()));
        }
        if !(1..=2000).contains(&self.max_results) {
            return Err(SolveError::InvalidRequest("max_results must be in [1, 2000]".into()));
        }
        if let (Some(min), Some(max)) = (self.min_credits, self.max_credits)
            && min > max
        {
            return Err(SolveError::InvalidRequest("min_credits must not exceed max_credits".into()));
        }
        Ok(())
    }
}

/// One concrete, internally-consistent combination of offerings — one per
/// required course key, no pairwise time conflicts, no availability
/// conflicts — plus its computed rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub offerings: Vec<Offering>,
    pub total_credits: f64,
    pub score: f64,
}

/// The solver's full output for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub schedules: Vec<Schedule>,
    pub count: usize,
    pub catalog_course_count: usize,
    pub catalog_section_count: usize,
}

/// A condensed, at-a-glance view of a [`Schedule`] — presentation of the
/// existing shape, not a new export format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub crns: Vec<String>,
    pub section_count: usize,
    pub total_credits: f64,
    pub score: f64,
}

impl From<&Schedule> for ScheduleSummary {
    fn from(schedule: &Schedule) -> Self {
        Self {
            crns: schedule.offerings.iter().map(|o| o.crn.clone()).collect(),
            section_count: schedule.offerings.len(),
            total_credits: schedule.total_credits,
            score: schedule.score,
        }
    }
}

impl std::fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} credits, score {:.3}",
            self.crns.join(", "),
            self.total_credits,
            self.score
        )
    }
}
