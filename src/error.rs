//! Error taxonomy (C7): non-fatal normalization warnings plus the
//! caller-facing solve error enum, following the teacher's per-boundary
//! `thiserror` enum convention (see `src/banner/errors.rs` in the teacher).

use thiserror::Error;

use crate::course_key::CourseKey;

/// A non-fatal issue encountered while normalizing a single row. Collected
/// alongside the normalized offerings rather than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeWarning {
    #[error("malformed row: {reason}")]
    MalformedRow { reason: String },

    #[error("crn {crn}: unparseable field {field}")]
    UnparseableField { crn: String, field: String },
}

/// Errors returned by [`crate::solver::solve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown course: {0}")]
    UnknownCourse(CourseKey),
}
