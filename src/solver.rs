//! Backtracking schedule solver (C5), grounded on `ScheduleSolver` in the
//! source implementation's `solver.py`: fail-first course ordering,
//! pairwise conflict + availability rejection during search, leaf-level
//! credit pruning, CRN-set dedup, and early termination.

use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;
use crate::course_key::CourseKey;
use crate::error::SolveError;
use crate::offering::{Offering, SectionId};
use crate::request::{Schedule, SolveRequest, SolveResponse};
use crate::scoring::{self, weights::ScoringWeights};

struct Solver<'a> {
    catalog: &'a Catalog,
    request: &'a SolveRequest,
    weights: &'a ScoringWeights,
    candidates_by_course: HashMap<CourseKey, Vec<SectionId>>,
    seen_signatures: HashSet<Vec<String>>,
    results: Vec<Schedule>,
}

impl<'a> Solver<'a> {
    #[tracing::instrument(name = "prefilter", skip_all)]
    fn new(catalog: &'a Catalog, request: &'a SolveRequest, weights: &'a ScoringWeights) -> Self {
        let mut candidates_by_course = HashMap::new();
        for course_key in &request.required_course_keys {
            let candidates = candidates_by_course
                .entry(course_key.clone())
                .or_insert_with(|| catalog.candidates(course_key, &request.filters));
            tracing::debug!(course = %course_key, candidates = candidates.len(), "candidates_per_course");
        }
        Self {
            catalog,
            request,
            weights,
            candidates_by_course,
            seen_signatures: HashSet::new(),
            results: Vec::new(),
        }
    }

    fn offering(&self, id: SectionId) -> &Offering {
        self.catalog.offering(id)
    }

    #[tracing::instrument(name = "solve", skip_all, fields(schedules_found = tracing::field::Empty, elapsed_ms = tracing::field::Empty))]
    fn solve(mut self) -> Result<Vec<Schedule>, SolveError> {
        let started = std::time::Instant::now();

        for course_key in &self.request.required_course_keys {
            if !self.catalog.has_course(course_key) {
                return Err(SolveError::UnknownCourse(course_key.clone()));
            }
        }

        let mut ordered: Vec<CourseKey> = self.request.required_course_keys.clone();
        ordered.sort_by_key(|ck| self.candidates_by_course.get(ck).map_or(0, Vec::len));

        for course_key in &ordered {
            if self.candidates_by_course.get(course_key).is_none_or(Vec::is_empty) {
                return Ok(vec![]);
            }
        }

        let mut current: Vec<SectionId> = Vec::new();
        self.backtrack(&ordered, 0, &mut current);

        self.results.sort_by(|a, b| a.score.total_cmp(&b.score));
        self.results.truncate(self.request.max_results);

        tracing::Span::current()
            .record("schedules_found", self.results.len())
            .record("elapsed_ms", started.elapsed().as_millis() as u64);

        Ok(self.results)
    }

    fn backtrack(&mut self, course_keys: &[CourseKey], idx: usize, current: &mut Vec<SectionId>) {
        if idx >= course_keys.len() {
            self.record_leaf(current);
            return;
        }

        let candidates = self.candidates_by_course.get(&course_keys[idx]).cloned().unwrap_or_default();
        for candidate in candidates {
            if self.has_conflict(candidate, current) || self.conflicts_with_availability(candidate) {
                continue;
            }

            current.push(candidate);
            self.backtrack(course_keys, idx + 1, current);
            current.pop();

            if self.results.len() >= self.request.max_results.saturating_mul(2) {
                return;
            }
        }
    }

    fn has_conflict(&self, candidate: SectionId, current: &[SectionId]) -> bool {
        let candidate_offering = self.offering(candidate);
        current.iter().any(|id| candidate_offering.overlaps_with(self.offering(*id)))
    }

    fn conflicts_with_availability(&self, candidate: SectionId) -> bool {
        let offering = self.offering(candidate);
        offering.meetings.iter().any(|meeting| {
            self.request
                .unavailable
                .iter()
                .any(|block| meeting.conflict_with_block(block.day, block.start_min, block.end_min).0)
        })
    }

    fn record_leaf(&mut self, current: &[SectionId]) {
        let offerings: Vec<&Offering> = current.iter().map(|id| self.offering(*id)).collect();

        let total_credits: f64 = offerings.iter().filter_map(|o| o.credits).sum();
        if let Some(min) = self.request.min_credits
            && total_credits < min
        {
            return;
        }
        if let Some(max) = self.request.max_credits
            && total_credits > max
        {
            return;
        }

        let mut signature: Vec<String> = offerings.iter().map(|o| o.crn.clone()).collect();
        signature.sort();

        let owned: Vec<Offering> = offerings.into_iter().cloned().collect();
        if !self.seen_signatures.insert(signature) {
            return;
        }

        let prefer_instructors = self.request.filters.prefer_instructors.clone().unwrap_or_default();
        let score = scoring::compute_score(&owned, &prefer_instructors, self.request.filters.max_gap_min, self.weights);

        self.results.push(Schedule {
            offerings: owned,
            total_credits,
            score,
        });
    }
}

/// Solves `request` against `catalog`, returning up to `max_results`
/// schedules sorted by ascending score. Scoring coefficients come from
/// `request.filters.weights` (defaults to [`ScoringWeights::default`] when
/// the request doesn't set them).
pub fn solve(catalog: &Catalog, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
    let weights = request.filters.weights.clone();
    solve_with_weights(catalog, request, &weights)
}

/// As [`solve`], but with `weights` overriding whatever is set on
/// `request.filters.weights`.
pub fn solve_with_weights(
    catalog: &Catalog,
    request: &SolveRequest,
    weights: &ScoringWeights,
) -> Result<SolveResponse, SolveError> {
    request.validate()?;
    let schedules = Solver::new(catalog, request, weights).solve()?;
    Ok(SolveResponse {
        count: schedules.len(),
        schedules,
        catalog_course_count: catalog.course_count(),
        catalog_section_count: catalog.section_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ScheduleFilters;
    use crate::normalizer::RawRow;
    use crate::time::{AvailabilityBlock, Day};

    fn row(crn: &str, course: &str, section: &str, days: &str, times: &str, instructor: &str) -> RawRow {
        RawRow {
            crn: Some(crn.into()),
            course: Some(course.into()),
            section: Some(section.into()),
            days: Some(days.into()),
            times: Some(times.into()),
            instructor: Some(instructor.into()),
            status: Some("Open".into()),
            credits: Some("3".into()),
            max: Some("30".into()),
            now: Some("10".into()),
            ..Default::default()
        }
    }

    fn request(required: &[&str]) -> SolveRequest {
        SolveRequest {
            required_course_keys: required.iter().map(|s| CourseKey::new(*s)).collect(),
            optional_course_keys: None,
            min_credits: None,
            max_credits: None,
            unavailable: vec![],
            filters: ScheduleFilters::default(),
            max_results: 500,
        }
    }

    #[test]
    fn two_non_conflicting_courses_produce_one_schedule() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "MATH 111", "001", "TR", "11:00 AM - 11:50 AM", "Smith"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let req = request(&["CS 100", "MATH 111"]);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 1);
        assert_eq!(resp.schedules[0].offerings.len(), 2);
    }

    #[test]
    fn overlapping_sections_are_rejected() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "MATH 111", "001", "MW", "9:20 AM - 10:10 AM", "Smith"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let req = request(&["CS 100", "MATH 111"]);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn unknown_course_is_an_error() {
        let rows = vec![row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe")];
        let (catalog, _) = Catalog::from_rows(rows);
        let req = request(&["PHYS 111"]);
        assert!(matches!(solve(&catalog, &req), Err(SolveError::UnknownCourse(_))));
    }

    #[test]
    fn known_course_filtered_to_zero_is_empty_not_an_error() {
        let rows = vec![row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe")];
        let (catalog, _) = Catalog::from_rows(rows);
        let mut req = request(&["CS 100"]);
        req.filters.campus_include = Some(vec!["nonexistent".into()]);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn availability_block_eliminates_conflicting_section() {
        let rows = vec![row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe")];
        let (catalog, _) = Catalog::from_rows(rows);
        let mut req = request(&["CS 100"]);
        req.unavailable = vec![AvailabilityBlock::new(Day::Mon, 540, 600).unwrap()];
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn credit_window_prunes_leaves() {
        let rows = vec![row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe")];
        let (catalog, _) = Catalog::from_rows(rows);
        let mut req = request(&["CS 100"]);
        req.min_credits = Some(4.0);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn preferred_instructor_schedule_scores_lower() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "CS 100", "002", "MW", "1:00 PM - 1:50 PM", "Smith"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let mut req = request(&["CS 100"]);
        req.filters.prefer_instructors = Some(vec!["doe".into()]);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 2);
        assert_eq!(resp.schedules[0].offerings[0].instructor.as_deref(), Some("Doe"));
    }

    #[test]
    fn weights_set_on_filters_reach_solve_without_solve_with_weights() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "CS 100", "002", "MW", "1:00 PM - 1:50 PM", "Smith"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let mut req = request(&["CS 100"]);
        req.filters.prefer_instructors = Some(vec!["smith".into()]);
        req.filters.weights.instructor_bonus = 0.0;
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 2);
        // With instructor_bonus zeroed via filters.weights, the preference no
        // longer affects ranking, so the tie-break falls back to CRN order.
        assert_eq!(resp.schedules[0].offerings[0].crn, "1");
    }

    #[test]
    fn duplicate_crn_combinations_from_multiple_candidate_paths_are_deduped() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "CS 100", "002", "MW", "9:00 AM - 9:50 AM", "Doe"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let req = request(&["CS 100"]);
        let resp = solve(&catalog, &req).unwrap();
        assert_eq!(resp.count, 2);
    }

    #[test]
    fn results_are_sorted_ascending_by_score() {
        let rows = vec![
            row("1", "CS 100", "001", "MW", "9:00 AM - 9:50 AM", "Doe"),
            row("2", "MATH 111", "001", "MW", "10:00 AM - 10:50 AM", "Smith"),
            row("3", "MATH 111", "002", "MW", "3:00 PM - 3:50 PM", "Jones"),
        ];
        let (catalog, _) = Catalog::from_rows(rows);
        let req = request(&["CS 100", "MATH 111"]);
        let resp = solve(&catalog, &req).unwrap();
        assert!(resp.count >= 2);
        for pair in resp.schedules.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }
}
