//! Schedule scoring: lower is better. Grounded directly on
//! `ScheduleSolver._compute_score`/`_compute_total_gaps` in the source
//! implementation's `solver.py`.

use std::collections::HashMap;

use crate::offering::Offering;
use crate::time::Day;

use self::weights::ScoringWeights;

pub mod weights {
    use serde::{Deserialize, Serialize};

    /// Tunable scoring coefficients, overridable per request (spec.md §9).
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ScoringWeights {
        pub gap_weight: f64,
        pub gap_violation_multiplier: f64,
        pub instructor_bonus: f64,
        pub seat_weight: f64,
        pub tie_break_modulus: u64,
        pub tie_break_scale: f64,
    }

    impl Default for ScoringWeights {
        fn default() -> Self {
            Self {
                gap_weight: 1000.0,
                gap_violation_multiplier: 10.0,
                instructor_bonus: 100.0,
                seat_weight: 1.0,
                tie_break_modulus: 1000,
                tie_break_scale: 0.001,
            }
        }
    }
}

/// FNV-1a, used for a bit-identical-across-runs tie-break hash of
/// non-numeric CRNs. The source's `hash()` is process-randomized in
/// Python 3 and cannot satisfy determinism (P7); this crate needs a
/// stable substitute with the same role.
fn stable_hash(s: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    s.bytes().fold(OFFSET_BASIS, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

fn crn_value(crn: &str) -> u64 {
    crn.parse::<u64>().unwrap_or_else(|_| stable_hash(crn))
}

/// Total gap minutes across all days, with per-day gaps computed between
/// consecutive (by start time) meetings. Gaps exceeding `max_gap_min` (if
/// set) are penalized by `gap_violation_multiplier`.
pub fn compute_total_gaps(offerings: &[Offering], max_gap_min: Option<u16>, weights: &ScoringWeights) -> u64 {
    let mut by_day: HashMap<Day, Vec<(u16, u16)>> = HashMap::new();
    for offering in offerings {
        for meeting in &offering.meetings {
            by_day.entry(meeting.day).or_default().push((meeting.start_min, meeting.end_min));
        }
    }

    let mut total_gap: u64 = 0;
    for meetings in by_day.values_mut() {
        if meetings.len() <= 1 {
            continue;
        }
        meetings.sort();
        for pair in meetings.windows(2) {
            let gap = pair[1].0 as i64 - pair[0].1 as i64;
            if gap > 0 {
                let gap = gap as u64;
                if let Some(max_gap) = max_gap_min
                    && gap > max_gap as u64
                {
                    total_gap += (gap as f64 * weights.gap_violation_multiplier) as u64;
                } else {
                    total_gap += gap;
                }
            }
        }
    }
    total_gap
}

/// Computes a schedule's ranking score (lower is better): primarily total
/// gap minutes, then instructor preference, then open seats, with a
/// deterministic CRN-based tie-break.
pub fn compute_score(
    offerings: &[Offering],
    prefer_instructors: &[String],
    max_gap_min: Option<u16>,
    weights: &ScoringWeights,
) -> f64 {
    let total_gap_minutes = compute_total_gaps(offerings, max_gap_min, weights);
    let mut score = total_gap_minutes as f64 * weights.gap_weight;

    if !prefer_instructors.is_empty() {
        let instructor_bonus = offerings
            .iter()
            .filter(|o| {
                o.instructor.as_deref().is_some_and(|instructor| {
                    let lower = instructor.to_lowercase();
                    prefer_instructors.iter().any(|pref| lower.contains(&pref.to_lowercase()))
                })
            })
            .count() as f64;
        score -= instructor_bonus * weights.instructor_bonus;
    }

    let total_seats: u64 = offerings.iter().filter_map(|o| o.seats_available()).map(u64::from).sum();
    score -= total_seats as f64 * weights.seat_weight;

    let crn_sum: u64 = offerings.iter().map(|o| crn_value(&o.crn)).fold(0u64, |acc, v| acc.wrapping_add(v));
    score += (crn_sum % weights.tie_break_modulus) as f64 * weights.tie_break_scale;

    score
}
