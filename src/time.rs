//! Weekday and minute-of-day primitives, and the overlap arithmetic that
//! everything else in this crate is built on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One weekday, serialized as its three-letter tag (`"Mon"`, `"Tue"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        };
        f.write_str(s)
    }
}

/// Minutes from midnight, weekday-local. No timezone, no date.
pub type Minute = u16;

/// Upper bound (exclusive for starts, inclusive for block/meeting ends) on [`Minute`].
pub const MINUTES_PER_DAY: Minute = 1440;

/// A single weekly recurring class meeting.
///
/// Invariant: `0 <= start_min < end_min <= 1440`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub day: Day,
    pub start_min: Minute,
    pub end_min: Minute,
    pub location: Option<String>,
}

impl Meeting {
    pub fn new(
        day: Day,
        start_min: Minute,
        end_min: Minute,
        location: Option<String>,
    ) -> Result<Self, String> {
        if start_min >= end_min || end_min > MINUTES_PER_DAY {
            return Err(format!(
                "invalid meeting bounds: start_min={start_min} end_min={end_min}"
            ));
        }
        Ok(Self {
            day,
            start_min,
            end_min,
            location,
        })
    }

    /// Half-open interval overlap: same day and `!(a.end <= b.start || a.start >= b.end)`.
    pub fn overlaps(&self, other: &Meeting) -> bool {
        self.day == other.day && !(self.end_min <= other.start_min || self.start_min >= other.end_min)
    }

    /// Whether this meeting conflicts with an unavailability window on the same day,
    /// and how many minutes overlap if so.
    pub fn conflict_with_block(&self, day: Day, block_start: Minute, block_end: Minute) -> (bool, Minute) {
        if self.day != day || self.end_min <= block_start || self.start_min >= block_end {
            return (false, 0);
        }
        let overlap_start = self.start_min.max(block_start);
        let overlap_end = self.end_min.min(block_end);
        (true, overlap_end.saturating_sub(overlap_start))
    }
}

/// A weekday interval the student is unavailable.
///
/// Invariant: `0 <= start_min <= end_min <= 1440`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub day: Day,
    pub start_min: Minute,
    pub end_min: Minute,
}

impl AvailabilityBlock {
    pub fn new(day: Day, start_min: Minute, end_min: Minute) -> Result<Self, String> {
        if start_min > end_min || end_min > MINUTES_PER_DAY {
            return Err(format!(
                "invalid availability block: start_min={start_min} end_min={end_min}"
            ));
        }
        Ok(Self {
            day,
            start_min,
            end_min,
        })
    }
}
