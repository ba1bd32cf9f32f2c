//! Normalizer (C3): turns semi-structured tabular rows into canonical
//! [`Offering`]s — day/time grammar parsing, status/delivery/credit field
//! normalization, CRN-merging across rows, and meeting-signature dedup.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::course_key::CourseKey;
use crate::error::NormalizeWarning;
use crate::offering::{Delivery, Offering, Status};
use crate::time::{Day, Meeting, Minute};

/// One logical input row. Field names follow spec.md §4.1's logical
/// columns; the host is responsible for getting a CSV/JSON/spreadsheet
/// row into this shape (by meaning, not necessarily by matching header
/// text verbatim).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub crn: Option<String>,
    pub course: Option<String>,
    pub title: Option<String>,
    pub section: Option<String>,
    pub term: Option<String>,
    pub days: Option<String>,
    pub times: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub max: Option<String>,
    pub now: Option<String>,
    pub instructor: Option<String>,
    pub delivery_mode: Option<String>,
    pub credits: Option<String>,
    pub info: Option<String>,
    pub comments: Option<String>,
}

fn is_blank_or_tba(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("TBA")
}

/// Parses a day-string grammar (`M,T,W,R,F,S,U`; `R` is Thursday, `T` is
/// Tuesday). Unknown characters are skipped; `""`/`"TBA"` yield `[]`.
pub fn parse_days(days_str: &str) -> Vec<Day> {
    if is_blank_or_tba(days_str) {
        return vec![];
    }

    days_str
        .trim()
        .chars()
        .filter_map(|c| match c.to_ascii_uppercase() {
            'M' => Some(Day::Mon),
            'T' => Some(Day::Tue),
            'W' => Some(Day::Wed),
            'R' => Some(Day::Thu),
            'F' => Some(Day::Fri),
            'S' => Some(Day::Sat),
            'U' => Some(Day::Sun),
            _ => None,
        })
        .collect()
}

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(AM|PM)").unwrap());

/// Parses `H:MM{AM|PM}` into minutes from midnight. Noon is 720, midnight is 0.
pub fn parse_time(time_str: &str) -> Option<Minute> {
    if is_blank_or_tba(time_str) {
        return None;
    }
    let caps = TIME_RE.captures(time_str.trim())?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    let meridiem = caps.get(3)?.as_str().to_ascii_uppercase();

    let hour24 = match (hour, meridiem.as_str()) {
        (12, "AM") => 0,
        (h, "AM") => h,
        (12, "PM") => 12,
        (h, "PM") => h + 12,
        _ => return None,
    };

    Some((hour24 * 60 + minute) as Minute)
}

static RANGE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*|\s+to\s+").unwrap());

/// Parses a time range (`"8:30 AM - 9:50 AM"`, `"8:30 AM to 9:50 AM"`) into
/// `(start, end)`. Either empty or `"TBA"` yields `None`.
pub fn parse_times(times_str: &str) -> Option<(Minute, Minute)> {
    if is_blank_or_tba(times_str) {
        return None;
    }
    let mut parts = RANGE_SPLIT_RE.splitn(times_str.trim(), 2);
    let start = parse_time(parts.next()?)?;
    let end = parse_time(parts.next()?)?;
    Some((start, end))
}

/// Case-insensitive substring match: `"closed"` -> Closed, `"wait"` -> Waitlist,
/// else Open.
pub fn normalize_status(status_str: &str) -> Status {
    let lower = status_str.trim().to_lowercase();
    if lower.contains("closed") {
        Status::Closed
    } else if lower.contains("wait") {
        Status::Waitlist
    } else {
        Status::Open
    }
}

/// Normalizes delivery mode, falling back to inference from `location` when
/// `delivery_str` is empty, and to `InPerson` otherwise.
pub fn normalize_delivery(delivery_str: &str, location: &str) -> Delivery {
    if delivery_str.trim().is_empty() {
        let loc_lower = location.to_lowercase();
        if loc_lower.contains("online") || loc_lower.contains("web") {
            return Delivery::Online;
        }
        return Delivery::InPerson;
    }

    let lower = delivery_str.trim().to_lowercase();
    if lower.contains("online") || lower.contains("web") || lower.contains("distance") {
        Delivery::Online
    } else if lower.contains("hybrid") || lower.contains("blended") {
        Delivery::Hybrid
    } else if lower.contains("async") || lower.contains("asynchronous") {
        Delivery::Async
    } else {
        Delivery::InPerson
    }
}

static COURSE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)\s*(\d+)([A-Z]*)").unwrap());

/// Extracts `"SUBJECT NUMBER[SUFFIX]"` from free-text course identifiers
/// like `"CS100"`, `"CS 100"`, `"PHYS111A"`. Falls back to the uppercased,
/// trimmed input when the pattern doesn't match.
pub fn extract_course_key(course_str: &str) -> CourseKey {
    let upper = course_str.trim().to_uppercase();
    if let Some(caps) = COURSE_KEY_RE.captures(&upper) {
        let subject = &caps[1];
        let number = &caps[2];
        let suffix = &caps[3];
        return CourseKey::new(format!("{subject} {number}{suffix}"));
    }
    CourseKey::new(upper)
}

fn parse_u32(s: &Option<String>) -> Option<u32> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .map(|v| v.max(0.0) as u32)
}

fn parse_f64(s: &Option<String>) -> Option<f64> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalizes one row into an [`Offering`], collecting non-fatal warnings.
///
/// A row with an empty CRN or empty course key is silently dropped
/// (returns `None`) per spec.md §7's `MalformedRow` policy. A row with an
/// unparseable day/time token yields an offering with empty meetings
/// rather than being dropped.
pub fn normalize_row(row: &RawRow, warnings: &mut Vec<NormalizeWarning>) -> Option<Offering> {
    let crn = row.crn.as_deref().unwrap_or("").trim().to_string();
    if crn.is_empty() {
        warnings.push(NormalizeWarning::MalformedRow {
            reason: "missing CRN".into(),
        });
        return None;
    }

    let course_raw = row.course.as_deref().unwrap_or("").trim();
    let course_key = extract_course_key(course_raw);
    if course_key.as_str().is_empty() {
        warnings.push(NormalizeWarning::MalformedRow {
            reason: format!("crn {crn}: missing course key"),
        });
        return None;
    }

    let days_str = row.days.as_deref().unwrap_or("");
    let times_str = row.times.as_deref().unwrap_or("");
    let days = parse_days(days_str);
    let times = parse_times(times_str);

    if (!days_str.trim().is_empty() && !days_str.trim().eq_ignore_ascii_case("TBA") && days.is_empty())
        || (!is_blank_or_tba(times_str) && times.is_none())
    {
        warnings.push(NormalizeWarning::UnparseableField {
            crn: crn.clone(),
            field: if times.is_none() && !is_blank_or_tba(times_str) {
                "times".into()
            } else {
                "days".into()
            },
        });
    }

    let mut meetings = Vec::new();
    if let Some((start, end)) = times {
        let location = non_empty(&row.location);
        for day in &days {
            match Meeting::new(*day, start, end, location.clone()) {
                Ok(meeting) => meetings.push(meeting),
                Err(_) => warnings.push(NormalizeWarning::UnparseableField {
                    crn: crn.clone(),
                    field: "times".into(),
                }),
            }
        }
    }

    let status = normalize_status(row.status.as_deref().unwrap_or(""));
    let delivery = normalize_delivery(
        row.delivery_mode.as_deref().unwrap_or(""),
        row.location.as_deref().unwrap_or(""),
    );

    Some(Offering {
        crn,
        course_key,
        section: row.section.as_deref().unwrap_or("").trim().to_string(),
        title: row.title.as_deref().unwrap_or("").trim().to_string(),
        term: non_empty(&row.term),
        instructor: non_empty(&row.instructor),
        meetings,
        status,
        delivery,
        capacity: parse_u32(&row.max),
        enrolled: parse_u32(&row.now),
        credits: parse_f64(&row.credits),
        info: non_empty(&row.info),
        comments: non_empty(&row.comments),
    })
}

fn meeting_signature(offering: &Offering) -> Vec<(Day, Minute, Minute)> {
    let mut sig: Vec<_> = offering
        .meetings
        .iter()
        .map(|m| (m.day, m.start_min, m.end_min))
        .collect();
    sig.sort();
    sig
}

/// Merges offerings sharing a CRN by unioning their meetings (by distinct
/// `(day, start, end)`); the first occurrence wins for non-meeting
/// attributes.
pub fn merge_by_crn(offerings: Vec<Offering>) -> Vec<Offering> {
    let mut order: Vec<String> = Vec::new();
    let mut by_crn: HashMap<String, Offering> = HashMap::new();

    for offering in offerings {
        match by_crn.get_mut(&offering.crn) {
            None => {
                order.push(offering.crn.clone());
                by_crn.insert(offering.crn.clone(), offering);
            }
            Some(existing) => {
                for meeting in offering.meetings {
                    let exists = existing.meetings.iter().any(|m| {
                        m.day == meeting.day && m.start_min == meeting.start_min && m.end_min == meeting.end_min
                    });
                    if !exists {
                        existing.meetings.push(meeting);
                    }
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|crn| by_crn.remove(&crn))
        .collect()
}

/// Drops offerings whose `(crn, sorted meetings)` signature has already
/// been seen, preserving first-seen order.
pub fn dedupe_by_signature(offerings: Vec<Offering>) -> Vec<Offering> {
    let mut seen = std::collections::HashSet::new();
    offerings
        .into_iter()
        .filter(|o| seen.insert((o.crn.clone(), meeting_signature(o))))
        .collect()
}

/// Normalizes a batch of rows into deduplicated, CRN-merged offerings.
pub fn normalize_rows(rows: impl IntoIterator<Item = RawRow>) -> (Vec<Offering>, Vec<NormalizeWarning>) {
    let mut warnings = Vec::new();
    let offerings: Vec<Offering> = rows
        .into_iter()
        .filter_map(|row| normalize_row(&row, &mut warnings))
        .collect();
    let merged = merge_by_crn(offerings);
    (dedupe_by_signature(merged), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_grammar_handles_thursday_and_tuesday_distinctly() {
        assert_eq!(parse_days("MW"), vec![Day::Mon, Day::Wed]);
        assert_eq!(parse_days("TR"), vec![Day::Tue, Day::Thu]);
        assert_eq!(parse_days("MWF"), vec![Day::Mon, Day::Wed, Day::Fri]);
        assert_eq!(parse_days("S"), vec![Day::Sat]);
        assert_eq!(parse_days("mw"), vec![Day::Mon, Day::Wed]);
    }

    #[test]
    fn day_grammar_empty_and_tba() {
        assert_eq!(parse_days(""), Vec::<Day>::new());
        assert_eq!(parse_days("TBA"), Vec::<Day>::new());
        assert_eq!(parse_days("tba"), Vec::<Day>::new());
    }

    #[test]
    fn time_grammar_noon_and_midnight() {
        assert_eq!(parse_time("12:00 PM"), Some(720));
        assert_eq!(parse_time("12:00 AM"), Some(0));
        assert_eq!(parse_time("8:30 AM"), Some(510));
        assert_eq!(parse_time("11:20 PM"), Some(1400));
        assert_eq!(parse_time("8:30 am"), Some(510));
    }

    #[test]
    fn time_grammar_tba_and_empty() {
        assert_eq!(parse_time("TBA"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn time_range_parses_both_separators() {
        assert_eq!(parse_times("8:30 AM - 9:50 AM"), Some((510, 590)));
        assert_eq!(parse_times("8:30 AM to 9:50 AM"), Some((510, 590)));
        assert_eq!(parse_times("TBA"), None);
        assert_eq!(parse_times(""), None);
    }

    #[test]
    fn course_key_extraction() {
        assert_eq!(extract_course_key("CS 100").as_str(), "CS 100");
        assert_eq!(extract_course_key("CS100").as_str(), "CS 100");
        assert_eq!(extract_course_key("ACCT115").as_str(), "ACCT 115");
        assert_eq!(extract_course_key("PHYS111A").as_str(), "PHYS 111A");
        assert_eq!(extract_course_key("cs100").as_str(), "CS 100");
    }

    #[test]
    fn status_normalization() {
        assert_eq!(normalize_status("Open"), Status::Open);
        assert_eq!(normalize_status("Closed"), Status::Closed);
        assert_eq!(normalize_status("Waitlist"), Status::Waitlist);
        assert_eq!(normalize_status("CLOSED"), Status::Closed);
        assert_eq!(normalize_status(""), Status::Open);
    }

    #[test]
    fn delivery_normalization_and_location_inference() {
        assert_eq!(normalize_delivery("Face-to-Face", ""), Delivery::InPerson);
        assert_eq!(normalize_delivery("Online", ""), Delivery::Online);
        assert_eq!(normalize_delivery("Hybrid", ""), Delivery::Hybrid);
        assert_eq!(normalize_delivery("Asynchronous Online", ""), Delivery::Async);
        assert_eq!(normalize_delivery("", "Online Platform"), Delivery::Online);
        assert_eq!(normalize_delivery("ONLINE", ""), Delivery::Online);
    }

    fn row(fields: &[(&str, &str)]) -> RawRow {
        let map: HashMap<&str, &str> = fields.iter().copied().collect();
        RawRow {
            crn: map.get("crn").map(|s| s.to_string()),
            course: map.get("course").map(|s| s.to_string()),
            title: map.get("title").map(|s| s.to_string()),
            section: map.get("section").map(|s| s.to_string()),
            term: map.get("term").map(|s| s.to_string()),
            days: map.get("days").map(|s| s.to_string()),
            times: map.get("times").map(|s| s.to_string()),
            location: map.get("location").map(|s| s.to_string()),
            status: map.get("status").map(|s| s.to_string()),
            max: map.get("max").map(|s| s.to_string()),
            now: map.get("now").map(|s| s.to_string()),
            instructor: map.get("instructor").map(|s| s.to_string()),
            delivery_mode: map.get("delivery_mode").map(|s| s.to_string()),
            credits: map.get("credits").map(|s| s.to_string()),
            info: map.get("info").map(|s| s.to_string()),
            comments: map.get("comments").map(|s| s.to_string()),
        }
    }

    #[test]
    fn normalize_basic_row() {
        let r = row(&[
            ("crn", "11757"),
            ("course", "CS100"),
            ("title", "ROADMAP TO COMPUTING"),
            ("section", "002"),
            ("term", "202610"),
            ("days", "MW"),
            ("times", "11:30 AM - 12:50 PM"),
            ("location", "CKB 217"),
            ("status", "Open"),
            ("max", "80"),
            ("now", "0"),
            ("instructor", "Spirollari, Junilda"),
            ("delivery_mode", "Face-to-Face"),
            ("credits", "3"),
        ]);
        let mut warnings = Vec::new();
        let offering = normalize_row(&r, &mut warnings).unwrap();
        assert_eq!(offering.crn, "11757");
        assert_eq!(offering.course_key.as_str(), "CS 100");
        assert_eq!(offering.meetings.len(), 2);
        assert_eq!(offering.meetings[0].day, Day::Mon);
        assert_eq!(offering.meetings[0].start_min, 690);
        assert_eq!(offering.meetings[0].end_min, 770);
        assert_eq!(offering.capacity, Some(80));
        assert_eq!(offering.enrolled, Some(0));
        assert_eq!(offering.credits, Some(3.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn tba_row_retains_offering_with_no_meetings() {
        let r = row(&[
            ("crn", "15862"),
            ("course", "CS101"),
            ("section", "HS1"),
            ("days", ""),
            ("times", "TBA"),
            ("status", "Closed"),
        ]);
        let mut warnings = Vec::new();
        let offering = normalize_row(&r, &mut warnings).unwrap();
        assert!(offering.meetings.is_empty());
        assert_eq!(offering.status, Status::Closed);
    }

    #[test]
    fn missing_crn_row_is_dropped() {
        let r = row(&[("course", "CS100"), ("days", "MW")]);
        let mut warnings = Vec::new();
        assert!(normalize_row(&r, &mut warnings).is_none());
        assert!(matches!(warnings[0], NormalizeWarning::MalformedRow { .. }));
    }

    #[test]
    fn crn_merge_unions_meetings_first_row_wins_metadata() {
        let r1 = row(&[
            ("crn", "9001"),
            ("course", "CS 100"),
            ("title", "First Title"),
            ("days", "T"),
            ("times", "9:00 AM - 9:50 AM"),
        ]);
        let r2 = row(&[
            ("crn", "9001"),
            ("course", "CS 100"),
            ("title", "Second Title"),
            ("days", "R"),
            ("times", "9:00 AM - 9:50 AM"),
        ]);
        let (offerings, _) = normalize_rows(vec![r1, r2]);
        assert_eq!(offerings.len(), 1);
        let merged = &offerings[0];
        assert_eq!(merged.title, "First Title");
        assert_eq!(merged.meetings.len(), 2);
        let days: std::collections::HashSet<_> = merged.meetings.iter().map(|m| m.day).collect();
        assert!(days.contains(&Day::Tue));
        assert!(days.contains(&Day::Thu));
        for m in &merged.meetings {
            assert_eq!(m.start_min, 540);
            assert_eq!(m.end_min, 590);
        }
    }

    #[test]
    fn dedupe_removes_identical_crn_and_meeting_signature() {
        let r = row(&[
            ("crn", "12345"),
            ("course", "CS 100"),
            ("days", "MW"),
            ("times", "10:00 AM - 12:00 PM"),
        ]);
        let (offerings, _) = normalize_rows(vec![r.clone(), r]);
        assert_eq!(offerings.len(), 1);
    }

    #[test]
    fn normalizing_same_input_twice_gives_equal_offering_lists() {
        let rows = vec![
            row(&[("crn", "1"), ("course", "CS 100"), ("days", "MW"), ("times", "9:00 AM - 9:50 AM")]),
            row(&[("crn", "2"), ("course", "MATH 111"), ("days", "TR"), ("times", "11:00 AM - 12:15 PM")]),
        ];
        let (a, _) = normalize_rows(rows.clone());
        let (b, _) = normalize_rows(rows);
        assert_eq!(a, b);
    }
}
