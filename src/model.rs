// Module for the core workout data shapes and session timestamp handling.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp format used by Hevy CSV exports, e.g. `27 Aug 2025, 07:20`.
pub const HEVY_TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// One imported set: a single data row of the workout CSV.
///
/// Numeric fields are `None` when the source cell was blank or unparseable;
/// "not logged" is distinct from "logged as zero" and must stay that way
/// through aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutSetRecord {
    /// Store-assigned identifier; `None` until the record is persisted.
    pub id: Option<u64>,
    pub title: String,
    /// Original timestamp text, kept verbatim for display and ordering.
    pub start_time: String,
    pub exercise_title: String,
    pub set_index: Option<u32>,
    pub weight_kg: Option<f32>,
    pub reps: Option<u32>,
    pub distance_km: Option<f32>,
    pub duration_seconds: Option<f32>,
    pub rpe: Option<f32>,
    /// Unrecognized CSV columns, preserved but not interpreted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Aggregate for one (workout title, session) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub title: String,
    /// Original `start_time` of the session's first record, time-of-day
    /// included even though sessions group on calendar date.
    pub date: String,
    pub total_sets: usize,
    pub total_reps: u32,
    pub total_volume: f32,
    /// Signed volume change versus the previous session of the same title;
    /// 0.0 for the first session.
    pub volume_diff: f32,
    /// `volume_diff` as a percentage of the previous session's volume;
    /// 0.0 for the first session or when the previous volume was 0.
    pub volume_diff_percent: f32,
    /// Distinct exercise names in first-appearance order.
    pub exercises: Vec<String>,
}

/// Per-exercise selection state scoped to one workout title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseFilter {
    pub exercise_title: String,
    pub selected: bool,
    /// In how many of the title's sessions this exercise appears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_count: Option<usize>,
    /// Total sessions recorded for the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sessions: Option<usize>,
}

/// Parse a session timestamp string.
///
/// The Hevy export format is tried first, then RFC 3339 and a few common
/// ISO-like forms. Returns `None` for anything else; callers keep the raw
/// string as an opaque key in that case, they never fail.
pub fn parse_session_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, HEVY_TIMESTAMP_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Date-only portion of a session timestamp.
pub fn session_date(raw: &str) -> Option<NaiveDate> {
    parse_session_timestamp(raw).map(|dt| dt.date())
}

/// Date-only grouping key for a session timestamp.
///
/// `YYYY-MM-DD` for parseable timestamps; the raw string itself otherwise,
/// so records with broken dates still group consistently instead of being
/// dropped.
pub fn session_date_key(raw: &str) -> String {
    match parse_session_timestamp(raw) {
        Some(dt) => dt.date().format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hevy_timestamp() {
        let dt = parse_session_timestamp("27 Aug 2025, 07:20").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 8, 27).unwrap());
        assert_eq!(dt.format("%H:%M").to_string(), "07:20");
    }

    #[test]
    fn parses_fallback_formats() {
        assert!(parse_session_timestamp("2025-08-27T07:20:00+02:00").is_some());
        assert!(parse_session_timestamp("2025-08-27 07:20").is_some());
        assert!(parse_session_timestamp("2025-08-27 07:20:15").is_some());
        assert!(parse_session_timestamp("2025-08-27").is_some());
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_session_timestamp("not a date").is_none());
        assert!(parse_session_timestamp("").is_none());
        assert!(parse_session_timestamp("32 Aug 2025, 07:20").is_none());
    }

    #[test]
    fn date_key_falls_back_to_raw_string() {
        assert_eq!(session_date_key("27 Aug 2025, 07:20"), "2025-08-27");
        assert_eq!(session_date_key("someday"), "someday");
    }
}
