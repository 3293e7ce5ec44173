// Module for aggregating workout records into per-session summaries.
use crate::model::{WorkoutSetRecord, WorkoutSummary, parse_session_timestamp, session_date_key};
use std::collections::HashMap;

/// Volume contributed by a single set.
///
/// Missing reps count as 1 so bodyweight or unloaded sets still register a
/// rep; missing weight counts as 0 so unlogged weight never inflates volume.
pub fn set_volume(reps: Option<u32>, weight_kg: Option<f32>) -> f32 {
    reps.unwrap_or(1) as f32 * weight_kg.unwrap_or(0.0)
}

/// Compute per-title session summaries with chained volume deltas.
///
/// Records are grouped by calendar date and workout title; a record is
/// dropped when its title has a non-empty entry in `selected_exercises` that
/// excludes its exercise name. Each title's summaries come back sorted
/// ascending by parsed date with `volume_diff`/`volume_diff_percent` computed
/// against the immediately preceding session of the same title.
///
/// Pure and total: an empty input yields an empty map, and a record whose
/// timestamp fails to parse groups under its raw string and sorts before
/// dated sessions instead of causing an error.
pub fn calculate_workout_summaries(
    records: &[WorkoutSetRecord],
    selected_exercises: &HashMap<String, Vec<String>>,
) -> HashMap<String, Vec<WorkoutSummary>> {
    // Group by (date-only key, title), keeping first-appearance order so the
    // later stable sort is reproducible for same-date sessions.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<&WorkoutSetRecord>> = HashMap::new();
    for record in records {
        if let Some(selection) = selected_exercises.get(&record.title) {
            if !selection.is_empty() && !selection.iter().any(|e| e == &record.exercise_title) {
                continue;
            }
        }
        let key = (session_date_key(&record.start_time), record.title.clone());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    let mut by_title: HashMap<String, Vec<WorkoutSummary>> = HashMap::new();
    for key in &order {
        let group = &groups[key];
        let total_sets = group.len();
        let total_reps: u32 = group.iter().map(|r| r.reps.unwrap_or(1)).sum();
        let total_volume: f32 = group.iter().map(|r| set_volume(r.reps, r.weight_kg)).sum();
        let mut exercises: Vec<String> = Vec::new();
        for r in group {
            if !exercises.contains(&r.exercise_title) {
                exercises.push(r.exercise_title.clone());
            }
        }
        by_title
            .entry(key.1.clone())
            .or_default()
            .push(WorkoutSummary {
                title: key.1.clone(),
                // first record's original timestamp, time-of-day included
                date: group[0].start_time.clone(),
                total_sets,
                total_reps,
                total_volume,
                volume_diff: 0.0,
                volume_diff_percent: 0.0,
                exercises,
            });
    }

    for summaries in by_title.values_mut() {
        summaries.sort_by_key(|s| sort_stamp(&s.date));
        let mut prev_volume: Option<f32> = None;
        for summary in summaries.iter_mut() {
            if let Some(prev) = prev_volume {
                summary.volume_diff = summary.total_volume - prev;
                summary.volume_diff_percent = if prev > 0.0 {
                    summary.volume_diff / prev * 100.0
                } else {
                    0.0
                };
            }
            prev_volume = Some(summary.total_volume);
        }
    }

    by_title
}

/// Sortable chronological key for a session timestamp. Unparseable values
/// fall at the front in a stable position.
fn sort_stamp(raw: &str) -> i64 {
    match parse_session_timestamp(raw) {
        Some(dt) => dt.and_utc().timestamp(),
        None => {
            log::warn!("Unparseable session timestamp {raw:?}; ordering it first");
            i64::MIN
        }
    }
}

/// Format a weight with two decimals, comma decimal separator, space
/// thousands separators, and a `kg` suffix, e.g. `1 234,50 kg`.
pub fn format_weight(value: f32) -> String {
    let fixed = format!("{value:.2}").replace('.', ",");
    format!("{} kg", group_thousands(&fixed))
}

pub fn format_percentage(value: f32) -> String {
    format!("{value:.2}%")
}

/// Combined signed delta display, e.g. `+200,00 kg (+20.00%)`.
pub fn format_volume_diff(diff: f32, percent: f32) -> String {
    let sign = if diff >= 0.0 { "+" } else { "-" };
    format!(
        "{sign}{} ({sign}{})",
        format_weight(diff.abs()),
        format_percentage(percent.abs())
    )
}

pub fn format_number(value: f32, decimals: usize) -> String {
    group_thousands(&format!("{value:.decimals$}"))
}

/// Session timestamp rendered as `DD/MM/YYYY, HH:MM`, or the raw string when
/// it doesn't parse.
pub fn format_date(raw: &str) -> String {
    match parse_session_timestamp(raw) {
        Some(dt) => dt.format("%d/%m/%Y, %H:%M").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_date_only(raw: &str) -> String {
    match parse_session_timestamp(raw) {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, rest) = fixed
        .strip_prefix('-')
        .map_or(("", fixed), |r| ("-", r));
    let split = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (int_part, tail) = rest.split_at(split);
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}{tail}")
}
