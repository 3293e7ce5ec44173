// Module for persisted filter preferences and the filter projection.
use crate::model::{ExerciseFilter, WorkoutSetRecord, session_date, session_date_key};
use crate::store::WorkoutStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// User filter preferences: which workout titles and exercises to report on,
/// plus an optional date range.
///
/// Persisted to its own JSON file, independent of the workout records.
/// An empty `selected_workouts` list is the "no selection made yet" sentinel
/// and imposes no restriction; it is never "match nothing."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutFilters {
    #[serde(default)]
    pub selected_workouts: Vec<String>,
    #[serde(default)]
    pub exercise_filters: HashMap<String, Vec<ExerciseFilter>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl WorkoutFilters {
    const FILE: &'static str = "hevy_report_filters.json";

    fn path() -> Option<std::path::PathBuf> {
        dirs_next::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load saved preferences, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                if let Ok(filters) = serde_json::from_str(&data) {
                    return filters;
                }
            }
        }
        Self::default()
    }

    /// Persist the current preferences. Best effort: preference loss is
    /// annoying, not data loss.
    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(self) {
                Ok(data) => {
                    if let Err(e) = std::fs::write(&path, data) {
                        log::warn!("Failed to save filter preferences: {e}");
                    }
                }
                Err(e) => log::warn!("Failed to serialize filter preferences: {e}"),
            }
        }
    }

    /// Remove the saved preference file, if any.
    pub fn delete_saved() {
        if let Some(path) = Self::path() {
            let _ = std::fs::remove_file(path);
        }
    }

    /// Default the selection to "everything" the first time data is seen.
    ///
    /// No-op when a selection already exists; returns whether anything
    /// changed so callers know to save.
    pub fn initialize_for_store(&mut self, store: &WorkoutStore) -> bool {
        if !self.selected_workouts.is_empty() {
            return false;
        }
        let titles = store.get_unique_workout_titles();
        if titles.is_empty() {
            return false;
        }
        let records = store.get_all_workouts();
        for title in &titles {
            self.exercise_filters
                .insert(title.clone(), exercise_occurrences(&records, title));
        }
        self.selected_workouts = titles;
        true
    }

    /// Flip one exercise's selection. Returns the new state, or `None` when
    /// the title/exercise pair is unknown.
    pub fn toggle_exercise(&mut self, title: &str, exercise: &str) -> Option<bool> {
        let filters = self.exercise_filters.get_mut(title)?;
        let filter = filters.iter_mut().find(|f| f.exercise_title == exercise)?;
        filter.selected = !filter.selected;
        Some(filter.selected)
    }

    /// Only the selected exercise names, keyed by title, in the shape the
    /// aggregation engine consumes.
    pub fn selected_exercises_by_title(&self) -> HashMap<String, Vec<String>> {
        self.exercise_filters
            .iter()
            .map(|(title, filters)| {
                let selected = filters
                    .iter()
                    .filter(|f| f.selected)
                    .map(|f| f.exercise_title.clone())
                    .collect();
                (title.clone(), selected)
            })
            .collect()
    }

    /// The filter projection: the subset of `records` passing the title,
    /// exercise, and date-range filters (logical AND).
    pub fn apply(&self, records: &[WorkoutSetRecord]) -> Vec<WorkoutSetRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &WorkoutSetRecord) -> bool {
        if !self.selected_workouts.is_empty()
            && !self.selected_workouts.iter().any(|t| t == &record.title)
        {
            return false;
        }

        if let Some(filters) = self.exercise_filters.get(&record.title) {
            // a title with nothing selected passes everything, same as no entry
            let any_selected = filters.iter().any(|f| f.selected);
            if any_selected
                && !filters
                    .iter()
                    .any(|f| f.selected && f.exercise_title == record.exercise_title)
            {
                return false;
            }
        }

        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        match session_date(&record.start_time) {
            Some(d) => {
                self.start_date.map_or(true, |s| d >= s) && self.end_date.map_or(true, |e| d <= e)
            }
            // no position on the date axis, so a bounded range excludes it
            None => false,
        }
    }
}

/// Build the default per-exercise filter list for one title, all selected,
/// with occurrence counters (in how many sessions each exercise appears out
/// of the title's total sessions).
pub fn exercise_occurrences(records: &[WorkoutSetRecord], title: &str) -> Vec<ExerciseFilter> {
    let mut sessions: BTreeSet<String> = BTreeSet::new();
    let mut by_exercise: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.title == title) {
        let key = session_date_key(&record.start_time);
        sessions.insert(key.clone());
        by_exercise
            .entry(record.exercise_title.clone())
            .or_default()
            .insert(key);
    }
    let total = sessions.len();
    by_exercise
        .into_iter()
        .map(|(exercise_title, dates)| ExerciseFilter {
            exercise_title,
            selected: true,
            session_count: Some(dates.len()),
            total_sessions: Some(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(title: &str, start_time: &str, exercise: &str) -> WorkoutSetRecord {
        WorkoutSetRecord {
            title: title.into(),
            start_time: start_time.into(),
            exercise_title: exercise.into(),
            ..WorkoutSetRecord::default()
        }
    }

    fn sample_records() -> Vec<WorkoutSetRecord> {
        vec![
            set("Push Day A", "20 Aug 2025, 07:00", "Bench Press"),
            set("Push Day A", "27 Aug 2025, 07:20", "Bench Press"),
            set("Push Day A", "27 Aug 2025, 07:20", "Overhead Press"),
            set("Pull Day", "21 Aug 2025, 07:00", "Deadlift"),
        ]
    }

    #[test]
    fn empty_title_selection_passes_everything() {
        let filters = WorkoutFilters::default();
        let records = sample_records();
        assert_eq!(filters.apply(&records).len(), records.len());
    }

    #[test]
    fn title_selection_restricts() {
        let filters = WorkoutFilters {
            selected_workouts: vec!["Pull Day".into()],
            ..WorkoutFilters::default()
        };
        let visible = filters.apply(&sample_records());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Pull Day");
    }

    #[test]
    fn exercise_selection_restricts_within_title_only() {
        let mut filters = WorkoutFilters::default();
        filters.exercise_filters.insert(
            "Push Day A".into(),
            vec![
                ExerciseFilter {
                    exercise_title: "Bench Press".into(),
                    selected: true,
                    session_count: None,
                    total_sessions: None,
                },
                ExerciseFilter {
                    exercise_title: "Overhead Press".into(),
                    selected: false,
                    session_count: None,
                    total_sessions: None,
                },
            ],
        );
        let visible = filters.apply(&sample_records());
        assert_eq!(visible.len(), 3);
        assert!(
            visible
                .iter()
                .all(|r| r.exercise_title != "Overhead Press")
        );
    }

    #[test]
    fn all_deselected_passes_everything() {
        let mut filters = WorkoutFilters::default();
        filters.exercise_filters.insert(
            "Push Day A".into(),
            vec![ExerciseFilter {
                exercise_title: "Bench Press".into(),
                selected: false,
                session_count: None,
                total_sessions: None,
            }],
        );
        assert_eq!(filters.apply(&sample_records()).len(), 4);
    }

    #[test]
    fn date_range_is_date_only_and_inclusive() {
        let filters = WorkoutFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 8, 21),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 27),
            ..WorkoutFilters::default()
        };
        let visible = filters.apply(&sample_records());
        let times: Vec<&str> = visible.iter().map(|r| r.start_time.as_str()).collect();
        assert_eq!(
            times,
            vec!["27 Aug 2025, 07:20", "27 Aug 2025, 07:20", "21 Aug 2025, 07:00"]
        );
    }

    #[test]
    fn open_ended_bounds_constrain_one_side() {
        let filters = WorkoutFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 8, 25),
            ..WorkoutFilters::default()
        };
        assert_eq!(filters.apply(&sample_records()).len(), 2);
    }

    #[test]
    fn unparseable_date_fails_bounded_range_but_passes_unbounded() {
        let records = vec![set("A", "someday", "Bench Press")];
        let unbounded = WorkoutFilters::default();
        assert_eq!(unbounded.apply(&records).len(), 1);

        let bounded = WorkoutFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..WorkoutFilters::default()
        };
        assert!(bounded.apply(&records).is_empty());
    }

    #[test]
    fn initialize_selects_everything_with_counters() {
        let mut store = WorkoutStore::in_memory();
        store.import_workouts(sample_records()).unwrap();

        let mut filters = WorkoutFilters::default();
        assert!(filters.initialize_for_store(&store));
        assert_eq!(
            filters.selected_workouts,
            vec!["Pull Day", "Push Day A"]
        );

        let push = &filters.exercise_filters["Push Day A"];
        let bench = push
            .iter()
            .find(|f| f.exercise_title == "Bench Press")
            .unwrap();
        assert!(bench.selected);
        assert_eq!(bench.session_count, Some(2));
        assert_eq!(bench.total_sessions, Some(2));
        let ohp = push
            .iter()
            .find(|f| f.exercise_title == "Overhead Press")
            .unwrap();
        assert_eq!(ohp.session_count, Some(1));

        // second call is a no-op
        assert!(!filters.initialize_for_store(&store));
    }

    #[test]
    fn toggle_flips_selection() {
        let mut store = WorkoutStore::in_memory();
        store.import_workouts(sample_records()).unwrap();
        let mut filters = WorkoutFilters::default();
        filters.initialize_for_store(&store);

        assert_eq!(
            filters.toggle_exercise("Push Day A", "Overhead Press"),
            Some(false)
        );
        let selected = filters.selected_exercises_by_title();
        assert_eq!(selected["Push Day A"], vec!["Bench Press"]);

        assert_eq!(filters.toggle_exercise("Push Day A", "Nope"), None);
        assert_eq!(filters.toggle_exercise("Nope", "Bench Press"), None);
    }
}
