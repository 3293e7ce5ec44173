// Module for the persistent workout record store.
//
// Records live in a single JSON file; an import replaces the whole
// collection (truncate + insert), it never merges.
use crate::model::WorkoutSetRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    NoDataDir,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Serde(e) => write!(f, "serialization error: {e}"),
            StoreError::NoDataDir => write!(f, "no platform data directory available"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serde(e) => Some(e),
            StoreError::NoDataDir => None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    next_id: u64,
    records: Vec<WorkoutSetRecord>,
}

/// Durable keyed collection of [`WorkoutSetRecord`]s.
///
/// Every mutation persists before returning, so a reopened store always
/// reflects the last successful operation.
pub struct WorkoutStore {
    path: Option<PathBuf>,
    state: StoreState,
}

impl WorkoutStore {
    const FILE: &'static str = "hevy_report_workouts.json";

    /// Open the store backed by the given file. A missing file is an empty
    /// store; a corrupt one is an error rather than silent data loss.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map_err(StoreError::Serde)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Open the store at its default location under the platform data dir.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = dirs_next::data_dir().ok_or(StoreError::NoDataDir)?;
        Self::open(dir.join(Self::FILE))
    }

    /// A store with no backing file. Used by tests and one-off callers.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: StoreState::default(),
        }
    }

    /// Replace the entire collection with `records`, assigning each a fresh
    /// identifier, and return the new total count.
    ///
    /// Clear-then-insert is one failure unit: if persisting the new state
    /// fails, the store is left empty (and persisted as empty where
    /// possible), never half-written. Callers surface that as an import
    /// failure instead of showing stale data.
    pub fn import_workouts(
        &mut self,
        mut records: Vec<WorkoutSetRecord>,
    ) -> Result<usize, StoreError> {
        log::info!("Importing {} workout records...", records.len());
        let mut next_id = self.state.next_id;
        for record in &mut records {
            next_id += 1;
            record.id = Some(next_id);
        }
        self.state = StoreState { next_id, records };
        if let Err(e) = self.persist() {
            self.state.records.clear();
            let _ = self.persist();
            return Err(e);
        }
        let total = self.state.records.len();
        log::info!("Import completed. Total records: {total}");
        Ok(total)
    }

    /// All records, ascending by the raw `start_time` string.
    ///
    /// The ordering is lexicographic on the stored text, consistent with the
    /// insertion format; chronological interpretation happens later, in
    /// aggregation.
    pub fn get_all_workouts(&self) -> Vec<WorkoutSetRecord> {
        let mut records = self.state.records.clone();
        records.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        records
    }

    pub fn get_workouts_by_title(&self, title: &str) -> Vec<WorkoutSetRecord> {
        self.state
            .records
            .iter()
            .filter(|r| r.title == title)
            .cloned()
            .collect()
    }

    pub fn get_unique_workout_titles(&self) -> Vec<String> {
        let titles: BTreeSet<&str> = self.state.records.iter().map(|r| r.title.as_str()).collect();
        titles.into_iter().map(str::to_string).collect()
    }

    pub fn get_unique_exercises_by_workout(&self, title: &str) -> Vec<String> {
        let exercises: BTreeSet<&str> = self
            .state
            .records
            .iter()
            .filter(|r| r.title == title)
            .map(|r| r.exercise_title.as_str())
            .collect();
        exercises.into_iter().map(str::to_string).collect()
    }

    pub fn clear_all_workouts(&mut self) -> Result<(), StoreError> {
        log::info!("Clearing all workout records...");
        self.state.records.clear();
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        let data = serde_json::to_string_pretty(&self.state).map_err(StoreError::Serde)?;
        std::fs::write(path, data).map_err(StoreError::Io)
    }
}
