use crate::model::WorkoutSummary;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value).map_err(std::io::Error::other)
}

pub fn save_summaries_json<P: AsRef<Path>>(
    path: P,
    summaries: &HashMap<String, Vec<WorkoutSummary>>,
) -> std::io::Result<()> {
    write_json(summaries, path)
}

pub fn write_summaries_csv<W: Write>(
    writer: W,
    summaries: &HashMap<String, Vec<WorkoutSummary>>,
) -> csv::Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        title: &'a str,
        date: &'a str,
        total_sets: usize,
        total_reps: u32,
        total_volume: f32,
        volume_diff: f32,
        volume_diff_percent: f32,
        exercises: String,
    }
    let mut wtr = csv::Writer::from_writer(writer);
    let mut titles: Vec<&String> = summaries.keys().collect();
    titles.sort();
    for title in titles {
        for s in &summaries[title] {
            wtr.serialize(Row {
                title: &s.title,
                date: &s.date,
                total_sets: s.total_sets,
                total_reps: s.total_reps,
                total_volume: s.total_volume,
                volume_diff: s.volume_diff,
                volume_diff_percent: s.volume_diff_percent,
                exercises: s.exercises.join("; "),
            })?;
        }
    }
    wtr.flush().map_err(Into::into)
}

pub fn save_summaries_csv<P: AsRef<Path>>(
    path: P,
    summaries: &HashMap<String, Vec<WorkoutSummary>>,
) -> csv::Result<()> {
    write_summaries_csv(std::fs::File::create(path)?, summaries)
}
