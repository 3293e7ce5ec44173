//! CLI driver: imports Hevy CSV exports into the local store and prints
//! per-workout-title progression reports.
//!
//! All logic lives in the library modules; this file only parses arguments,
//! wires the store, filters, and aggregation together, and formats output.

use std::collections::HashMap;
use std::process::ExitCode;

mod export;
mod filters;
mod ingest;
mod model;
mod store;
mod summary;

use filters::WorkoutFilters;
use model::WorkoutSummary;
use store::WorkoutStore;

const USAGE: &str = "\
Usage: hevy_report <command>

Commands:
  import <file.csv>                   Replace all stored data with the export
  report [--json <path>] [--csv <path>]
                                      Print progression summaries per workout
  toggle-exercise <title> <exercise>  Flip one exercise in the report filters
  clear                               Delete all stored data and saved filters";

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    match args.first().map(String::as_str) {
        Some("import") => {
            let path = args.get(1).ok_or(USAGE)?;
            cmd_import(path)
        }
        Some("report") => cmd_report(&args[1..]),
        Some("toggle-exercise") => {
            let title = args.get(1).ok_or(USAGE)?;
            let exercise = args.get(2).ok_or(USAGE)?;
            cmd_toggle_exercise(title, exercise)
        }
        Some("clear") => cmd_clear(),
        _ => Err(USAGE.to_string()),
    }
}

fn open_store() -> Result<WorkoutStore, String> {
    WorkoutStore::open_default().map_err(|e| format!("Failed to open workout store: {e}"))
}

fn cmd_import(path: &str) -> Result<(), String> {
    let mut store = open_store()?;
    let outcome = ingest::import_from_file(path, &mut store).map_err(|e| e.to_string())?;
    println!(
        "{}",
        ingest::format_import_message(outcome.records_imported, path)
    );
    Ok(())
}

fn cmd_report(args: &[String]) -> Result<(), String> {
    let (json_out, csv_out) = parse_report_args(args)?;

    let store = open_store()?;
    let records = store.get_all_workouts();
    if records.is_empty() {
        println!("No workout data imported yet. Run `hevy_report import <file.csv>` first.");
        return Ok(());
    }

    let mut filters = WorkoutFilters::load();
    if filters.initialize_for_store(&store) {
        filters.save();
    }

    let visible = filters.apply(&records);
    let selected = filters.selected_exercises_by_title();
    let summaries = summary::calculate_workout_summaries(&visible, &selected);

    if let Some(path) = &json_out {
        export::save_summaries_json(path, &summaries)
            .map_err(|e| format!("Failed to write {path}: {e}"))?;
        println!("Wrote {path}");
    }
    if let Some(path) = &csv_out {
        export::save_summaries_csv(path, &summaries)
            .map_err(|e| format!("Failed to write {path}: {e}"))?;
        println!("Wrote {path}");
    }

    print_report(&summaries);
    Ok(())
}

fn parse_report_args(args: &[String]) -> Result<(Option<String>, Option<String>), String> {
    let mut json_out = None;
    let mut csv_out = None;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => json_out = Some(it.next().ok_or("--json requires a path")?.clone()),
            "--csv" => csv_out = Some(it.next().ok_or("--csv requires a path")?.clone()),
            other => return Err(format!("Unknown report option: {other}\n\n{USAGE}")),
        }
    }
    Ok((json_out, csv_out))
}

fn print_report(summaries: &HashMap<String, Vec<WorkoutSummary>>) {
    let mut titles: Vec<&String> = summaries.keys().collect();
    titles.sort();
    for title in titles {
        println!("\n{title}");
        for s in &summaries[title] {
            println!(
                "  {}  {} sets, {} reps, {}  {}",
                summary::format_date(&s.date),
                s.total_sets,
                s.total_reps,
                summary::format_weight(s.total_volume),
                summary::format_volume_diff(s.volume_diff, s.volume_diff_percent),
            );
            println!("    exercises: {}", s.exercises.join(", "));
        }
    }
}

fn cmd_toggle_exercise(title: &str, exercise: &str) -> Result<(), String> {
    let store = open_store()?;
    let mut filters = WorkoutFilters::load();
    filters.initialize_for_store(&store);
    match filters.toggle_exercise(title, exercise) {
        Some(selected) => {
            filters.save();
            let state = if selected { "selected" } else { "deselected" };
            println!("{exercise} is now {state} for {title}");
            Ok(())
        }
        None => Err(format!("No exercise {exercise:?} recorded for {title:?}")),
    }
}

fn cmd_clear() -> Result<(), String> {
    let mut store = open_store()?;
    store
        .clear_all_workouts()
        .map_err(|e| format!("Failed to clear workout store: {e}"))?;
    WorkoutFilters::delete_saved();
    println!("All workout data cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_args_accept_export_paths() {
        let args: Vec<String> = vec!["--json".into(), "out.json".into(), "--csv".into(), "out.csv".into()];
        let (json, csv) = parse_report_args(&args).unwrap();
        assert_eq!(json.as_deref(), Some("out.json"));
        assert_eq!(csv.as_deref(), Some("out.csv"));
    }

    #[test]
    fn report_args_reject_unknown_flags() {
        let args: Vec<String> = vec!["--html".into()];
        assert!(parse_report_args(&args).is_err());
    }

    #[test]
    fn unknown_command_is_usage_error() {
        assert!(run(&["frobnicate".to_string()]).is_err());
        assert!(run(&[]).is_err());
    }
}
