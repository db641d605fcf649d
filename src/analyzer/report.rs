use crate::analyzer::agenda::{Agenda, build_agenda};
use crate::analyzer::stats::{Breakdown, Statistics, compute_breakdown, compute_statistics, percent};
use crate::model::{Category, Priority, Routine};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub generated_at: String,
    pub statistics: Statistics,
    pub breakdown: Breakdown,
    pub agenda: Agenda,
    pub notes: Vec<String>,
}

#[derive(Debug)]
pub struct SavedReport {
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

pub fn build_daily_report(date: NaiveDate, routines: &[Routine]) -> DailyReport {
    let generated_at: DateTime<Utc> = Utc::now();
    let statistics = compute_statistics(routines);
    let breakdown = compute_breakdown(routines);
    let agenda = build_agenda(routines, date);
    let notes = detect_notes(routines, &statistics, &agenda);

    DailyReport {
        date: date.format("%Y-%m-%d").to_string(),
        generated_at: generated_at.to_rfc3339(),
        statistics,
        breakdown,
        agenda,
        notes,
    }
}

pub fn render_markdown(report: &DailyReport) -> String {
    let stats = &report.statistics;

    let category_rows = Category::ALL
        .into_iter()
        .map(|category| {
            let key = category.as_str();
            format!(
                "| {} | {} | {}% |",
                category.label(),
                report
                    .breakdown
                    .activities_by_category
                    .get(key)
                    .copied()
                    .unwrap_or_default(),
                report
                    .breakdown
                    .completion_by_category
                    .get(key)
                    .copied()
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let priority_rows = Priority::ALL
        .into_iter()
        .map(|priority| {
            format!(
                "- {}: {}",
                priority,
                report
                    .breakdown
                    .activities_by_priority
                    .get(priority.as_str())
                    .copied()
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let period_rows = report
        .breakdown
        .activities_by_period
        .iter()
        .map(|(period, count)| format!("- {period}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");

    let weekday_rows = report
        .breakdown
        .routines_by_weekday
        .iter()
        .map(|entry| format!("- {}: {}", entry.weekday, entry.routines))
        .collect::<Vec<_>>()
        .join("\n");

    let agenda_rows = if report.agenda.is_empty() {
        "- Nothing scheduled".to_string()
    } else {
        report
            .agenda
            .items
            .iter()
            .map(|item| {
                format!(
                    "- [{}] {}-{} {} ({}, {})",
                    if item.activity.completed { "x" } else { " " },
                    item.activity.start_time_label(),
                    item.end_time,
                    item.activity.title,
                    item.routine_name,
                    format_duration_minutes(u64::from(item.activity.duration_minutes))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let note_rows = if report.notes.is_empty() {
        "- Nothing to flag".to_string()
    } else {
        report
            .notes
            .iter()
            .map(|entry| format!("- {entry}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# Routine Report - {}\n\n## Summary\n- Routines: {} ({} active)\n- Activities completed: {}/{} ({}%)\n- Planned time: {}\n- Completed time: {}\n- Average activity: {}\n\n## Agenda ({}, {}% done)\n{}\n\n## Activities by Category\n| Category | Activities | Done |\n|----------|------------|------|\n{}\n\n## Activities by Priority\n{}\n\n## Activities by Period\n{}\n\n## Routines by Weekday\n{}\n\n## Notes\n{}\n",
        report.date,
        stats.total_routines,
        stats.active_routines,
        stats.completed_activities,
        stats.total_activities,
        stats.completion_percent,
        format_duration_minutes(stats.total_estimated_minutes),
        format_duration_minutes(stats.total_completed_minutes),
        format_duration_minutes(report.breakdown.average_duration_minutes),
        report.agenda.weekday.label(),
        report.agenda.completion_percent,
        agenda_rows,
        category_rows,
        priority_rows,
        period_rows,
        weekday_rows,
        note_rows
    )
}

pub fn save_report_files(report: &DailyReport, report_dir: &Path) -> Result<SavedReport> {
    fs::create_dir_all(report_dir).with_context(|| {
        format!(
            "Failed to create report directory: {}",
            report_dir.display()
        )
    })?;

    let date = report.date.clone();
    let markdown_path = report_dir.join(format!("{date}.md"));
    let json_path = report_dir.join(format!("{date}.json"));

    fs::write(&markdown_path, render_markdown(report)).with_context(|| {
        format!(
            "Failed to write Markdown report: {}",
            markdown_path.display()
        )
    })?;

    let json_content =
        serde_json::to_string_pretty(report).context("Failed to serialize report JSON")?;
    fs::write(&json_path, json_content)
        .with_context(|| format!("Failed to write JSON report: {}", json_path.display()))?;

    Ok(SavedReport {
        markdown_path,
        json_path,
    })
}

fn detect_notes(routines: &[Routine], stats: &Statistics, agenda: &Agenda) -> Vec<String> {
    let empty_routines = routines
        .iter()
        .filter(|routine| routine.activities.is_empty())
        .map(|routine| routine.name.as_str())
        .collect::<Vec<_>>();

    let empty_alert = (!empty_routines.is_empty()).then(|| {
        format!("Routines without activities: {}", empty_routines.join(", "))
    });

    let archived = stats.total_routines - stats.active_routines;
    let archived_hint =
        (archived > 0).then(|| format!("{archived} archived routine(s) not in the agenda"));

    let free_day_hint = (agenda.is_empty() && stats.active_routines > 0)
        .then(|| "No active routine is scheduled for this day".to_string());

    let behind_alert = (!agenda.is_empty() && percent(agenda.completed, agenda.items.len()) < 50)
        .then(|| {
            format!(
                "Less than half of today's activities are done ({}/{})",
                agenda.completed,
                agenda.items.len()
            )
        });

    [empty_alert, archived_hint, free_day_hint, behind_alert]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
}

pub fn format_duration_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let remain_minutes = minutes % 60;

    if hours > 0 {
        if remain_minutes == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {remain_minutes}m")
        }
    } else {
        format!("{remain_minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples::sample_routines;
    use tempfile::tempdir;

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("date")
    }

    #[test]
    fn formats_minutes_as_hours() {
        assert_eq!(format_duration_minutes(0), "0m");
        assert_eq!(format_duration_minutes(45), "45m");
        assert_eq!(format_duration_minutes(120), "2h");
        assert_eq!(format_duration_minutes(135), "2h 15m");
    }

    #[test]
    fn markdown_lists_the_agenda_and_categories() {
        let report = build_daily_report(friday(), &sample_routines());
        let markdown = render_markdown(&report);

        assert!(markdown.starts_with("# Routine Report - 2026-10-16"));
        assert!(markdown.contains("## Agenda (Friday"));
        assert!(markdown.contains("Meditate 15 minutes"));
        assert!(markdown.contains("| Health |"));
        assert_eq!(report.statistics.total_routines, 2);
    }

    #[test]
    fn notes_flag_empty_and_archived_routines() {
        let mut routines = sample_routines();
        routines[1].active = false;
        routines[1].activities.clear();

        let report = build_daily_report(friday(), &routines);

        assert!(
            report
                .notes
                .iter()
                .any(|note| note.starts_with("Routines without activities"))
        );
        assert!(report.notes.iter().any(|note| note.contains("archived")));
    }

    #[test]
    fn saves_markdown_and_json_files() {
        let dir = tempdir().expect("tempdir");
        let report_dir = dir.path().join("reports");
        let report = build_daily_report(friday(), &sample_routines());

        let saved = save_report_files(&report, &report_dir).expect("save");

        assert_eq!(saved.markdown_path, report_dir.join("2026-10-16.md"));
        let json = fs::read_to_string(&saved.json_path).expect("read json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");
        assert_eq!(value["date"], "2026-10-16");
        assert_eq!(value["statistics"]["total_routines"], 2);
    }
}
