use crate::analyzer::agenda::Agenda;
use crate::analyzer::report::format_duration_minutes;
use crate::analyzer::stats::{Breakdown, Statistics};
use crate::model::{Activity, Routine, ViewMode};

const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

pub fn routines(routines: &[&Routine], view: ViewMode) -> String {
    if routines.is_empty() {
        return "No routines match.".to_string();
    }

    match view {
        ViewMode::Cards => routines
            .iter()
            .map(|routine| card(routine))
            .collect::<Vec<_>>()
            .join("\n\n"),
        ViewMode::List => routines
            .iter()
            .map(|routine| list_row(routine))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn card(routine: &Routine) -> String {
    let mut lines = vec![
        format!(
            "┌ {} [{}]{}",
            routine.name,
            short_id(&routine.id),
            if routine.active { "" } else { " (archived)" }
        ),
        format!(
            "│ {} | {} | {}",
            routine.color,
            routine.weekdays_label(),
            format_duration_minutes(routine.total_minutes())
        ),
    ];

    if let Some(description) = &routine.description {
        lines.push(format!("│ {description}"));
    }

    lines.push(format!(
        "│ {} {}/{} ({}%)",
        progress_bar(routine.progress_percent()),
        routine.completed_count(),
        routine.activities.len(),
        routine.progress_percent()
    ));
    lines.extend(
        routine
            .activities
            .iter()
            .map(|activity| format!("│  {}", activity_line(activity))),
    );
    lines.push("└".to_string());

    lines.join("\n")
}

fn list_row(routine: &Routine) -> String {
    format!(
        "{}  {:<28} {:>3}%  {:>2} act  {:<20} {}",
        short_id(&routine.id),
        routine.name,
        routine.progress_percent(),
        routine.activities.len(),
        routine.weekdays_label(),
        if routine.active { "active" } else { "archived" }
    )
}

pub fn routine_detail(routine: &Routine) -> String {
    let dates = match (routine.start_date, routine.end_date) {
        (None, None) => "open-ended".to_string(),
        (start, end) => format!(
            "{} → {}",
            start.map(|date| date.to_string()).unwrap_or_default(),
            end.map(|date| date.to_string()).unwrap_or_default()
        ),
    };

    let activities = if routine.activities.is_empty() {
        "  (no activities)".to_string()
    } else {
        routine
            .activities
            .iter()
            .map(|activity| {
                format!(
                    "  {} {}  {} / {}{}",
                    short_id(&activity.id),
                    activity_line(activity),
                    activity.category,
                    activity.priority,
                    activity
                        .description
                        .as_deref()
                        .map(|description| format!("\n      {description}"))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{}\n- id: {}\n- status: {}\n- color: {}\n- weekdays: {}\n- dates: {}\n- progress: {}/{} ({}%)\n- planned: {}\n{}{}",
        routine.name,
        routine.id,
        if routine.active { "active" } else { "archived" },
        routine.color,
        routine.weekdays_label(),
        dates,
        routine.completed_count(),
        routine.activities.len(),
        routine.progress_percent(),
        format_duration_minutes(routine.total_minutes()),
        routine
            .description
            .as_deref()
            .map(|description| format!("{description}\n"))
            .unwrap_or_default(),
        activities
    )
}

pub fn statistics(stats: &Statistics, breakdown: &Breakdown) -> String {
    let mut lines = vec![
        "Routine statistics".to_string(),
        format!(
            "- routines: {} ({} active)",
            stats.total_routines, stats.active_routines
        ),
        format!(
            "- activities: {}/{} done ({}%)",
            stats.completed_activities, stats.total_activities, stats.completion_percent
        ),
        format!(
            "- planned time: {}",
            format_duration_minutes(stats.total_estimated_minutes)
        ),
        format!(
            "- completed time: {}",
            format_duration_minutes(stats.total_completed_minutes)
        ),
        format!(
            "- average activity: {}",
            format_duration_minutes(breakdown.average_duration_minutes)
        ),
        String::new(),
        "By category".to_string(),
    ];

    lines.extend(breakdown.activities_by_category.iter().map(|(category, count)| {
        format!(
            "  {:<10} {:>3}  {:>3}% done",
            category,
            count,
            breakdown
                .completion_by_category
                .get(category)
                .copied()
                .unwrap_or_default()
        )
    }));

    lines.push("By priority".to_string());
    lines.extend(
        breakdown
            .activities_by_priority
            .iter()
            .map(|(priority, count)| format!("  {priority:<10} {count:>3}")),
    );

    lines.push("By period".to_string());
    lines.extend(
        breakdown
            .activities_by_period
            .iter()
            .map(|(period, count)| format!("  {period:<16} {count:>3}")),
    );

    lines.push("By weekday".to_string());
    lines.extend(
        breakdown
            .routines_by_weekday
            .iter()
            .map(|entry| format!("  {:<10} {:>3}", entry.weekday, entry.routines)),
    );

    lines.join("\n")
}

pub fn agenda(agenda: &Agenda) -> String {
    let header = format!(
        "{} ({}) - {}/{} done ({}%)",
        agenda.date,
        agenda.weekday.label(),
        agenda.completed,
        agenda.items.len(),
        agenda.completion_percent
    );

    if agenda.is_empty() {
        return format!("{header}\nNothing scheduled.");
    }

    let rows = agenda
        .items
        .iter()
        .map(|item| {
            format!(
                "{}  [{}/{}] {}",
                activity_line(&item.activity),
                short_id(&item.routine_id),
                short_id(&item.activity.id),
                item.routine_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{header}\n{rows}\nTotal: {}",
        format_duration_minutes(agenda.total_minutes())
    )
}

fn activity_line(activity: &Activity) -> String {
    format!(
        "[{}] {}-{} {} ({})",
        if activity.completed { "x" } else { " " },
        activity.start_time_label(),
        activity.end_time_label(),
        activity.title,
        format_duration_minutes(u64::from(activity.duration_minutes))
    )
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) / 10) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::agenda::build_agenda;
    use crate::analyzer::stats::{compute_breakdown, compute_statistics};
    use crate::model::samples::sample_routines;
    use chrono::NaiveDate;

    #[test]
    fn list_view_is_one_line_per_routine() {
        let samples = sample_routines();
        let refs = samples.iter().collect::<Vec<_>>();

        let list = routines(&refs, ViewMode::List);
        let cards = routines(&refs, ViewMode::Cards);

        assert_eq!(list.lines().count(), 2);
        assert!(cards.lines().count() > 10);
        assert!(cards.contains("[ ] 06:20-06:35 Meditate 15 minutes (15m)"));
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(routines(&[], ViewMode::Cards), "No routines match.");

        let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        assert!(agenda(&build_agenda(&[], date)).ends_with("Nothing scheduled."));
    }

    #[test]
    fn statistics_list_every_category() {
        let samples = sample_routines();
        let text = statistics(&compute_statistics(&samples), &compute_breakdown(&samples));

        assert!(text.contains("- routines: 2 (2 active)"));
        assert!(text.contains("  leisure"));
    }

    #[test]
    fn short_ids_keep_short_input() {
        assert_eq!(short_id("sample-1"), "sample-1");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(progress_bar(45), "████░░░░░░");
    }
}
