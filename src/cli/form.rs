use crate::config::parse_hhmm;
use crate::model::{ActivityDraft, Category, Priority, RoutineDraft, Weekday};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

const PALETTE: [(&str, &str); 6] = [
    ("Blue", "#3b82f6"),
    ("Green", "#4ade80"),
    ("Orange", "#f97316"),
    ("Purple", "#a855f7"),
    ("Pink", "#ec4899"),
    ("Custom", ""),
];

pub fn is_hex_color(raw: &str) -> bool {
    HEX_COLOR.is_match(raw)
}

/// Walks the user through a new routine. Every field is validated as it is
/// typed, so the returned draft passes strict validation.
pub fn run_routine_form() -> Result<RoutineDraft> {
    println!("──────────────────────────────────────────");
    println!("  New routine");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();

    println!("\n[1/4] Basics");
    let name: String = Input::with_theme(&theme)
        .with_prompt("  Name")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("Name is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read routine name")?;

    let description: String = Input::with_theme(&theme)
        .with_prompt("  Description (optional)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read routine description")?;

    let color = prompt_color(&theme)?;

    println!("\n[2/4] Schedule");
    let weekdays = prompt_weekdays(&theme)?;
    let start_date = prompt_date(&theme, "  Start date YYYY-MM-DD (optional)")?;
    let end_date = prompt_date(&theme, "  End date YYYY-MM-DD (optional)")?;

    println!("\n[3/4] Activities");
    let activities = prompt_activities(&theme)?;

    println!("\n[4/4] Review");
    println!("  {} ({})", name.trim(), color);
    println!(
        "  {} | {} activities",
        weekdays
            .iter()
            .map(|day| day.as_str())
            .collect::<Vec<_>>()
            .join(","),
        activities.len()
    );

    Ok(RoutineDraft {
        name: name.trim().to_string(),
        description: Some(description),
        activities,
        start_date,
        end_date,
        color,
        weekdays,
    })
}

fn prompt_color(theme: &ColorfulTheme) -> Result<String> {
    let labels = PALETTE
        .iter()
        .map(|(label, hex)| {
            if hex.is_empty() {
                label.to_string()
            } else {
                format!("{label} {hex}")
            }
        })
        .collect::<Vec<_>>();

    let selected = Select::with_theme(theme)
        .with_prompt("  Color")
        .default(0)
        .items(&labels)
        .interact()
        .context("Failed to select color")?;

    match PALETTE.get(selected) {
        Some((_, hex)) if !hex.is_empty() => Ok(hex.to_string()),
        _ => {
            let custom: String = Input::with_theme(theme)
                .with_prompt("  Hex color")
                .default("#3b82f6".to_string())
                .validate_with(|input: &String| -> std::result::Result<(), &str> {
                    if is_hex_color(input.trim()) {
                        Ok(())
                    } else {
                        Err("Use #rrggbb format (example: #3b82f6)")
                    }
                })
                .interact_text()
                .context("Failed to read color")?;
            Ok(custom.trim().to_lowercase())
        }
    }
}

fn prompt_weekdays(theme: &ColorfulTheme) -> Result<BTreeSet<Weekday>> {
    let labels = Weekday::ALL
        .iter()
        .map(|day| day.label())
        .collect::<Vec<_>>();
    let defaults = [true; 7];

    loop {
        let picked = MultiSelect::with_theme(theme)
            .with_prompt("  Weekdays (space to toggle)")
            .items(&labels)
            .defaults(&defaults)
            .interact()
            .context("Failed to select weekdays")?;

        let weekdays = picked
            .into_iter()
            .filter_map(|index| Weekday::ALL.get(index).copied())
            .collect::<BTreeSet<_>>();

        if !weekdays.is_empty() {
            return Ok(weekdays);
        }

        println!("  ! Select at least one weekday");
    }
}

fn prompt_date(theme: &ColorfulTheme, prompt: &str) -> Result<Option<NaiveDate>> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty()
                || NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok()
            {
                Ok(())
            } else {
                Err("Use YYYY-MM-DD format (example: 2026-01-31)")
            }
        })
        .interact_text()
        .context("Failed to read date")?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("Invalid date format: {trimmed}"))
}

fn prompt_activities(theme: &ColorfulTheme) -> Result<Vec<ActivityDraft>> {
    let mut activities = Vec::new();

    loop {
        println!("  Activity #{} (leave the title empty to finish)", activities.len() + 1);

        let title: String = Input::with_theme(theme)
            .with_prompt("    Title")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read activity title")?;

        if title.trim().is_empty() {
            if activities.is_empty() {
                println!("  ! Add at least one activity with a title");
                continue;
            }
            return Ok(activities);
        }

        activities.push(prompt_activity_details(theme, title.trim())?);

        let more = Confirm::with_theme(theme)
            .with_prompt("  Add another activity?")
            .default(true)
            .interact()
            .context("Failed to read activity confirmation")?;

        if !more {
            return Ok(activities);
        }
    }
}

fn prompt_activity_details(theme: &ColorfulTheme, title: &str) -> Result<ActivityDraft> {
    let start: String = Input::with_theme(theme)
        .with_prompt("    Start time")
        .default("08:00".to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            parse_hhmm(input)
                .map(|_| ())
                .map_err(|_| "Use HH:MM format (example: 06:30)")
        })
        .interact_text()
        .context("Failed to read start time")?;

    let duration_minutes: u32 = Input::with_theme(theme)
        .with_prompt("    Duration (minutes)")
        .default(30)
        .validate_with(|input: &u32| -> std::result::Result<(), &str> {
            if *input == 0 {
                Err("Duration must be greater than zero")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read duration")?;

    let category_labels = Category::ALL
        .iter()
        .map(|category| category.label())
        .collect::<Vec<_>>();
    let category_index = Select::with_theme(theme)
        .with_prompt("    Category")
        .default(1)
        .items(&category_labels)
        .interact()
        .context("Failed to select category")?;

    let priority_labels = Priority::ALL
        .iter()
        .map(|priority| priority.as_str())
        .collect::<Vec<_>>();
    let priority_index = Select::with_theme(theme)
        .with_prompt("    Priority")
        .default(1)
        .items(&priority_labels)
        .interact()
        .context("Failed to select priority")?;

    Ok(ActivityDraft {
        title: title.to_string(),
        description: None,
        start_time: parse_hhmm(&start)?,
        duration_minutes,
        priority: Priority::ALL
            .get(priority_index)
            .copied()
            .unwrap_or(Priority::Medium),
        category: Category::ALL
            .get(category_index)
            .copied()
            .unwrap_or(Category::Personal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_need_six_digits() {
        assert!(is_hex_color("#3b82f6"));
        assert!(is_hex_color("#ABCDEF"));
        assert!(!is_hex_color("3b82f6"));
        assert!(!is_hex_color("#fff"));
        assert!(!is_hex_color("#3b82f6 "));
        assert!(!is_hex_color("#gggggg"));
    }

    #[test]
    fn palette_entries_are_valid_colors() {
        assert!(
            PALETTE
                .iter()
                .filter(|(_, hex)| !hex.is_empty())
                .all(|(_, hex)| is_hex_color(hex))
        );
    }
}
