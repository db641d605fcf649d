mod analyzer;
mod cli;
mod config;
mod db;
mod model;
mod persist;
mod store;

use crate::analyzer::agenda::build_agenda;
use crate::analyzer::stats::compute_breakdown;
use crate::cli::form::{is_hex_color, run_routine_form};
use crate::cli::{
    ActivityCommands, Cli, Commands, ConfigCommands, RoutineAddArgs, RoutineCommands,
    RoutineUpdateArgs, render,
};
use crate::config::Config;
use crate::db::Database;
use crate::model::migrate::{self, Snapshot};
use crate::model::{ActivityDraft, ActivityPatch, Routine, RoutineDraft, RoutinePatch, Weekday};
use crate::persist::PersistentStore;
use crate::store::{RoutineStore, StoreOptions};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::Parser;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Store = RoutineStore<Database>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Routine { command } => handle_routine_command(command),
        Commands::Activity { command } => handle_activity_command(command),
        Commands::Stats => handle_stats(),
        Commands::Today { date } => handle_today(date),
        Commands::Report { date } => handle_report(date),
        Commands::Import { file } => handle_import(&file),
        Commands::Export { file } => handle_export(file.as_deref()),
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status(),
        Commands::Doctor => handle_doctor(),
    }
}

fn handle_routine_command(command: RoutineCommands) -> Result<()> {
    let config = Config::load_or_init()?;
    let mut store = open_store(&config)?;

    match command {
        RoutineCommands::New => {
            let draft = run_routine_form()?;
            let id = store.create_routine(draft)?;
            println!("Routine created: {id}");
        }
        RoutineCommands::Add(args) => {
            let id = store.create_routine(routine_draft(args))?;
            println!("Routine created: {id}");
        }
        RoutineCommands::List(args) => {
            let filters = args.to_filters(store.filters());
            store.set_filters(filters);
            println!(
                "{}",
                render::routines(&store.filtered_sorted(), store.filters().view_mode)
            );
        }
        RoutineCommands::Show { id } => {
            let Some(id) = resolve_routine(&store, &id)? else {
                return Ok(());
            };
            store.select(&id);
            if let Some(routine) = store.selected() {
                println!("{}", render::routine_detail(routine));
            }
        }
        RoutineCommands::Update(args) => {
            let Some(id) = resolve_routine(&store, &args.id)? else {
                return Ok(());
            };
            let patch = routine_patch(args);
            if patch.is_empty() {
                bail!("Nothing to update. Pass at least one field flag.");
            }
            if store.update_routine(&id, patch)? {
                println!("Routine updated: {id}");
            }
        }
        RoutineCommands::Delete { id, yes } => {
            let Some(id) = resolve_routine(&store, &id)? else {
                return Ok(());
            };
            let name = store
                .find_routine(&id)
                .map(|routine| routine.name.clone())
                .unwrap_or_default();

            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Delete routine \"{name}\"?"))
                    .default(false)
                    .interact()
                    .context("Failed to read delete confirmation")?;

            if confirmed && store.delete_routine(&id) {
                println!("Routine deleted: {name}");
            }
        }
        RoutineCommands::Activate { id } => set_active(&mut store, &id, true)?,
        RoutineCommands::Archive { id } => set_active(&mut store, &id, false)?,
        RoutineCommands::Reset { id, all } => {
            let target = match (id, all) {
                (_, true) => None,
                (Some(raw), false) => match resolve_routine(&store, &raw)? {
                    Some(id) => Some(id),
                    None => return Ok(()),
                },
                (None, false) => bail!("Pass a routine id or --all"),
            };

            let reset = store.reset_progress(target.as_deref());
            println!("Activities reset: {reset}");
        }
    }

    Ok(())
}

fn handle_activity_command(command: ActivityCommands) -> Result<()> {
    let config = Config::load_or_init()?;
    let mut store = open_store(&config)?;

    match command {
        ActivityCommands::Add {
            routine,
            title,
            start,
            minutes,
            category,
            priority,
            description,
        } => {
            let Some(routine_id) = resolve_routine(&store, &routine)? else {
                return Ok(());
            };
            let draft = ActivityDraft {
                title: title.trim().to_string(),
                description,
                start_time: start,
                duration_minutes: minutes,
                priority,
                category,
            };
            if let Some(activity_id) = store.add_activity(&routine_id, draft)? {
                println!("Activity added: {activity_id}");
            }
        }
        ActivityCommands::Update {
            routine,
            activity,
            title,
            start,
            minutes,
            category,
            priority,
            description,
        } => {
            let Some((routine_id, activity_id)) = resolve_activity(&store, &routine, &activity)?
            else {
                return Ok(());
            };
            let patch = ActivityPatch {
                title: title.map(|value| value.trim().to_string()),
                description,
                completed: None,
                start_time: start,
                duration_minutes: minutes,
                priority,
                category,
            };
            if patch.is_empty() {
                bail!("Nothing to update. Pass at least one field flag.");
            }
            if store.update_activity(&routine_id, &activity_id, patch)? {
                println!("Activity updated: {activity_id}");
            }
        }
        ActivityCommands::Delete { routine, activity } => {
            let Some((routine_id, activity_id)) = resolve_activity(&store, &routine, &activity)?
            else {
                return Ok(());
            };
            if store.delete_activity(&routine_id, &activity_id) {
                println!("Activity deleted: {activity_id}");
            }
        }
        ActivityCommands::Toggle { routine, activity } => {
            let Some((routine_id, activity_id)) = resolve_activity(&store, &routine, &activity)?
            else {
                return Ok(());
            };
            if let Some(completed) = store.toggle_activity_completion(&routine_id, &activity_id) {
                let title = store
                    .find_activity(&routine_id, &activity_id)
                    .map(|activity| activity.title.as_str())
                    .unwrap_or_default();
                println!(
                    "{title}: {}",
                    if completed { "done" } else { "not done" }
                );
            }
        }
    }

    Ok(())
}

fn handle_stats() -> Result<()> {
    let config = Config::load_or_init()?;
    let store = open_store(&config)?;

    println!(
        "{}",
        render::statistics(&store.statistics(), &compute_breakdown(store.routines()))
    );

    Ok(())
}

fn handle_today(date: Option<String>) -> Result<()> {
    let config = Config::load_or_init()?;
    let store = open_store(&config)?;
    let target_date = parse_optional_date(date)?;

    println!("{}", render::agenda(&build_agenda(store.routines(), target_date)));

    Ok(())
}

fn handle_report(date: Option<String>) -> Result<()> {
    let config = Config::load_or_init()?;
    let store = open_store(&config)?;
    let target_date = parse_optional_date(date)?;

    let (report, saved) = analyzer::generate_and_store_report(
        &config,
        store.backend(),
        store.routines(),
        target_date,
    )?;

    println!("Report generated: {}", report.date);
    println!("- Markdown: {}", saved.markdown_path.display());
    println!("- JSON: {}", saved.json_path.display());

    Ok(())
}

fn handle_import(file: &Path) -> Result<()> {
    let config = Config::load_or_init()?;
    let mut store = open_store(&config)?;

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let raw = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {}", file.display()))?;
    let migrated = migrate::upgrade(raw)
        .with_context(|| format!("Unsupported import file: {}", file.display()))?;

    let count = migrated.routines.len();
    let from_version = migrated.from_version;
    store.replace_all(migrated.routines);

    info!(count, from_version, "routines imported");
    println!("Imported {count} routine(s) from {}", file.display());

    Ok(())
}

fn handle_export(file: Option<&Path>) -> Result<()> {
    let config = Config::load_or_init()?;
    let store = open_store(&config)?;

    let content = serde_json::to_string_pretty(&Snapshot::new(store.routines()))
        .context("Failed to serialize routines")?;

    match file {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write export file: {}", path.display()))?;
            println!(
                "Exported {} routine(s) to {}",
                store.routines().len(),
                path.display()
            );
        }
        None => println!("{content}"),
    }

    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_init()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_or_init()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_status() -> Result<()> {
    let config = Config::load_or_init()?;
    let store = open_store(&config)?;
    let database = store.backend();
    let stats = store.statistics();

    println!("Routine tracker status");
    println!("- db_path: {}", config.db_path.display());
    println!("- storage_key: {}", config.storage_key);
    println!(
        "- routines: {} ({} active)",
        stats.total_routines, stats.active_routines
    );
    println!(
        "- activities_done: {}/{} ({}%)",
        stats.completed_activities, stats.total_activities, stats.completion_percent
    );
    println!(
        "- last_saved_at: {}",
        database
            .entry_meta(&config.storage_key)?
            .map(|meta| format!("{} ({} bytes)", meta.updated_at, meta.bytes))
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "- latest_report_date: {}",
        database
            .latest_report_meta()?
            .map(|meta| meta.date)
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path();
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = Config::load_or_init()?;

    let database = match Database::open(&config.db_path) {
        Ok(database) => {
            println!("[OK] SQLite reachable: {}", config.db_path.display());
            database
        }
        Err(error) => {
            println!("[WARN] SQLite check failed: {error:#}");
            println!("doctor result: 1 warning(s)");
            return Ok(());
        }
    };

    if config.report_dir.exists() {
        println!("[OK] report dir exists: {}", config.report_dir.display());
    } else {
        println!(
            "[WARN] report dir missing (created on first report): {}",
            config.report_dir.display()
        );
        issues.push("report dir missing".to_string());
    }

    let stored = database.get_value(&config.storage_key)?;
    let routines = match stored {
        None => {
            println!("[OK] nothing stored yet under \"{}\"", config.storage_key);
            Vec::new()
        }
        Some(raw) => match serde_json::from_str(&raw)
            .context("stored value is not JSON")
            .and_then(migrate::upgrade)
        {
            Ok(migrated) => {
                if migrated.was_upgraded() {
                    println!(
                        "[WARN] stored data uses schema {}; it is upgraded on next open",
                        migrated.from_version
                    );
                    issues.push("legacy schema".to_string());
                } else {
                    println!("[OK] stored data readable (schema {})", migrate::SCHEMA_VERSION);
                }
                migrated.routines
            }
            Err(error) => {
                println!("[WARN] stored data unreadable: {error:#}");
                issues.push("stored data unreadable".to_string());
                Vec::new()
            }
        },
    };

    let findings = routine_findings(&routines);
    if findings.is_empty() {
        println!("[OK] {} routine(s) look consistent", routines.len());
    } else {
        findings.iter().for_each(|finding| println!("[WARN] {finding}"));
        issues.extend(findings);
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

/// Data problems the store tolerates but a user probably wants to fix.
fn routine_findings(routines: &[Routine]) -> Vec<String> {
    let mut seen_ids = HashSet::new();
    let mut findings = Vec::new();

    for routine in routines {
        let label = format!("\"{}\" [{}]", routine.name, render::short_id(&routine.id));

        if !seen_ids.insert(routine.id.as_str()) {
            findings.push(format!("{label}: duplicate routine id"));
        }
        if routine.name.trim().is_empty() {
            findings.push(format!("{label}: empty name"));
        }
        if !is_hex_color(&routine.color) {
            findings.push(format!("{label}: color is not #rrggbb ({})", routine.color));
        }
        if routine.weekdays.is_empty() {
            findings.push(format!("{label}: no weekdays, never scheduled"));
        }
        if routine.activities.is_empty() {
            findings.push(format!("{label}: no activities"));
        }
        if let Some((start, end)) = routine
            .start_date
            .zip(routine.end_date)
            .filter(|(start, end)| end < start)
        {
            findings.push(format!("{label}: end date {end} is before start date {start}"));
        }

        for activity in &routine.activities {
            if activity.title.trim().is_empty() {
                findings.push(format!("{label}: activity without title"));
            }
            if activity.duration_minutes == 0 {
                findings.push(format!("{label}: \"{}\" has no duration", activity.title));
            }
        }
    }

    findings
}

fn routine_draft(args: RoutineAddArgs) -> RoutineDraft {
    let weekdays = if args.weekdays.is_empty() {
        Weekday::ALL.into_iter().collect()
    } else {
        args.weekdays.into_iter().collect()
    };

    RoutineDraft {
        name: args.name,
        description: args.description,
        activities: args.activities,
        start_date: args.start_date,
        end_date: args.end_date,
        color: args.color,
        weekdays,
    }
}

fn routine_patch(args: RoutineUpdateArgs) -> RoutinePatch {
    let clear = args.clear_dates.then_some(None);

    RoutinePatch {
        name: args.name,
        description: args.description,
        activities: None,
        start_date: clear.or(args.start_date.map(Some)),
        end_date: clear.or(args.end_date.map(Some)),
        color: args.color,
        active: None,
        weekdays: args.weekdays.map(|days| days.into_iter().collect()),
    }
}

fn set_active(store: &mut Store, raw_id: &str, active: bool) -> Result<()> {
    let Some(id) = resolve_routine(store, raw_id)? else {
        return Ok(());
    };

    let patch = RoutinePatch {
        active: Some(active),
        ..RoutinePatch::default()
    };
    if store.update_routine(&id, patch)? {
        println!(
            "Routine {}: {id}",
            if active { "activated" } else { "archived" }
        );
    }

    Ok(())
}

fn resolve_routine(store: &Store, raw: &str) -> Result<Option<String>> {
    let resolved = resolve_id(store.routines().iter().map(|routine| routine.id.as_str()), raw)
        .with_context(|| format!("Routine id is ambiguous: {raw}"))?;

    if resolved.is_none() {
        println!("[WARN] routine not found: {raw}");
    }

    Ok(resolved)
}

fn resolve_activity(
    store: &Store,
    raw_routine: &str,
    raw_activity: &str,
) -> Result<Option<(String, String)>> {
    let Some(routine_id) = resolve_routine(store, raw_routine)? else {
        return Ok(None);
    };

    let ids = store
        .find_routine(&routine_id)
        .map(|routine| {
            routine
                .activities
                .iter()
                .map(|activity| activity.id.as_str())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let resolved = resolve_id(ids.into_iter(), raw_activity)
        .with_context(|| format!("Activity id is ambiguous: {raw_activity}"))?;

    match resolved {
        Some(activity_id) => Ok(Some((routine_id, activity_id))),
        None => {
            println!("[WARN] activity not found: {raw_activity}");
            Ok(None)
        }
    }
}

/// Matches an exact id, or else a unique id prefix as shown in listings.
fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, raw: &str) -> Result<Option<String>> {
    let needle = raw.trim();
    if needle.is_empty() {
        return Ok(None);
    }

    let candidates = ids.filter(|id| id.starts_with(needle)).collect::<Vec<_>>();

    if let Some(exact) = candidates.iter().find(|id| **id == needle) {
        return Ok(Some(exact.to_string()));
    }

    match candidates.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single.to_string())),
        many => bail!("{} ids start with {needle}", many.len()),
    }
}

fn open_store(config: &Config) -> Result<Store> {
    let database = Database::open(&config.db_path)?;

    Ok(RoutineStore::open(
        PersistentStore::new(database),
        StoreOptions::from_config(config),
    ))
}

fn parse_optional_date(input: Option<String>) -> Result<NaiveDate> {
    input
        .as_deref()
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date format: {date}. Example: 2026-02-18"))
        })
        .transpose()?
        .map_or_else(|| Ok(Local::now().date_naive()), Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples::sample_routines;

    #[test]
    fn resolve_id_accepts_unique_prefixes() {
        let ids = ["3f2a9c10-aaaa", "3f2b0000-bbbb", "sample-1", "sample-10"];

        assert_eq!(
            resolve_id(ids.into_iter(), "3f2a").expect("unique"),
            Some("3f2a9c10-aaaa".to_string())
        );
        assert_eq!(
            resolve_id(ids.into_iter(), "sample-1").expect("exact wins"),
            Some("sample-1".to_string())
        );
        assert!(resolve_id(ids.into_iter(), "3f2").is_err());
        assert_eq!(resolve_id(ids.into_iter(), "zzz").expect("miss"), None);
        assert_eq!(resolve_id(ids.into_iter(), " ").expect("blank"), None);
    }

    #[test]
    fn update_args_can_clear_dates() {
        let patch = routine_patch(RoutineUpdateArgs {
            id: "r1".to_string(),
            name: None,
            description: None,
            color: None,
            weekdays: None,
            start_date: None,
            end_date: None,
            clear_dates: true,
        });

        assert_eq!(patch.start_date, Some(None));
        assert_eq!(patch.end_date, Some(None));
        assert!(!patch.is_empty());
    }

    #[test]
    fn doctor_flags_inconsistent_routines() {
        let mut routines = sample_routines();
        routines[0].color = "green".to_string();
        routines[1].weekdays.clear();
        routines[1].start_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        routines[1].end_date = NaiveDate::from_ymd_opt(2026, 4, 1);

        let findings = routine_findings(&routines);

        assert_eq!(findings.len(), 3);
        assert!(routine_findings(&sample_routines()).is_empty());
    }
}
