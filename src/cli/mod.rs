pub mod form;
pub mod render;

use crate::config::parse_hhmm;
use crate::model::{
    ActivityDraft, Category, FilterConfig, Priority, SortDirection, SortKey, ViewMode, Weekday,
};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "routines", about = "Personal routine and activity tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Routine {
        #[command(subcommand)]
        command: RoutineCommands,
    },
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Totals and breakdowns over every routine
    Stats,
    /// Activities scheduled for a day
    Today {
        #[arg(long)]
        date: Option<String>,
    },
    Report {
        #[arg(long)]
        date: Option<String>,
    },
    /// Replace all routines with the contents of a JSON file
    Import { file: PathBuf },
    /// Write all routines as JSON to a file or stdout
    Export { file: Option<PathBuf> },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Status,
    Doctor,
}

#[derive(Debug, Subcommand)]
pub enum RoutineCommands {
    /// Create a routine with an interactive form
    New,
    /// Create a routine from flags
    Add(RoutineAddArgs),
    List(ListArgs),
    Show {
        id: String,
    },
    Update(RoutineUpdateArgs),
    Delete {
        id: String,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Activate {
        id: String,
    },
    Archive {
        id: String,
    },
    /// Mark activities as not done again
    Reset {
        id: Option<String>,
        #[arg(long, default_value_t = false, conflicts_with = "id")]
        all: bool,
    },
}

#[derive(Debug, Args)]
pub struct RoutineAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value = "#3b82f6", value_parser = parse_color)]
    pub color: String,
    /// Comma separated, e.g. mon,wed,fri (default: every day)
    #[arg(long, value_delimiter = ',')]
    pub weekdays: Vec<Weekday>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// HH:MM/MINUTES/TITLE[/CATEGORY[/PRIORITY]], repeatable
    #[arg(long = "activity", value_parser = parse_activity_spec)]
    pub activities: Vec<ActivityDraft>,
}

#[derive(Debug, Args)]
pub struct RoutineUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    /// An empty value clears the description
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_color)]
    pub color: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub weekdays: Option<Vec<Weekday>>,
    #[arg(long, conflicts_with = "clear_dates")]
    pub start_date: Option<NaiveDate>,
    #[arg(long, conflicts_with = "clear_dates")]
    pub end_date: Option<NaiveDate>,
    #[arg(long, default_value_t = false)]
    pub clear_dates: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Only routines with a completed activity matching the other filters
    #[arg(long, conflicts_with = "pending")]
    pub done: bool,
    #[arg(long)]
    pub pending: bool,
    #[arg(long, conflicts_with = "archived")]
    pub active: bool,
    #[arg(long)]
    pub archived: bool,
    /// Searches names, descriptions and activity titles
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub sort: Option<SortKey>,
    #[arg(long)]
    pub direction: Option<SortDirection>,
    #[arg(long)]
    pub view: Option<ViewMode>,
}

impl ListArgs {
    /// Builds the filter configuration, falling back to `defaults` for the
    /// sort and view preferences not given on the command line.
    pub fn to_filters(&self, defaults: &FilterConfig) -> FilterConfig {
        FilterConfig {
            category: self.category,
            priority: self.priority,
            completed: flag_pair(self.done, self.pending),
            active: flag_pair(self.active, self.archived),
            text: self.text.clone(),
            sort_key: self.sort.unwrap_or(defaults.sort_key),
            sort_direction: self.direction.unwrap_or(defaults.sort_direction),
            view_mode: self.view.unwrap_or(defaults.view_mode),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ActivityCommands {
    Add {
        routine: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_time)]
        start: NaiveTime,
        #[arg(long)]
        minutes: u32,
        #[arg(long, default_value = "personal")]
        category: Category,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        routine: String,
        activity: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_time)]
        start: Option<NaiveTime>,
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        routine: String,
        activity: String,
    },
    /// Flip an activity between done and not done
    Toggle {
        routine: String,
        activity: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    parse_hhmm(raw).map_err(|error| error.to_string())
}

fn parse_color(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if form::is_hex_color(trimmed) {
        Ok(trimmed.to_lowercase())
    } else {
        Err(format!("Invalid color: {raw}. Example: #3b82f6"))
    }
}

/// Parses `HH:MM/MINUTES/TITLE[/CATEGORY[/PRIORITY]]`.
pub fn parse_activity_spec(raw: &str) -> Result<ActivityDraft, String> {
    let parts = raw.splitn(5, '/').map(str::trim).collect::<Vec<_>>();
    let [start, minutes, title, rest @ ..] = parts.as_slice() else {
        return Err(format!(
            "Invalid activity: {raw}. Example: 06:30/15/Meditate/personal/high"
        ));
    };

    let start_time = parse_time(start)?;
    let duration_minutes = minutes
        .parse::<u32>()
        .map_err(|_| format!("Invalid duration in activity: {minutes}"))?;
    let category = rest
        .first()
        .map(|value| value.parse::<Category>())
        .transpose()
        .map_err(|error| error.to_string())?
        .unwrap_or(Category::Personal);
    let priority = rest
        .get(1)
        .map(|value| value.parse::<Priority>())
        .transpose()
        .map_err(|error| error.to_string())?
        .unwrap_or(Priority::Medium);

    Ok(ActivityDraft {
        title: title.to_string(),
        description: None,
        start_time,
        duration_minutes,
        priority,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn activity_spec_accepts_optional_category_and_priority() {
        let full = parse_activity_spec("06:30/15/Meditate/health/high").expect("full spec");
        assert_eq!(full.title, "Meditate");
        assert_eq!(full.duration_minutes, 15);
        assert_eq!(full.category, Category::Health);
        assert_eq!(full.priority, Priority::High);

        let short = parse_activity_spec("21:00/30/Read a book").expect("short spec");
        assert_eq!(short.category, Category::Personal);
        assert_eq!(short.priority, Priority::Medium);

        assert!(parse_activity_spec("06:30/15").is_err());
        assert!(parse_activity_spec("6pm/15/Run").is_err());
        assert!(parse_activity_spec("06:30/15/Run/gaming").is_err());
    }

    #[test]
    fn list_flags_become_filters() {
        let cli = Cli::parse_from([
            "routines",
            "routine",
            "list",
            "--category",
            "work",
            "--pending",
            "--archived",
            "--sort",
            "progress",
        ]);
        let Commands::Routine {
            command: RoutineCommands::List(args),
        } = cli.command
        else {
            panic!("expected routine list");
        };

        let defaults = FilterConfig {
            sort_direction: SortDirection::Desc,
            ..FilterConfig::default()
        };
        let filters = args.to_filters(&defaults);

        assert_eq!(filters.category, Some(Category::Work));
        assert_eq!(filters.completed, Some(false));
        assert_eq!(filters.active, Some(false));
        assert_eq!(filters.sort_key, SortKey::Progress);
        assert_eq!(filters.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn weekdays_are_comma_separated() {
        let cli = Cli::parse_from([
            "routines",
            "routine",
            "add",
            "--name",
            "Gym",
            "--weekdays",
            "mon,wed,fri",
            "--activity",
            "07:00/60/Lift/health",
        ]);
        let Commands::Routine {
            command: RoutineCommands::Add(args),
        } = cli.command
        else {
            panic!("expected routine add");
        };

        assert_eq!(args.weekdays, [Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(args.activities.len(), 1);
        assert_eq!(args.color, "#3b82f6");
    }
}
