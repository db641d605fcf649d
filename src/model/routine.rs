use crate::model::ParseValueError;
use crate::model::activity::{Activity, ActivityDraft, non_blank};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    pub const WORKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// 0 is Sunday.
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Sun => "sun",
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Sun => "Sunday",
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| {
                normalized == day.as_str() || normalized == day.label().to_lowercase()
            })
            .ok_or_else(|| ParseValueError::new("weekday", raw, "sun, mon, tue, wed, thu, fri, sat"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub color: String,
    pub active: bool,
    #[serde(default)]
    pub weekdays: BTreeSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDraft {
    pub name: String,
    pub description: Option<String>,
    pub activities: Vec<ActivityDraft>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub color: String,
    pub weekdays: BTreeSet<Weekday>,
}

/// Partial update for a routine. Nested `Option`s on the dates distinguish
/// "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutinePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub activities: Option<Vec<Activity>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub color: Option<String>,
    pub active: Option<bool>,
    pub weekdays: Option<BTreeSet<Weekday>>,
}

impl RoutinePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Routine {
    pub fn apply(&mut self, patch: RoutinePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = non_blank(Some(description));
        }
        if let Some(activities) = patch.activities {
            self.activities = activities;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(weekdays) = patch.weekdays {
            self.weekdays = weekdays;
        }
    }

    pub fn completed_count(&self) -> usize {
        self.activities
            .iter()
            .filter(|activity| activity.completed)
            .count()
    }

    /// Completed share of the activities in `0.0..=1.0`; 0 without activities.
    pub fn progress_ratio(&self) -> f64 {
        if self.activities.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 / self.activities.len() as f64
        }
    }

    pub fn progress_percent(&self) -> u32 {
        (self.progress_ratio() * 100.0).round() as u32
    }

    pub fn total_minutes(&self) -> u64 {
        self.activities
            .iter()
            .map(|activity| u64::from(activity.duration_minutes))
            .sum()
    }

    pub fn find_activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|activity| activity.id == activity_id)
    }

    pub(crate) fn find_activity_mut(&mut self, activity_id: &str) -> Option<&mut Activity> {
        self.activities
            .iter_mut()
            .find(|activity| activity.id == activity_id)
    }

    /// Whether the routine is scheduled on `date`: it must recur on that
    /// weekday and the date must fall inside the optional start/end bounds.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        let within_start = self.start_date.is_none_or(|start| date >= start);
        let within_end = self.end_date.is_none_or(|end| date <= end);

        within_start && within_end && self.weekdays.contains(&Weekday::of(date))
    }

    pub fn weekdays_label(&self) -> String {
        if self.weekdays.len() == Weekday::ALL.len() {
            return "every day".to_string();
        }

        if self.weekdays.is_empty() {
            return "no days".to_string();
        }

        self.weekdays
            .iter()
            .map(|day| day.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
