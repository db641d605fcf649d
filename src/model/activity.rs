use crate::model::ParseValueError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseValueError::new("priority", raw, "low, medium, high")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Health,
    Study,
    Leisure,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Study,
        Category::Leisure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Study => "study",
            Category::Leisure => "leisure",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Study => "Study",
            Category::Leisure => "Leisure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == raw.trim().to_lowercase())
            .ok_or_else(|| {
                ParseValueError::new("category", raw, "work, personal, health, study, leisure")
            })
    }
}

/// A scheduled task inside a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: Category,
}

/// Fields supplied by the caller when an activity is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: Category,
}

/// Partial update for an activity. `None` leaves the field untouched; an
/// empty description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
}

impl ActivityPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Activity {
    pub fn from_draft(id: String, draft: ActivityDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: non_blank(draft.description),
            completed: false,
            start_time: draft.start_time,
            duration_minutes: draft.duration_minutes,
            priority: draft.priority,
            category: draft.category,
        }
    }

    pub fn apply(&mut self, patch: ActivityPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = non_blank(Some(description));
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_time.hour() * 60 + self.start_time.minute()
    }

    /// End of the activity as "HH:MM". Activities running past midnight keep
    /// counting hours ("25:10") instead of wrapping.
    pub fn end_time_label(&self) -> String {
        let total = u64::from(self.start_minutes()) + u64::from(self.duration_minutes);
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    pub fn start_time_label(&self) -> String {
        self.start_time.format("%H:%M").to_string()
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(start: &str, minutes: u32) -> Activity {
        Activity::from_draft(
            "a1".to_string(),
            ActivityDraft {
                title: "Stretch".to_string(),
                description: Some("  ".to_string()),
                start_time: NaiveTime::parse_from_str(start, "%H:%M").expect("time"),
                duration_minutes: minutes,
                priority: Priority::Medium,
                category: Category::Health,
            },
        )
    }

    #[test]
    fn end_time_does_not_wrap_past_midnight() {
        assert_eq!(activity("06:10", 15).end_time_label(), "06:25");
        assert_eq!(activity("23:40", 90).end_time_label(), "25:10");
    }

    #[test]
    fn end_time_survives_huge_durations() {
        assert_eq!(activity("00:00", u32::MAX).end_time_label(), "71582788:15");
        assert_eq!(activity("23:59", u32::MAX).end_time_label(), "71582812:14");
    }

    #[test]
    fn blank_description_is_dropped() {
        assert_eq!(activity("06:00", 5).description, None);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut target = activity("06:00", 5);
        target.apply(ActivityPatch {
            title: Some("Long stretch".to_string()),
            ..ActivityPatch::default()
        });

        assert_eq!(target.title, "Long stretch");
        assert_eq!(target.duration_minutes, 5);
        assert_eq!(target.category, Category::Health);
        assert!(!target.completed);
    }

    #[test]
    fn serializes_start_time_as_hhmm() {
        let json = serde_json::to_value(activity("07:05", 10)).expect("serialize");
        assert_eq!(json["startTime"], "07:05");
        assert_eq!(json["durationMinutes"], 10);
        assert_eq!(json["category"], "health");
    }

    #[test]
    fn parses_enum_values_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("Study".parse::<Category>(), Ok(Category::Study));
        assert!("gaming".parse::<Category>().is_err());
    }
}
