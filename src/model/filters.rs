use crate::model::ParseValueError;
use crate::model::activity::{Category, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    CreationDate,
    Progress,
    Category,
    ActivityCount,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::CreationDate => "creation_date",
            SortKey::Progress => "progress",
            SortKey::Category => "category",
            SortKey::ActivityCount => "activity_count",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(SortKey::Name),
            "creation_date" | "date" => Ok(SortKey::CreationDate),
            "progress" => Ok(SortKey::Progress),
            "category" => Ok(SortKey::Category),
            "activity_count" | "activities" => Ok(SortKey::ActivityCount),
            _ => Err(ParseValueError::new(
                "sort key",
                raw,
                "name, creation_date, progress, category, activity_count",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ParseValueError::new("sort direction", raw, "asc, desc")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Cards,
    List,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::Cards => "cards",
            ViewMode::List => "list",
        })
    }
}

impl FromStr for ViewMode {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "cards" => Ok(ViewMode::Cards),
            "list" => Ok(ViewMode::List),
            _ => Err(ParseValueError::new("view mode", raw, "cards, list")),
        }
    }
}

/// Predicates and presentation preferences applied to the routine list.
///
/// All set predicates are AND-combined. `category`, `priority` and
/// `completed` are evaluated jointly against a single activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub active: Option<bool>,
    pub text: Option<String>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub view_mode: ViewMode,
}

impl FilterConfig {
    pub fn has_activity_filters(&self) -> bool {
        self.category.is_some() || self.priority.is_some() || self.completed.is_some()
    }

    pub fn text_needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }
}
