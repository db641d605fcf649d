pub mod activity;
pub mod filters;
pub mod migrate;
pub mod routine;
pub mod samples;

pub use activity::{Activity, ActivityDraft, ActivityPatch, Category, Priority};
pub use filters::{FilterConfig, SortDirection, SortKey, ViewMode};
pub use routine::{Routine, RoutineDraft, RoutinePatch, Weekday};

/// Returned when a user-supplied enum value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value} (expected one of: {expected})")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
