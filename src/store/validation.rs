use crate::model::{Activity, ActivityDraft, ActivityPatch, RoutineDraft, RoutinePatch};

/// How strictly the store checks data handed to it by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Names and titles must be non-blank, durations positive, and a new
    /// routine needs a weekday and at least one titled activity.
    #[default]
    Strict,
    /// Accept anything; only blank placeholder activities are pruned.
    Permissive,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("routine name is required")]
    EmptyRoutineName,
    #[error("add at least one activity with a title")]
    NoActivities,
    #[error("select at least one weekday")]
    NoWeekdays,
    #[error("activity title is required")]
    EmptyActivityTitle,
    #[error("activity duration must be greater than zero: {title}")]
    ZeroDuration { title: String },
}

impl ValidationPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Permissive
        }
    }

    fn is_strict(self) -> bool {
        self == ValidationPolicy::Strict
    }

    pub fn check_routine_draft(self, draft: RoutineDraft) -> Result<RoutineDraft, ValidationError> {
        let activities = draft
            .activities
            .into_iter()
            .filter(|activity| !activity.title.trim().is_empty())
            .collect::<Vec<_>>();

        let draft = RoutineDraft {
            name: draft.name.trim().to_string(),
            activities,
            ..draft
        };

        if self.is_strict() {
            if draft.name.is_empty() {
                return Err(ValidationError::EmptyRoutineName);
            }
            if draft.weekdays.is_empty() {
                return Err(ValidationError::NoWeekdays);
            }
            if draft.activities.is_empty() {
                return Err(ValidationError::NoActivities);
            }
            draft
                .activities
                .iter()
                .try_for_each(|activity| check_duration(&activity.title, activity.duration_minutes))?;
        }

        Ok(draft)
    }

    pub fn check_routine_patch(self, patch: RoutinePatch) -> Result<RoutinePatch, ValidationError> {
        let activities = patch.activities.map(|activities| {
            activities
                .into_iter()
                .filter(|activity| !activity.title.trim().is_empty())
                .collect::<Vec<Activity>>()
        });
        let patch = RoutinePatch {
            activities,
            ..patch
        };

        if self.is_strict() {
            if patch
                .name
                .as_deref()
                .is_some_and(|name| name.trim().is_empty())
            {
                return Err(ValidationError::EmptyRoutineName);
            }
            if patch.weekdays.as_ref().is_some_and(|days| days.is_empty()) {
                return Err(ValidationError::NoWeekdays);
            }
            if let Some(activities) = &patch.activities {
                activities.iter().try_for_each(|activity| {
                    check_duration(&activity.title, activity.duration_minutes)
                })?;
            }
        }

        Ok(patch)
    }

    pub fn check_activity_draft(self, draft: &ActivityDraft) -> Result<(), ValidationError> {
        if !self.is_strict() {
            return Ok(());
        }

        if draft.title.trim().is_empty() {
            return Err(ValidationError::EmptyActivityTitle);
        }

        check_duration(&draft.title, draft.duration_minutes)
    }

    pub fn check_activity_patch(self, patch: &ActivityPatch) -> Result<(), ValidationError> {
        if !self.is_strict() {
            return Ok(());
        }

        if patch
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(ValidationError::EmptyActivityTitle);
        }

        match patch.duration_minutes {
            Some(minutes) => check_duration(patch.title.as_deref().unwrap_or("activity"), minutes),
            None => Ok(()),
        }
    }
}

fn check_duration(title: &str, minutes: u32) -> Result<(), ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::ZeroDuration {
            title: title.to_string(),
        });
    }

    Ok(())
}
