//! The routine store: sole owner of the routine list, the filter
//! configuration and the current selection.
//!
//! Every mutation is applied in memory and written through to the persistent
//! store right away. Operations addressed by id silently do nothing when the
//! id is unknown; they report whether anything changed so callers can tell
//! the user.

pub mod validation;

use crate::analyzer::filter::filter_and_sort;
use crate::analyzer::stats::{Statistics, compute_statistics};
use crate::config::Config;
use crate::model::migrate::{self, Snapshot};
use crate::model::samples::sample_routines;
use crate::model::{
    Activity, ActivityDraft, ActivityPatch, FilterConfig, Routine, RoutineDraft, RoutinePatch,
    new_id,
};
use crate::persist::{KeyValueBackend, PersistentStore};
use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use validation::{ValidationError, ValidationPolicy};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub storage_key: String,
    pub seed_examples: bool,
    pub policy: ValidationPolicy,
    pub filters: FilterConfig,
}

impl StoreOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            seed_examples: config.seed_examples,
            policy: ValidationPolicy::from_strict(config.strict_validation),
            filters: FilterConfig {
                sort_key: config.default_sort,
                sort_direction: config.default_direction,
                view_mode: config.default_view,
                ..FilterConfig::default()
            },
        }
    }
}

pub struct RoutineStore<B> {
    persist: PersistentStore<B>,
    key: String,
    policy: ValidationPolicy,
    routines: Vec<Routine>,
    filters: FilterConfig,
    selected: Option<String>,
}

impl<B: KeyValueBackend> RoutineStore<B> {
    pub fn open(mut persist: PersistentStore<B>, options: StoreOptions) -> Self {
        let fallback = || {
            if options.seed_examples {
                sample_routines()
            } else {
                Vec::new()
            }
        };

        let raw = persist.load_raw(&options.storage_key);
        let mut needs_write = false;
        let routines = match raw {
            None => fallback(),
            Some(raw) => match parse_stored(&raw) {
                Ok(migrated) => {
                    if migrated.was_upgraded() {
                        info!(
                            from_version = migrated.from_version,
                            to_version = migrate::SCHEMA_VERSION,
                            routines = migrated.routines.len(),
                            "upgraded stored routines"
                        );
                        needs_write = true;
                    }
                    migrated.routines
                }
                Err(error) => {
                    let backup_key = unreadable_key(&options.storage_key);
                    persist.save_raw(&backup_key, &raw);
                    warn!(
                        error = %format!("{error:#}"),
                        backup_key = %backup_key,
                        "stored routines unreadable. using defaults"
                    );
                    fallback()
                }
            },
        };

        let mut store = Self {
            persist,
            key: options.storage_key,
            policy: options.policy,
            routines,
            filters: options.filters,
            selected: None,
        };

        if needs_write {
            store.persist();
        }

        store
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn backend(&self) -> &B {
        self.persist.backend()
    }

    pub fn find_routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|routine| routine.id == id)
    }

    pub fn find_activity(&self, routine_id: &str, activity_id: &str) -> Option<&Activity> {
        self.find_routine(routine_id)
            .and_then(|routine| routine.find_activity(activity_id))
    }

    pub fn create_routine(&mut self, draft: RoutineDraft) -> Result<String, ValidationError> {
        let draft = self.policy.check_routine_draft(draft)?;

        let routine = Routine {
            id: new_id(),
            name: draft.name,
            description: draft
                .description
                .filter(|description| !description.trim().is_empty()),
            activities: draft
                .activities
                .into_iter()
                .map(|activity| Activity::from_draft(new_id(), activity))
                .collect(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            color: draft.color,
            active: true,
            weekdays: draft.weekdays,
        };

        let id = routine.id.clone();
        info!(
            routine_id = %id,
            activities = routine.activities.len(),
            "routine created"
        );
        self.routines.push(routine);
        self.persist();

        Ok(id)
    }

    pub fn update_routine(&mut self, id: &str, patch: RoutinePatch) -> Result<bool, ValidationError> {
        let patch = self.policy.check_routine_patch(patch)?;

        let Some(routine) = self.find_routine_mut(id) else {
            debug!(routine_id = id, "update skipped: routine not found");
            return Ok(false);
        };

        routine.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_routine(&mut self, id: &str) -> bool {
        let before = self.routines.len();
        self.routines.retain(|routine| routine.id != id);

        if self.routines.len() == before {
            debug!(routine_id = id, "delete skipped: routine not found");
            return false;
        }

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        info!(routine_id = id, "routine deleted");
        self.persist();
        true
    }

    pub fn add_activity(
        &mut self,
        routine_id: &str,
        draft: ActivityDraft,
    ) -> Result<Option<String>, ValidationError> {
        self.policy.check_activity_draft(&draft)?;

        let Some(routine) = self.find_routine_mut(routine_id) else {
            debug!(routine_id, "add activity skipped: routine not found");
            return Ok(None);
        };

        let activity = Activity::from_draft(new_id(), draft);
        let id = activity.id.clone();
        routine.activities.push(activity);
        self.persist();

        Ok(Some(id))
    }

    pub fn update_activity(
        &mut self,
        routine_id: &str,
        activity_id: &str,
        patch: ActivityPatch,
    ) -> Result<bool, ValidationError> {
        self.policy.check_activity_patch(&patch)?;

        let Some(activity) = self.find_activity_mut(routine_id, activity_id) else {
            debug!(routine_id, activity_id, "update skipped: activity not found");
            return Ok(false);
        };

        activity.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_activity(&mut self, routine_id: &str, activity_id: &str) -> bool {
        let Some(routine) = self.find_routine_mut(routine_id) else {
            return false;
        };

        let before = routine.activities.len();
        routine
            .activities
            .retain(|activity| activity.id != activity_id);

        if routine.activities.len() == before {
            debug!(routine_id, activity_id, "delete skipped: activity not found");
            return false;
        }

        self.persist();
        true
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_activity_completion(&mut self, routine_id: &str, activity_id: &str) -> Option<bool> {
        let activity = self.find_activity_mut(routine_id, activity_id)?;
        activity.completed = !activity.completed;
        let completed = activity.completed;

        self.persist();
        Some(completed)
    }

    /// Marks activities as not completed, for one routine or all of them.
    /// Returns how many activities changed.
    pub fn reset_progress(&mut self, routine_id: Option<&str>) -> usize {
        let reset = self
            .routines
            .iter_mut()
            .filter(|routine| routine_id.is_none_or(|id| routine.id == id))
            .flat_map(|routine| routine.activities.iter_mut())
            .filter(|activity| activity.completed)
            .map(|activity| activity.completed = false)
            .count();

        if reset > 0 {
            self.persist();
        }

        reset
    }

    /// Replaces the whole routine list, as an import does.
    pub fn replace_all(&mut self, routines: Vec<Routine>) {
        if self
            .selected
            .as_deref()
            .is_some_and(|id| !routines.iter().any(|routine| routine.id == id))
        {
            self.selected = None;
        }

        self.routines = routines;
        self.persist();
    }

    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
    }

    /// Selects a routine; unknown ids leave the selection untouched.
    pub fn select(&mut self, id: &str) -> bool {
        if self.find_routine(id).is_none() {
            return false;
        }

        self.selected = Some(id.to_string());
        true
    }

    pub fn selected(&self) -> Option<&Routine> {
        self.selected
            .as_deref()
            .and_then(|id| self.find_routine(id))
    }

    pub fn filtered_sorted(&self) -> Vec<&Routine> {
        filter_and_sort(&self.routines, &self.filters)
    }

    pub fn statistics(&self) -> Statistics {
        compute_statistics(&self.routines)
    }

    fn find_routine_mut(&mut self, id: &str) -> Option<&mut Routine> {
        self.routines.iter_mut().find(|routine| routine.id == id)
    }

    fn find_activity_mut(&mut self, routine_id: &str, activity_id: &str) -> Option<&mut Activity> {
        self.find_routine_mut(routine_id)
            .and_then(|routine| routine.find_activity_mut(activity_id))
    }

    fn persist(&mut self) {
        let snapshot = Snapshot::new(&self.routines);
        self.persist.save(&self.key, &snapshot);
    }
}

/// Key that keeps a copy of state the store could not read, so the first
/// write-through does not destroy it.
pub fn unreadable_key(storage_key: &str) -> String {
    format!("{storage_key}.unreadable")
}

fn parse_stored(raw: &str) -> anyhow::Result<migrate::Migrated> {
    let value: Value = serde_json::from_str(raw).context("Stored routines are not valid JSON")?;
    migrate::upgrade(value)
}
